use neuro_core::models::score::ScoreRecord;
use neuro_core::models::validation::{DomainValidationResult, ValidationReason};
use serde::Serialize;
use tracing::{debug, info};

use crate::catalogue::{DomainConfig, DomainKind};
use crate::rule::RuleSet;
use crate::validate::validate_domain;

/// Eligibility of one consolidated domain.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DomainSelection {
    pub kind: DomainKind,
    pub key: &'static str,
    pub title: &'static str,
    pub included: bool,
    /// `Valid` when included, otherwise the reason from the alias that came
    /// closest to qualifying.
    pub reason: ValidationReason,
    /// One result per aliased domain name, in catalogue order.
    pub alias_results: Vec<DomainValidationResult>,
    /// Union of the records of every valid alias, rater-filtered. Empty when
    /// the domain is excluded.
    #[serde(skip)]
    pub records: Vec<ScoreRecord>,
}

impl DomainSelection {
    pub fn config(&self) -> &'static DomainConfig {
        self.kind.config()
    }

    pub fn scoreable_row_count(&self) -> usize {
        self.alias_results
            .iter()
            .filter(|r| r.is_valid)
            .map(|r| r.scoreable_row_count)
            .sum()
    }
}

/// Validate every domain in `catalogue` against `records`.
///
/// A domain's data source is the records routed to one of its names from
/// a rater it accepts; a domain with none is excluded as `NoDataSource`.
/// Each aliased domain name is validated on its own; the domain is
/// included when any alias is valid and then carries the records of all
/// valid aliases.
pub fn select_domains(
    records: &[ScoreRecord],
    catalogue: &[&'static DomainConfig],
    rules: &RuleSet,
) -> Vec<DomainSelection> {
    catalogue
        .iter()
        .map(|config| select_one(records, config, rules))
        .collect()
}

fn select_one(records: &[ScoreRecord], config: &'static DomainConfig, rules: &RuleSet) -> DomainSelection {
    let rule = rules.rule_for(config.kind);
    let pool: Vec<ScoreRecord> = records
        .iter()
        .filter(|r| config.routes(&r.domain) && config.accepts_rater(r.rater))
        .cloned()
        .collect();

    let alias_results: Vec<DomainValidationResult> = config
        .domain_names
        .iter()
        .map(|name| validate_domain(name, &pool, &rule))
        .collect();

    for result in &alias_results {
        debug!(domain_key = config.key, alias = %result.domain, reason = %result.reason, rows = result.scoreable_row_count, "validated alias");
    }

    let included = alias_results.iter().any(|r| r.is_valid);
    let reason = if included {
        ValidationReason::Valid
    } else {
        alias_results
            .iter()
            .max_by_key(|r| r.scoreable_row_count)
            .map(|r| r.reason)
            .unwrap_or(ValidationReason::NoDataSource)
    };

    let records: Vec<ScoreRecord> = if included {
        pool.into_iter()
            .filter(|r| {
                alias_results
                    .iter()
                    .any(|a| a.is_valid && a.domain == r.domain)
            })
            .collect()
    } else {
        Vec::new()
    };

    info!(domain_key = config.key, included, reason = %reason, records = records.len(), "domain eligibility");

    DomainSelection {
        kind: config.kind,
        key: config.key,
        title: config.title,
        included,
        reason,
        alias_results,
        records,
    }
}
