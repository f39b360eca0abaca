use neuro_core::models::score::ScoreRecord;
use neuro_core::models::validation::{DomainValidationResult, ValidationReason};

use crate::rule::DomainRule;

/// Decide whether `domain_name` has enough usable evidence in
/// `candidates` to appear in a report.
///
/// Checks run in a fixed order and the first failure wins:
///
/// 1. no candidates at all: `NoDataSource`
/// 2. fewer scoreable records for the domain than the rule's minimum:
///    `NoScoreableRows`
/// 3. a required column absent from every scoreable record: `NoDomainColumn`
/// 4. an allow-list none of the domain's records come from:
///    `MissingRequiredEvidence`
///
/// Pure and deterministic; safe to call from any thread.
pub fn validate_domain(
    domain_name: &str,
    candidates: &[ScoreRecord],
    rule: &DomainRule,
) -> DomainValidationResult {
    if candidates.is_empty() {
        return DomainValidationResult::rejected(domain_name, ValidationReason::NoDataSource, 0);
    }

    let in_domain: Vec<&ScoreRecord> = candidates
        .iter()
        .filter(|r| r.domain == domain_name)
        .collect();
    let scoreable: Vec<&ScoreRecord> = in_domain
        .iter()
        .copied()
        .filter(|r| r.is_scoreable())
        .collect();
    let count = scoreable.len();

    if count < rule.effective_min_rows() {
        return DomainValidationResult::rejected(
            domain_name,
            ValidationReason::NoScoreableRows,
            count,
        );
    }

    let missing_column = rule
        .required_columns
        .iter()
        .any(|field| !scoreable.iter().any(|r| r.has_field(*field)));
    if missing_column {
        return DomainValidationResult::rejected(
            domain_name,
            ValidationReason::NoDomainColumn,
            count,
        );
    }

    if rule.required_test_allowlist.is_some()
        && !in_domain.iter().any(|r| rule.allows_test(&r.test_id))
    {
        return DomainValidationResult::rejected(
            domain_name,
            ValidationReason::MissingRequiredEvidence,
            count,
        );
    }

    DomainValidationResult::valid(domain_name, count)
}
