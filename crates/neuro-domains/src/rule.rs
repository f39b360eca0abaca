use std::collections::{BTreeMap, BTreeSet};

use neuro_core::models::score::ScoreField;
use neuro_instruments::{InstrumentCategory, instrument_ids};
use serde::{Deserialize, Serialize};

use crate::catalogue::DomainKind;
use crate::error::DomainError;

fn default_min_scoreable_rows() -> usize {
    1
}

/// Evidence a domain must show before it is included in a report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DomainRule {
    /// Columns that must be present on at least one scoreable record.
    #[serde(default)]
    pub required_columns: BTreeSet<ScoreField>,
    #[serde(default = "default_min_scoreable_rows")]
    pub min_scoreable_rows: usize,
    /// When set, at least one record must come from one of these tests.
    #[serde(default)]
    pub required_test_allowlist: Option<BTreeSet<String>>,
}

impl Default for DomainRule {
    fn default() -> Self {
        Self {
            required_columns: BTreeSet::new(),
            min_scoreable_rows: default_min_scoreable_rows(),
            required_test_allowlist: None,
        }
    }
}

impl DomainRule {
    /// Built-in rule for a domain. Only adaptive functioning ships with an
    /// allow-list: the adaptive behavior instruments in the catalogue.
    pub fn default_for(kind: DomainKind) -> Self {
        match kind {
            DomainKind::Adaptive => Self {
                required_test_allowlist: Some(
                    instrument_ids(InstrumentCategory::Adaptive)
                        .into_iter()
                        .collect(),
                ),
                ..Self::default()
            },
            _ => Self::default(),
        }
    }

    /// Zero would admit a domain with no data at all.
    pub fn effective_min_rows(&self) -> usize {
        self.min_scoreable_rows.max(1)
    }

    pub fn allows_test(&self, test_id: &str) -> bool {
        match &self.required_test_allowlist {
            None => true,
            Some(allowed) => allowed.iter().any(|t| t.eq_ignore_ascii_case(test_id)),
        }
    }
}

/// Per-domain rules: built-in defaults plus externally supplied overrides.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuleSet {
    overrides: BTreeMap<DomainKind, DomainRule>,
}

impl RuleSet {
    /// Build from overrides keyed by domain key (e.g. `"adaptive"`), as they
    /// appear in the config file. An unknown key is an error rather than a
    /// silently ignored rule.
    pub fn from_overrides(overrides: &BTreeMap<String, DomainRule>) -> Result<Self, DomainError> {
        let overrides = overrides
            .iter()
            .map(|(key, rule)| Ok((DomainKind::from_key(key)?, rule.clone())))
            .collect::<Result<_, DomainError>>()?;
        Ok(Self { overrides })
    }

    pub fn set(&mut self, kind: DomainKind, rule: DomainRule) {
        self.overrides.insert(kind, rule);
    }

    pub fn rule_for(&self, kind: DomainKind) -> DomainRule {
        self.overrides
            .get(&kind)
            .cloned()
            .unwrap_or_else(|| DomainRule::default_for(kind))
    }
}
