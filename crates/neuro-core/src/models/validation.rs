use std::fmt;

use serde::{Deserialize, Serialize};

/// Why a domain was (or was not) eligible for the report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationReason {
    /// The dataset handed to the validator was empty.
    NoDataSource,
    /// A column the domain rule requires is absent from every record.
    NoDomainColumn,
    NoScoreableRows,
    MissingRequiredEvidence,
    Valid,
}

impl fmt::Display for ValidationReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::NoDataSource => "no data source",
            Self::NoDomainColumn => "required column missing",
            Self::NoScoreableRows => "no scoreable rows",
            Self::MissingRequiredEvidence => "missing required evidence",
            Self::Valid => "valid",
        };
        f.write_str(s)
    }
}

/// Outcome of evaluating one named domain against a dataset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DomainValidationResult {
    pub domain: String,
    pub is_valid: bool,
    pub reason: ValidationReason,
    pub scoreable_row_count: usize,
}

impl DomainValidationResult {
    pub fn valid(domain: impl Into<String>, scoreable_row_count: usize) -> Self {
        Self {
            domain: domain.into(),
            is_valid: scoreable_row_count >= 1,
            reason: if scoreable_row_count >= 1 {
                ValidationReason::Valid
            } else {
                ValidationReason::NoScoreableRows
            },
            scoreable_row_count,
        }
    }

    /// A rejection. `Valid` is not a rejection reason and is recorded as
    /// `NoScoreableRows`.
    pub fn rejected(
        domain: impl Into<String>,
        reason: ValidationReason,
        scoreable_row_count: usize,
    ) -> Self {
        let reason = match reason {
            ValidationReason::Valid => ValidationReason::NoScoreableRows,
            other => other,
        };
        Self {
            domain: domain.into(),
            is_valid: false,
            reason,
            scoreable_row_count,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_needs_a_scoreable_row() {
        assert!(DomainValidationResult::valid("Memory", 2).is_valid);
        let empty = DomainValidationResult::valid("Memory", 0);
        assert!(!empty.is_valid);
        assert_eq!(empty.reason, ValidationReason::NoScoreableRows);
    }

    #[test]
    fn rejection_never_reports_valid() {
        let result = DomainValidationResult::rejected("Memory", ValidationReason::Valid, 3);
        assert!(!result.is_valid);
        assert_eq!(result.reason, ValidationReason::NoScoreableRows);
        assert_eq!(result.scoreable_row_count, 3);

        let result = DomainValidationResult::rejected("Memory", ValidationReason::NoDataSource, 0);
        assert_eq!(result.reason, ValidationReason::NoDataSource);
    }
}
