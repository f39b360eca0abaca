use std::fmt;
use std::path::PathBuf;

use neuro_core::models::usage::Tier;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Failure at the inference backend boundary.
#[derive(Debug, Error)]
pub enum BackendError {
    #[error("model invocation failed: {0}")]
    Invocation(String),

    #[error("response parsing failed: {0}")]
    ResponseParse(String),

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Why a single attempt did not produce a usable narrative.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FailureReason {
    /// The backend reported the model as not installed or not enabled.
    Unavailable,
    Transport { message: String },
    Timeout { seconds: f64 },
    ValidationRejected { quality_score: u8, issues: Vec<String> },
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unavailable => f.write_str("model unavailable"),
            Self::Transport { message } => write!(f, "transport error: {message}"),
            Self::Timeout { seconds } => write!(f, "timed out after {seconds:.1}s"),
            Self::ValidationRejected {
                quality_score,
                issues,
            } => {
                write!(f, "output rejected (quality {quality_score})")?;
                if !issues.is_empty() {
                    write!(f, ": {}", issues.join("; "))?;
                }
                Ok(())
            }
        }
    }
}

/// One failed attempt, in the order it happened.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttemptFailure {
    pub model_id: String,
    pub tier: Tier,
    /// 1-based; 0 for models skipped by the availability check.
    pub attempt: u32,
    pub reason: FailureReason,
}

impl fmt::Display for AttemptFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({} #{}): {}",
            self.model_id, self.tier, self.attempt, self.reason
        )
    }
}

#[derive(Debug, Error)]
pub enum GenerationError {
    /// Every candidate model in both tiers was tried without a valid result.
    /// Fatal for this one request only.
    #[error("all models exhausted for '{domain_key}' ({} failed attempts)", .failures.len())]
    AllModelsExhausted {
        domain_key: String,
        failures: Vec<AttemptFailure>,
    },
}

#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("ledger I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("malformed ledger entry at {path}:{line}: {source}")]
    Parse {
        path: PathBuf,
        line: usize,
        source: serde_json::Error,
    },
}
