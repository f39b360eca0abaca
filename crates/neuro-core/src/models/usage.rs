use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::generation::SectionKind;

/// Priority class of a generation model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tier {
    Primary,
    Fallback,
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Primary => f.write_str("primary"),
            Self::Fallback => f.write_str("fallback"),
        }
    }
}

/// One generation attempt, as recorded in the usage ledger.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationAttemptRecord {
    pub timestamp: jiff::Timestamp,
    /// Shared by every attempt made for the same request.
    pub request_id: Uuid,
    pub section_kind: SectionKind,
    pub model_id: String,
    pub tier: Tier,
    /// 1-based attempt number against this model.
    pub attempt: u32,
    pub input_tokens: u64,
    pub output_tokens: u64,
    pub latency_seconds: f64,
    pub success: bool,
    pub domain_key: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failure: Option<String>,
}

/// Read-side aggregation over ledger records.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AggregateUsageStats {
    pub total_calls: usize,
    pub successful_calls: usize,
    pub failed_calls: usize,
    pub total_tokens: u64,
    /// Summed latency in seconds.
    pub total_time: f64,
    pub models_used: BTreeSet<String>,
    pub domains_processed: BTreeSet<String>,
}

impl AggregateUsageStats {
    pub fn record(&mut self, attempt: &GenerationAttemptRecord) {
        self.total_calls += 1;
        if attempt.success {
            self.successful_calls += 1;
        } else {
            self.failed_calls += 1;
        }
        self.total_tokens += attempt.input_tokens + attempt.output_tokens;
        self.total_time += attempt.latency_seconds;
        self.models_used.insert(attempt.model_id.clone());
        self.domains_processed.insert(attempt.domain_key.clone());
    }

    pub fn success_rate(&self) -> Option<f64> {
        if self.total_calls == 0 {
            None
        } else {
            Some(self.successful_calls as f64 / self.total_calls as f64)
        }
    }
}

impl<'a> FromIterator<&'a GenerationAttemptRecord> for AggregateUsageStats {
    fn from_iter<I: IntoIterator<Item = &'a GenerationAttemptRecord>>(iter: I) -> Self {
        let mut stats = Self::default();
        for attempt in iter {
            stats.record(attempt);
        }
        stats
    }
}
