use neuro_core::models::usage::{AggregateUsageStats, Tier};
use neuro_core::models::validation::ValidationReason;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// What happened to one report section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum NarrativeStatus {
    Generated {
        model_id: String,
        tier: Tier,
        attempts: u32,
    },
    /// Every model was exhausted; a placeholder was written instead.
    NeedsManualNarrative { failures: Vec<String> },
    /// The domain did not have enough evidence to appear in the report.
    Excluded { reason: ValidationReason },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DomainEntry {
    pub key: String,
    pub title: String,
    /// Text file written for this section, relative to the output dir.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
    pub scoreable_rows: usize,
    #[serde(flatten)]
    pub status: NarrativeStatus,
}

impl DomainEntry {
    pub fn is_generated(&self) -> bool {
        matches!(self.status, NarrativeStatus::Generated { .. })
    }

    pub fn needs_manual_narrative(&self) -> bool {
        matches!(self.status, NarrativeStatus::NeedsManualNarrative { .. })
    }
}

/// `narratives.json`: the outcome of one report run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunManifest {
    pub run_id: Uuid,
    pub started_at: jiff::Timestamp,
    pub finished_at: jiff::Timestamp,
    pub patient: String,
    pub rows_total: usize,
    pub rows_skipped: usize,
    pub domains: Vec<DomainEntry>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub integrated_summary: Option<DomainEntry>,
    pub usage: AggregateUsageStats,
}

impl RunManifest {
    pub fn included(&self) -> impl Iterator<Item = &DomainEntry> {
        self.domains
            .iter()
            .filter(|d| !matches!(d.status, NarrativeStatus::Excluded { .. }))
    }

    /// Keys of sections that still need a clinician's narrative.
    pub fn pending_keys(&self) -> Vec<&str> {
        self.domains
            .iter()
            .chain(self.integrated_summary.iter())
            .filter(|d| d.needs_manual_narrative())
            .map(|d| d.key.as_str())
            .collect()
    }
}
