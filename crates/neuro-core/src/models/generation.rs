use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// The kind of narrative section a request produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SectionKind {
    DomainSummary,
    IntegratedSummary,
    ComprehensiveSummary,
}

impl SectionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::DomainSummary => "domain_summary",
            Self::IntegratedSummary => "integrated_summary",
            Self::ComprehensiveSummary => "comprehensive_summary",
        }
    }

    /// Summary sections speak about the patient, not the instruments, so
    /// naming a test there is an error.
    pub fn forbids_test_names(&self) -> bool {
        !matches!(self, Self::DomainSummary)
    }
}

impl fmt::Display for SectionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SectionKind {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "domain_summary" | "domain" => Ok(Self::DomainSummary),
            "integrated_summary" | "integrated" => Ok(Self::IntegratedSummary),
            "comprehensive_summary" | "comprehensive" => Ok(Self::ComprehensiveSummary),
            other => Err(CoreError::UnknownSectionKind(other.to_string())),
        }
    }
}

/// A fully assembled prompt, ready for the generation client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationRequest {
    pub section_kind: SectionKind,
    pub prompt_system: String,
    pub prompt_user: String,
    /// Stable identifier used for logging and output file naming.
    pub domain_key: String,
    pub temperature: f32,
    pub requires_strict_validation: bool,
    /// Display names of the tests the prompt draws on; used to detect test
    /// names leaking into sections that forbid them.
    #[serde(default)]
    pub referenced_tests: Vec<String>,
}
