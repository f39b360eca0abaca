use std::collections::BTreeMap;

use neuro_core::models::generation::SectionKind;
use serde::{Deserialize, Serialize};

/// Ordered model preferences for one section kind.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelTiers {
    #[serde(default)]
    pub primary: Vec<String>,
    #[serde(default)]
    pub fallback: Vec<String>,
}

impl ModelTiers {
    pub fn new<P, F>(primary: P, fallback: F) -> Self
    where
        P: IntoIterator,
        P::Item: Into<String>,
        F: IntoIterator,
        F::Item: Into<String>,
    {
        Self {
            primary: primary.into_iter().map(Into::into).collect(),
            fallback: fallback.into_iter().map(Into::into).collect(),
        }
    }
}

/// Which models to try, per section kind. Serialized as a map keyed by
/// section kind, e.g. `{"domain_summary": {"primary": [...], "fallback": [...]}}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ModelCatalogue {
    sections: BTreeMap<SectionKind, ModelTiers>,
}

impl ModelCatalogue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_section(mut self, kind: SectionKind, tiers: ModelTiers) -> Self {
        self.sections.insert(kind, tiers);
        self
    }

    /// Tiers for a section kind; empty when none are configured.
    pub fn tiers(&self, kind: SectionKind) -> ModelTiers {
        self.sections.get(&kind).cloned().unwrap_or_default()
    }

    /// Models suited to a workstation running Ollama.
    pub fn local_defaults() -> Self {
        Self::new()
            .with_section(
                SectionKind::DomainSummary,
                ModelTiers::new(["qwen3:8b", "llama3.1:8b"], ["mistral:7b"]),
            )
            .with_section(
                SectionKind::IntegratedSummary,
                ModelTiers::new(["qwen3:14b", "qwen3:8b"], ["llama3.1:8b"]),
            )
            .with_section(
                SectionKind::ComprehensiveSummary,
                ModelTiers::new(["qwen3:14b"], ["qwen3:8b", "llama3.1:8b"]),
            )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_section_has_no_models() {
        let catalogue = ModelCatalogue::new();
        assert_eq!(catalogue.tiers(SectionKind::DomainSummary), ModelTiers::default());
    }

    #[test]
    fn serializes_as_section_map() {
        let catalogue = ModelCatalogue::new().with_section(
            SectionKind::DomainSummary,
            ModelTiers::new(["a"], ["b"]),
        );
        let json = serde_json::to_value(&catalogue).unwrap();
        assert_eq!(json["domain_summary"]["primary"][0], "a");

        let parsed: ModelCatalogue =
            serde_json::from_str(r#"{"integrated_summary": {"primary": ["x"]}}"#).unwrap();
        assert_eq!(parsed.tiers(SectionKind::IntegratedSummary).primary, vec!["x"]);
        assert!(parsed.tiers(SectionKind::IntegratedSummary).fallback.is_empty());
    }
}
