//! neuro-instruments
//!
//! Test instrument definitions and normative score math. Pure data, no
//! I/O. Each instrument knows its display name, the domain its scales
//! report under, and the metric those scales are expressed in, so the
//! normalizer can fill in what a score export leaves out.

pub mod error;
pub mod instruments;
pub mod scoring;

use neuro_core::models::score::{Rater, ScoreRecord, ScoreType};
use serde::{Deserialize, Serialize};

use scoring::RangeWarning;

/// Broad family an instrument belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InstrumentCategory {
    Cognitive,
    Achievement,
    Neuropsychological,
    RatingScale,
    Adaptive,
}

/// A scale (index, subtest or composite) reported by an instrument.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scale {
    pub name: String,
    pub score_type: ScoreType,
    pub domain: String,
    pub subdomain: Option<String>,
}

impl Scale {
    pub fn new(name: &str, score_type: ScoreType, domain: &str, subdomain: Option<&str>) -> Self {
        Self {
            name: name.to_string(),
            score_type,
            domain: domain.to_string(),
            subdomain: subdomain.map(str::to_string),
        }
    }
}

/// Trait implemented by each supported test instrument.
pub trait Instrument: Send + Sync {
    /// Short code used in score exports (e.g., "wisc5", "vineland3").
    fn id(&self) -> &str;

    /// Human-readable name (e.g., "WISC-V", "Vineland-3").
    fn name(&self) -> &str;

    fn category(&self) -> InstrumentCategory;

    /// Domain used for scales the instrument does not list explicitly.
    fn default_domain(&self) -> &str;

    /// Metric used for scales the instrument does not list explicitly.
    fn default_score_type(&self) -> ScoreType;

    /// Other codes the same instrument is exported under.
    fn aliases(&self) -> &[&str] {
        &[]
    }

    /// Respondent forms, for rating scales.
    fn respondents(&self) -> &[Rater] {
        &[]
    }

    fn scales(&self) -> &[Scale];

    fn matches_id(&self, test_id: &str) -> bool {
        let wanted = test_id.trim().to_ascii_lowercase();
        self.id() == wanted || self.aliases().iter().any(|a| *a == wanted)
    }

    /// Case-insensitive scale lookup.
    fn scale(&self, scale_name: &str) -> Option<&Scale> {
        let wanted = scale_name.trim();
        self.scales()
            .iter()
            .find(|s| s.name.eq_ignore_ascii_case(wanted))
    }

    fn score_type_for(&self, scale_name: &str) -> ScoreType {
        self.scale(scale_name)
            .map(|s| s.score_type)
            .unwrap_or_else(|| self.default_score_type())
    }

    fn domain_for(&self, scale_name: &str) -> &str {
        self.scale(scale_name)
            .map(|s| s.domain.as_str())
            .unwrap_or_else(|| self.default_domain())
    }

    /// Check a record's standard score against its metric's plausible range.
    fn check_range(&self, record: &ScoreRecord) -> Option<RangeWarning> {
        let value = record.standard_score?;
        let score_type = record
            .score_type
            .unwrap_or_else(|| self.score_type_for(&record.scale_name));
        let range = scoring::plausible_range(score_type)?;
        if range.contains(value) {
            return None;
        }
        Some(RangeWarning {
            test_id: record.test_id.clone(),
            scale_name: record.scale_name.clone(),
            value,
            score_type,
            expected_range: range,
            message: format!(
                "{}: {} {} {} is outside range [{}, {}]",
                self.name(),
                record.scale_name,
                score_type,
                value,
                range.min,
                range.max,
            ),
        })
    }
}

/// Return all registered instruments.
pub fn all_instruments() -> Vec<Box<dyn Instrument>> {
    vec![
        Box::new(instruments::wisc5::Wisc5),
        Box::new(instruments::wais5::Wais5),
        Box::new(instruments::wiat4::Wiat4),
        Box::new(instruments::nab::Nab),
        Box::new(instruments::basc3::Basc3),
        Box::new(instruments::caars2::Caars2),
        Box::new(instruments::vineland3::Vineland3),
        Box::new(instruments::abas3::Abas3),
    ]
}

/// Look up an instrument by its export code or one of its aliases.
pub fn get_instrument(test_id: &str) -> Option<Box<dyn Instrument>> {
    all_instruments().into_iter().find(|i| i.matches_id(test_id))
}

/// Codes of every instrument in the given category, aliases included.
pub fn instrument_ids(category: InstrumentCategory) -> Vec<String> {
    all_instruments()
        .iter()
        .filter(|i| i.category() == category)
        .flat_map(|i| {
            std::iter::once(i.id().to_string()).chain(i.aliases().iter().map(|a| a.to_string()))
        })
        .collect()
}
