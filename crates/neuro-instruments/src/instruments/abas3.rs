use neuro_core::models::score::{Rater, ScoreType};

use crate::{Instrument, InstrumentCategory, Scale};

/// ABAS-3: Adaptive Behavior Assessment System, Third Edition.
/// Composites are standard scores; skill areas are scaled scores.
pub struct Abas3;

impl Instrument for Abas3 {
    fn id(&self) -> &str {
        "abas3"
    }

    fn name(&self) -> &str {
        "ABAS-3"
    }

    fn category(&self) -> InstrumentCategory {
        InstrumentCategory::Adaptive
    }

    fn default_domain(&self) -> &str {
        "Adaptive Functioning"
    }

    fn default_score_type(&self) -> ScoreType {
        ScoreType::ScaledScore
    }

    fn respondents(&self) -> &[Rater] {
        &[Rater::Parent, Rater::Teacher, Rater::SelfReport]
    }

    fn scales(&self) -> &[Scale] {
        static SCALES: std::sync::LazyLock<Vec<Scale>> = std::sync::LazyLock::new(|| {
            use ScoreType::StandardScore;
            let domain = "Adaptive Functioning";
            vec![
                Scale::new("General Adaptive Composite", StandardScore, domain, None),
                Scale::new("Conceptual", StandardScore, domain, Some("Conceptual")),
                Scale::new("Social", StandardScore, domain, Some("Social")),
                Scale::new("Practical", StandardScore, domain, Some("Practical")),
            ]
        });
        &SCALES
    }
}
