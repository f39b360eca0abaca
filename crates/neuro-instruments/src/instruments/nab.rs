use neuro_core::models::score::ScoreType;

use crate::{Instrument, InstrumentCategory, Scale};

/// NAB: Neuropsychological Assessment Battery.
/// Module indices are standard scores; subtests are T-scores.
pub struct Nab;

impl Instrument for Nab {
    fn id(&self) -> &str {
        "nab"
    }

    fn name(&self) -> &str {
        "NAB"
    }

    fn category(&self) -> InstrumentCategory {
        InstrumentCategory::Neuropsychological
    }

    fn default_domain(&self) -> &str {
        "Attention/Executive"
    }

    fn default_score_type(&self) -> ScoreType {
        ScoreType::TScore
    }

    fn aliases(&self) -> &[&str] {
        &["nab_s"]
    }

    fn scales(&self) -> &[Scale] {
        static SCALES: std::sync::LazyLock<Vec<Scale>> = std::sync::LazyLock::new(|| {
            use ScoreType::{StandardScore, TScore};
            vec![
                Scale::new("NAB Attention Index", StandardScore, "Attention/Executive", Some("Attention")),
                Scale::new("NAB Language Index", StandardScore, "Verbal/Language", None),
                Scale::new("NAB Memory Index", StandardScore, "Memory", None),
                Scale::new("NAB Spatial Index", StandardScore, "Visual Perception/Construction", None),
                Scale::new("NAB Executive Functions Index", StandardScore, "Attention/Executive", Some("Executive Functioning")),
                Scale::new("Digits Forward", TScore, "Attention/Executive", Some("Attention")),
                Scale::new("Digits Backward", TScore, "Attention/Executive", Some("Working Memory")),
                Scale::new("List Learning Immediate Recall", TScore, "Memory", Some("Learning Efficiency")),
                Scale::new("List Learning Long Delayed Recall", TScore, "Memory", Some("Delayed Recall")),
                Scale::new("Story Learning Immediate Recall", TScore, "Memory", Some("Learning Efficiency")),
                Scale::new("Naming", TScore, "Verbal/Language", Some("Retrieval")),
                Scale::new("Figure Drawing Copy", TScore, "Visual Perception/Construction", Some("Construction")),
                Scale::new("Mazes", TScore, "Attention/Executive", Some("Planning")),
                Scale::new("Word Generation", TScore, "Attention/Executive", Some("Fluency")),
                Scale::new("Daily Living Memory", TScore, "Daily Living", Some("Memory")),
                Scale::new("Driving Scenes", TScore, "Daily Living", Some("Attention")),
                Scale::new("Bill Payment", TScore, "Daily Living", Some("Executive")),
                Scale::new("Map Reading", TScore, "Daily Living", Some("Spatial")),
            ]
        });
        &SCALES
    }
}
