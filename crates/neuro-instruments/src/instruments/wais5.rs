use neuro_core::models::score::ScoreType;

use crate::{Instrument, InstrumentCategory, Scale};

/// WAIS-5: Wechsler Adult Intelligence Scale, Fifth Edition.
pub struct Wais5;

impl Instrument for Wais5 {
    fn id(&self) -> &str {
        "wais5"
    }

    fn name(&self) -> &str {
        "WAIS-5"
    }

    fn category(&self) -> InstrumentCategory {
        InstrumentCategory::Cognitive
    }

    fn default_domain(&self) -> &str {
        "General Cognitive Ability"
    }

    fn default_score_type(&self) -> ScoreType {
        ScoreType::ScaledScore
    }

    fn aliases(&self) -> &[&str] {
        &["wais_5", "wais4", "wais_iv"]
    }

    fn scales(&self) -> &[Scale] {
        static SCALES: std::sync::LazyLock<Vec<Scale>> = std::sync::LazyLock::new(|| {
            use ScoreType::{ScaledScore, StandardScore};
            vec![
                Scale::new("Full Scale IQ (FSIQ)", StandardScore, "General Cognitive Ability", None),
                Scale::new("Verbal Comprehension (VCI)", StandardScore, "Verbal/Language", Some("Comprehension")),
                Scale::new("Visual Spatial (VSI)", StandardScore, "Visual Perception/Construction", None),
                Scale::new("Fluid Reasoning (FRI)", StandardScore, "General Cognitive Ability", Some("Fluid Reasoning")),
                Scale::new("Working Memory (WMI)", StandardScore, "Attention/Executive", Some("Working Memory")),
                Scale::new("Processing Speed (PSI)", StandardScore, "Attention/Executive", Some("Processing Speed")),
                Scale::new("Block Design", ScaledScore, "Visual Perception/Construction", Some("Organization")),
                Scale::new("Digit Sequencing", ScaledScore, "Attention/Executive", Some("Working Memory")),
                Scale::new("Coding", ScaledScore, "Attention/Executive", Some("Processing Speed")),
            ]
        });
        &SCALES
    }
}
