use neuro_core::models::score::ScoreType;

use crate::{Instrument, InstrumentCategory, Scale};

/// WISC-V: Wechsler Intelligence Scale for Children, Fifth Edition.
/// Primary indices are standard scores (mean 100, SD 15); subtests are
/// scaled scores (mean 10, SD 3).
pub struct Wisc5;

impl Instrument for Wisc5 {
    fn id(&self) -> &str {
        "wisc5"
    }

    fn name(&self) -> &str {
        "WISC-V"
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
        &["wisc_v", "wisc-v"]
    }

    fn scales(&self) -> &[Scale] {
        static SCALES: std::sync::LazyLock<Vec<Scale>> = std::sync::LazyLock::new(|| {
            use ScoreType::{ScaledScore, StandardScore};
            vec![
                Scale::new("Full Scale IQ (FSIQ)", StandardScore, "General Cognitive Ability", None),
                Scale::new("General Ability (GAI)", StandardScore, "General Cognitive Ability", None),
                Scale::new("Fluid Reasoning (FRI)", StandardScore, "General Cognitive Ability", Some("Fluid Reasoning")),
                Scale::new("Verbal Comprehension (VCI)", StandardScore, "Verbal/Language", Some("Comprehension")),
                Scale::new("Visual Spatial (VSI)", StandardScore, "Visual Perception/Construction", None),
                Scale::new("Working Memory (WMI)", StandardScore, "Attention/Executive", Some("Working Memory")),
                Scale::new("Processing Speed (PSI)", StandardScore, "Attention/Executive", Some("Processing Speed")),
                Scale::new("Similarities", ScaledScore, "Verbal/Language", Some("Comprehension")),
                Scale::new("Vocabulary", ScaledScore, "Verbal/Language", Some("Comprehension")),
                Scale::new("Block Design", ScaledScore, "Visual Perception/Construction", Some("Organization")),
                Scale::new("Visual Puzzles", ScaledScore, "Visual Perception/Construction", Some("Perception")),
                Scale::new("Matrix Reasoning", ScaledScore, "General Cognitive Ability", Some("Fluid Reasoning")),
                Scale::new("Figure Weights", ScaledScore, "General Cognitive Ability", Some("Fluid Reasoning")),
                Scale::new("Digit Span", ScaledScore, "Attention/Executive", Some("Working Memory")),
                Scale::new("Picture Span", ScaledScore, "Attention/Executive", Some("Working Memory")),
                Scale::new("Coding", ScaledScore, "Attention/Executive", Some("Processing Speed")),
                Scale::new("Symbol Search", ScaledScore, "Attention/Executive", Some("Processing Speed")),
            ]
        });
        &SCALES
    }
}
