use neuro_core::models::score::ScoreType;

use crate::{Instrument, InstrumentCategory, Scale};

/// WIAT-4: Wechsler Individual Achievement Test, Fourth Edition.
/// All subtests and composites are standard scores.
pub struct Wiat4;

impl Instrument for Wiat4 {
    fn id(&self) -> &str {
        "wiat4"
    }

    fn name(&self) -> &str {
        "WIAT-4"
    }

    fn category(&self) -> InstrumentCategory {
        InstrumentCategory::Achievement
    }

    fn default_domain(&self) -> &str {
        "Academic Skills"
    }

    fn default_score_type(&self) -> ScoreType {
        ScoreType::StandardScore
    }

    fn aliases(&self) -> &[&str] {
        &["wiat_4", "wiat-4"]
    }

    fn scales(&self) -> &[Scale] {
        static SCALES: std::sync::LazyLock<Vec<Scale>> = std::sync::LazyLock::new(|| {
            let academic = |name: &str, sub: &str| {
                Scale::new(name, ScoreType::StandardScore, "Academic Skills", Some(sub))
            };
            vec![
                academic("Word Reading", "Reading"),
                academic("Reading Comprehension", "Reading"),
                academic("Pseudoword Decoding", "Reading"),
                academic("Spelling", "Writing"),
                academic("Sentence Composition", "Writing"),
                academic("Numerical Operations", "Math"),
                academic("Math Problem Solving", "Math"),
                academic("Math Fluency-Addition", "Math"),
            ]
        });
        &SCALES
    }
}
