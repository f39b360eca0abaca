use neuro_core::models::score::{Rater, ScoreType};

use crate::{Instrument, InstrumentCategory, Scale};

/// CAARS-2: Conners' Adult ADHD Rating Scales, Second Edition.
/// Self-report and observer forms, T-scores.
pub struct Caars2;

impl Instrument for Caars2 {
    fn id(&self) -> &str {
        "caars2"
    }

    fn name(&self) -> &str {
        "CAARS-2"
    }

    fn category(&self) -> InstrumentCategory {
        InstrumentCategory::RatingScale
    }

    fn default_domain(&self) -> &str {
        "ADHD"
    }

    fn default_score_type(&self) -> ScoreType {
        ScoreType::TScore
    }

    fn aliases(&self) -> &[&str] {
        &["caars2_self", "caars2_observer"]
    }

    fn respondents(&self) -> &[Rater] {
        &[Rater::SelfReport, Rater::Observer]
    }

    fn scales(&self) -> &[Scale] {
        static SCALES: std::sync::LazyLock<Vec<Scale>> = std::sync::LazyLock::new(|| {
            let adhd = |name: &str, sub: &str| Scale::new(name, ScoreType::TScore, "ADHD", Some(sub));
            vec![
                adhd("Inattention/Executive Dysfunction", "Inattention"),
                adhd("Hyperactivity", "Hyperactivity/Impulsivity"),
                adhd("Impulsivity", "Hyperactivity/Impulsivity"),
                adhd("Emotional Dysregulation", "Emotional Dysregulation"),
                adhd("Negative Self-Concept", "Self-Concept"),
                adhd("ADHD Index", "Composite"),
                adhd("DSM Total ADHD Symptoms", "DSM Symptom Scales"),
            ]
        });
        &SCALES
    }
}
