use neuro_core::models::score::{Rater, ScoreType};

use crate::{Instrument, InstrumentCategory, Scale};

/// BASC-3: Behavior Assessment System for Children, Third Edition.
/// Parent, teacher and self-report forms; all scales are T-scores.
/// Higher clinical scores indicate greater problems.
pub struct Basc3;

impl Instrument for Basc3 {
    fn id(&self) -> &str {
        "basc3"
    }

    fn name(&self) -> &str {
        "BASC-3"
    }

    fn category(&self) -> InstrumentCategory {
        InstrumentCategory::RatingScale
    }

    fn default_domain(&self) -> &str {
        "Behavioral/Emotional/Social"
    }

    fn default_score_type(&self) -> ScoreType {
        ScoreType::TScore
    }

    fn aliases(&self) -> &[&str] {
        &["basc3_prs", "basc3_trs", "basc3_srp"]
    }

    fn respondents(&self) -> &[Rater] {
        &[Rater::Parent, Rater::Teacher, Rater::SelfReport]
    }

    fn scales(&self) -> &[Scale] {
        static SCALES: std::sync::LazyLock<Vec<Scale>> = std::sync::LazyLock::new(|| {
            let clinical = |name: &str, sub: &str| {
                Scale::new(name, ScoreType::TScore, "Behavioral/Emotional/Social", Some(sub))
            };
            vec![
                Scale::new("Hyperactivity", ScoreType::TScore, "ADHD", Some("Hyperactivity/Impulsivity")),
                Scale::new("Attention Problems", ScoreType::TScore, "ADHD", Some("Inattention")),
                clinical("Aggression", "Externalizing Problems"),
                clinical("Conduct Problems", "Externalizing Problems"),
                clinical("Anxiety", "Internalizing Problems"),
                clinical("Depression", "Internalizing Problems"),
                clinical("Somatization", "Internalizing Problems"),
                clinical("Atypicality", "Behavioral Symptoms"),
                clinical("Withdrawal", "Behavioral Symptoms"),
                clinical("Adaptability", "Adaptive Skills"),
                clinical("Social Skills", "Adaptive Skills"),
                clinical("Externalizing Problems", "Composite"),
                clinical("Internalizing Problems", "Composite"),
                clinical("Behavioral Symptoms Index", "Composite"),
            ]
        });
        &SCALES
    }
}
