use neuro_core::models::score::{Rater, ScoreType};

use crate::{Instrument, InstrumentCategory, Scale};

/// Vineland-3: Vineland Adaptive Behavior Scales, Third Edition.
/// Domain composites are standard scores (mean 100, SD 15); subdomains
/// are v-scale scores reported on the scaled metric.
pub struct Vineland3;

impl Instrument for Vineland3 {
    fn id(&self) -> &str {
        "vineland3"
    }

    fn name(&self) -> &str {
        "Vineland-3"
    }

    fn category(&self) -> InstrumentCategory {
        InstrumentCategory::Adaptive
    }

    fn default_domain(&self) -> &str {
        "Adaptive Functioning"
    }

    fn default_score_type(&self) -> ScoreType {
        ScoreType::StandardScore
    }

    fn aliases(&self) -> &[&str] {
        &["vineland_3", "vabs3"]
    }

    fn respondents(&self) -> &[Rater] {
        &[Rater::Parent, Rater::Teacher]
    }

    fn scales(&self) -> &[Scale] {
        static SCALES: std::sync::LazyLock<Vec<Scale>> = std::sync::LazyLock::new(|| {
            use ScoreType::{ScaledScore, StandardScore};
            let domain = "Adaptive Functioning";
            vec![
                Scale::new("Adaptive Behavior Composite", StandardScore, domain, None),
                Scale::new("Communication", StandardScore, domain, Some("Communication")),
                Scale::new("Daily Living Skills", StandardScore, domain, Some("Daily Living Skills")),
                Scale::new("Socialization", StandardScore, domain, Some("Socialization")),
                Scale::new("Receptive", ScaledScore, domain, Some("Communication")),
                Scale::new("Expressive", ScaledScore, domain, Some("Communication")),
                Scale::new("Personal", ScaledScore, domain, Some("Daily Living Skills")),
                Scale::new("Domestic", ScaledScore, domain, Some("Daily Living Skills")),
                Scale::new("Community", ScaledScore, domain, Some("Daily Living Skills")),
                Scale::new("Interpersonal Relationships", ScaledScore, domain, Some("Socialization")),
                Scale::new("Coping Skills", ScaledScore, domain, Some("Socialization")),
            ]
        });
        &SCALES
    }
}
