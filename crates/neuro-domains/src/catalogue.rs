use std::fmt;
use std::str::FromStr;

use neuro_core::models::score::Rater;
use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// Whether the report is for a child or an adult; decides which rater
/// sets the behavior-rating domains draw on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PatientType {
    Child,
    Adult,
}

impl FromStr for PatientType {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "child" | "pediatric" => Ok(Self::Child),
            "adult" => Ok(Self::Adult),
            other => Err(DomainError::UnknownPatientType(other.to_string())),
        }
    }
}

/// Every section a report can contain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DomainKind {
    Iq,
    Academics,
    Verbal,
    Spatial,
    Memory,
    Executive,
    Motor,
    Social,
    AdhdChild,
    AdhdAdult,
    EmotionChild,
    EmotionAdult,
    Adaptive,
    DailyLiving,
}

/// Declarative description of one report domain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DomainConfig {
    pub kind: DomainKind,
    /// Stable identifier used for logging, rule overrides and file names.
    pub key: &'static str,
    pub title: &'static str,
    /// Domain labels in the score data that route to this section.
    pub domain_names: &'static [&'static str],
    /// Raters whose records belong here. Empty means any rater.
    pub raters: &'static [Rater],
    pub patients: &'static [PatientType],
    /// Position of the section within the results chapter.
    pub section: u8,
}

impl DomainConfig {
    /// Name of the narrative file the renderer includes for this domain.
    pub fn text_file_name(&self) -> String {
        format!("_02-{:02}_{}_text.qmd", self.section, self.key)
    }

    pub fn accepts_rater(&self, rater: Option<Rater>) -> bool {
        match rater {
            None => true,
            Some(r) => self.raters.is_empty() || self.raters.contains(&r),
        }
    }

    pub fn routes(&self, domain: &str) -> bool {
        self.domain_names.iter().any(|d| *d == domain)
    }
}

const BOTH: &[PatientType] = &[PatientType::Child, PatientType::Adult];
const CHILD: &[PatientType] = &[PatientType::Child];
const ADULT: &[PatientType] = &[PatientType::Adult];

const CHILD_RATERS: &[Rater] = &[Rater::SelfReport, Rater::Parent, Rater::Teacher];

const EMOTION_DOMAINS: &[&str] = &[
    "Behavioral/Emotional/Social",
    "Emotional/Behavioral/Personality",
    "Psychiatric Disorders",
    "Personality Disorders",
    "Substance Use",
    "Psychosocial Problems",
];

static DOMAINS: [DomainConfig; 14] = [
    DomainConfig {
        kind: DomainKind::Iq,
        key: "iq",
        title: "General Cognitive Ability",
        domain_names: &["General Cognitive Ability"],
        raters: &[],
        patients: BOTH,
        section: 1,
    },
    DomainConfig {
        kind: DomainKind::Academics,
        key: "academics",
        title: "Academic Skills",
        domain_names: &["Academic Skills"],
        raters: &[],
        patients: BOTH,
        section: 2,
    },
    DomainConfig {
        kind: DomainKind::Verbal,
        key: "verbal",
        title: "Verbal/Language",
        domain_names: &["Verbal/Language"],
        raters: &[],
        patients: BOTH,
        section: 3,
    },
    DomainConfig {
        kind: DomainKind::Spatial,
        key: "spatial",
        title: "Visual Perception/Construction",
        domain_names: &["Visual Perception/Construction"],
        raters: &[],
        patients: BOTH,
        section: 4,
    },
    DomainConfig {
        kind: DomainKind::Memory,
        key: "memory",
        title: "Memory",
        domain_names: &["Memory"],
        raters: &[],
        patients: BOTH,
        section: 5,
    },
    DomainConfig {
        kind: DomainKind::Executive,
        key: "executive",
        title: "Attention/Executive",
        domain_names: &["Attention/Executive"],
        raters: &[],
        patients: BOTH,
        section: 6,
    },
    DomainConfig {
        kind: DomainKind::Motor,
        key: "motor",
        title: "Motor",
        domain_names: &["Motor"],
        raters: &[],
        patients: BOTH,
        section: 7,
    },
    DomainConfig {
        kind: DomainKind::Social,
        key: "social",
        title: "Social Cognition",
        domain_names: &["Social Cognition"],
        raters: &[],
        patients: BOTH,
        section: 8,
    },
    DomainConfig {
        kind: DomainKind::AdhdChild,
        key: "adhd_child",
        title: "ADHD",
        domain_names: &["ADHD"],
        raters: CHILD_RATERS,
        patients: CHILD,
        section: 9,
    },
    DomainConfig {
        kind: DomainKind::AdhdAdult,
        key: "adhd_adult",
        title: "ADHD",
        domain_names: &["ADHD"],
        raters: &[Rater::SelfReport, Rater::Observer],
        patients: ADULT,
        section: 9,
    },
    DomainConfig {
        kind: DomainKind::EmotionChild,
        key: "emotion_child",
        title: "Behavioral/Emotional/Social",
        domain_names: EMOTION_DOMAINS,
        raters: CHILD_RATERS,
        patients: CHILD,
        section: 10,
    },
    DomainConfig {
        kind: DomainKind::EmotionAdult,
        key: "emotion_adult",
        title: "Emotional/Behavioral/Personality",
        domain_names: EMOTION_DOMAINS,
        raters: &[Rater::SelfReport],
        patients: ADULT,
        section: 10,
    },
    DomainConfig {
        kind: DomainKind::Adaptive,
        key: "adaptive",
        title: "Adaptive Functioning",
        domain_names: &["Adaptive Functioning"],
        raters: &[],
        patients: BOTH,
        section: 11,
    },
    DomainConfig {
        kind: DomainKind::DailyLiving,
        key: "daily_living",
        title: "Daily Living",
        domain_names: &["Daily Living"],
        raters: &[],
        patients: BOTH,
        section: 12,
    },
];

impl DomainKind {
    pub fn config(&self) -> &'static DomainConfig {
        // DOMAINS is declared in enum order.
        &DOMAINS[*self as usize]
    }

    pub fn key(&self) -> &'static str {
        self.config().key
    }

    pub fn all() -> impl Iterator<Item = DomainKind> {
        DOMAINS.iter().map(|c| c.kind)
    }

    pub fn from_key(key: &str) -> Result<Self, DomainError> {
        DOMAINS
            .iter()
            .find(|c| c.key == key.trim())
            .map(|c| c.kind)
            .ok_or_else(|| DomainError::UnknownDomainKey(key.to_string()))
    }
}

impl fmt::Display for DomainKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Domains that apply to a patient, in report order.
pub fn catalogue(patient: PatientType) -> Vec<&'static DomainConfig> {
    DOMAINS
        .iter()
        .filter(|c| c.patients.contains(&patient))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn configs_are_in_enum_order() {
        for kind in DomainKind::all() {
            assert_eq!(kind.config().kind, kind);
        }
    }

    #[test]
    fn keys_round_trip() {
        for kind in DomainKind::all() {
            assert_eq!(DomainKind::from_key(kind.key()).unwrap(), kind);
        }
        assert!(DomainKind::from_key("astrology").is_err());
    }

    #[test]
    fn child_and_adult_catalogues_differ_only_in_rater_domains() {
        let child: Vec<_> = catalogue(PatientType::Child).iter().map(|c| c.kind).collect();
        let adult: Vec<_> = catalogue(PatientType::Adult).iter().map(|c| c.kind).collect();
        assert_eq!(child.len(), 12);
        assert_eq!(adult.len(), 12);
        assert!(child.contains(&DomainKind::AdhdChild));
        assert!(!child.contains(&DomainKind::AdhdAdult));
        assert!(adult.contains(&DomainKind::EmotionAdult));
    }

    #[test]
    fn text_file_names_are_stable() {
        assert_eq!(DomainKind::Iq.config().text_file_name(), "_02-01_iq_text.qmd");
        assert_eq!(
            DomainKind::AdhdAdult.config().text_file_name(),
            "_02-09_adhd_adult_text.qmd"
        );
    }

    #[test]
    fn rater_filter() {
        let adult_emotion = DomainKind::EmotionAdult.config();
        assert!(adult_emotion.accepts_rater(None));
        assert!(adult_emotion.accepts_rater(Some(Rater::SelfReport)));
        assert!(!adult_emotion.accepts_rater(Some(Rater::Parent)));
        assert!(DomainKind::Memory.config().accepts_rater(Some(Rater::Teacher)));
    }
}
