use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// The metric a record's `standard_score` is expressed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreType {
    /// Normed score, mean=50, SD=10.
    TScore,
    /// Normed score, mean=10, SD=3.
    ScaledScore,
    /// Normed score, mean=100, SD=15.
    StandardScore,
    /// Already standardized, mean=0, SD=1.
    ZScore,
    /// Percentile rank (0–100).
    Percentile,
    /// Unscaled count or sum.
    RawScore,
    /// Cumulative base rate, not normally distributed.
    BaseRate,
}

impl ScoreType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::TScore => "t_score",
            Self::ScaledScore => "scaled_score",
            Self::StandardScore => "standard_score",
            Self::ZScore => "z_score",
            Self::Percentile => "percentile",
            Self::RawScore => "raw_score",
            Self::BaseRate => "base_rate",
        }
    }
}

impl fmt::Display for ScoreType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ScoreType {
    type Err = CoreError;

    /// Accepts the canonical snake_case names plus the spellings seen in
    /// score exports ("T score", "scaled", "SS", "z").
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace(['-', ' '], "_");
        match normalized.as_str() {
            "t_score" | "t" | "tscore" => Ok(Self::TScore),
            "scaled_score" | "scaled" => Ok(Self::ScaledScore),
            "standard_score" | "standard" | "ss" => Ok(Self::StandardScore),
            "z_score" | "z" | "zscore" => Ok(Self::ZScore),
            "percentile" | "percentile_rank" | "pr" => Ok(Self::Percentile),
            "raw_score" | "raw" => Ok(Self::RawScore),
            "base_rate" | "baserate" => Ok(Self::BaseRate),
            _ => Err(CoreError::UnknownScoreType(s.to_string())),
        }
    }
}

/// Respondent type for behavior-rating instruments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Rater {
    #[serde(rename = "self")]
    SelfReport,
    Parent,
    Teacher,
    Observer,
}

impl Rater {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SelfReport => "self",
            Self::Parent => "parent",
            Self::Teacher => "teacher",
            Self::Observer => "observer",
        }
    }
}

impl fmt::Display for Rater {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Rater {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "self" | "self_report" | "self-report" | "srp" => Ok(Self::SelfReport),
            "parent" | "prs" => Ok(Self::Parent),
            "teacher" | "trs" => Ok(Self::Teacher),
            "observer" | "other" => Ok(Self::Observer),
            _ => Err(CoreError::UnknownRater(s.to_string())),
        }
    }
}

/// Descriptive label derived from a percentile rank.
///
/// Boundaries are inclusive on the lower edge of each bucket, so a value
/// sitting exactly on a boundary lands in the more extreme bucket
/// (98 → `ExceptionallyHigh`, 91 → `AboveAverage`, 8 → `BelowAverage`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QualitativeRange {
    ExceptionallyHigh,
    AboveAverage,
    HighAverage,
    Average,
    LowAverage,
    BelowAverage,
    ExceptionallyLow,
}

impl QualitativeRange {
    /// Map a percentile rank to its range. `None` for NaN.
    pub fn from_percentile(percentile: f64) -> Option<Self> {
        if percentile.is_nan() {
            return None;
        }
        let range = if percentile >= 98.0 {
            Self::ExceptionallyHigh
        } else if percentile >= 91.0 {
            Self::AboveAverage
        } else if percentile >= 75.0 {
            Self::HighAverage
        } else if percentile >= 25.0 {
            Self::Average
        } else if percentile >= 9.0 {
            Self::LowAverage
        } else if percentile >= 2.0 {
            Self::BelowAverage
        } else {
            Self::ExceptionallyLow
        };
        Some(range)
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::ExceptionallyHigh => "Exceptionally High",
            Self::AboveAverage => "Above Average",
            Self::HighAverage => "High Average",
            Self::Average => "Average",
            Self::LowAverage => "Low Average",
            Self::BelowAverage => "Below Average",
            Self::ExceptionallyLow => "Exceptionally Low",
        }
    }
}

impl fmt::Display for QualitativeRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Field names a domain rule can require to be present.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreField {
    TestId,
    TestName,
    ScaleName,
    RawScore,
    StandardScore,
    ScoreType,
    Percentile,
    Z,
    Subdomain,
    NarrowCategory,
    QualitativeRange,
    Rater,
}

impl FromStr for ScoreField {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        serde_json::from_value(serde_json::Value::String(s.trim().to_string()))
            .map_err(|_| CoreError::UnknownField(s.to_string()))
    }
}

/// One measured scale within one test administration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreRecord {
    pub test_id: String,
    pub test_name: String,
    pub scale_name: String,
    pub raw_score: Option<f64>,
    /// Meaning depends on `score_type`.
    pub standard_score: Option<f64>,
    pub score_type: Option<ScoreType>,
    pub percentile: Option<f64>,
    pub z: Option<f64>,
    pub domain: String,
    pub subdomain: Option<String>,
    pub narrow_category: Option<String>,
    pub qualitative_range: Option<QualitativeRange>,
    pub rater: Option<Rater>,
    /// Provenance: the export file (and row) this record came from.
    pub source_file: String,
}

impl ScoreRecord {
    /// A record is scoreable when at least one quantitative score is present.
    pub fn is_scoreable(&self) -> bool {
        self.percentile.is_some() || self.standard_score.is_some() || self.z.is_some()
    }

    /// `z` counts as usable only when present and non-zero; a zero `z` in an
    /// export usually means "not computed".
    pub fn has_usable_z(&self) -> bool {
        self.z.is_some_and(|z| z != 0.0 && z.is_finite())
    }

    pub fn has_field(&self, field: ScoreField) -> bool {
        match field {
            ScoreField::TestId => !self.test_id.is_empty(),
            ScoreField::TestName => !self.test_name.is_empty(),
            ScoreField::ScaleName => !self.scale_name.is_empty(),
            ScoreField::RawScore => self.raw_score.is_some(),
            ScoreField::StandardScore => self.standard_score.is_some(),
            ScoreField::ScoreType => self.score_type.is_some(),
            ScoreField::Percentile => self.percentile.is_some(),
            ScoreField::Z => self.z.is_some(),
            ScoreField::Subdomain => self.subdomain.is_some(),
            ScoreField::NarrowCategory => self.narrow_category.is_some(),
            ScoreField::QualitativeRange => self.qualitative_range.is_some(),
            ScoreField::Rater => self.rater.is_some(),
        }
    }
}
