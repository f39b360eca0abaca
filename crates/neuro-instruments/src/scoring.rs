//! Normative score math: metric norms, plausible ranges, and conversions
//! between percentiles, z-scores and standard scores.

use neuro_core::models::score::{QualitativeRange, ScoreType};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Percentiles are clamped into this band before inversion so that 0 and
/// 100 map to a finite z.
pub const PERCENTILE_FLOOR: f64 = 0.1;
pub const PERCENTILE_CEILING: f64 = 99.9;

/// Mean and standard deviation of a normed metric.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Norms {
    pub mean: f64,
    pub sd: f64,
}

impl Norms {
    pub fn to_z(&self, score: f64) -> f64 {
        (score - self.mean) / self.sd
    }
}

/// Normative mean/SD for metrics that have one. Raw scores, base rates and
/// percentiles are not on an interval scale and return `None`.
pub fn norms(score_type: ScoreType) -> Option<Norms> {
    match score_type {
        ScoreType::TScore => Some(Norms { mean: 50.0, sd: 10.0 }),
        ScoreType::ScaledScore => Some(Norms { mean: 10.0, sd: 3.0 }),
        ScoreType::StandardScore => Some(Norms { mean: 100.0, sd: 15.0 }),
        ScoreType::ZScore => Some(Norms { mean: 0.0, sd: 1.0 }),
        ScoreType::Percentile | ScoreType::RawScore | ScoreType::BaseRate => None,
    }
}

/// Defines the valid range for a score.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreRange {
    pub min: f64,
    pub max: f64,
}

impl ScoreRange {
    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }
}

/// Range a score of the given metric can plausibly take.
pub fn plausible_range(score_type: ScoreType) -> Option<ScoreRange> {
    match score_type {
        ScoreType::TScore => Some(ScoreRange { min: 10.0, max: 120.0 }),
        ScoreType::ScaledScore => Some(ScoreRange { min: 1.0, max: 19.0 }),
        ScoreType::StandardScore => Some(ScoreRange { min: 40.0, max: 160.0 }),
        ScoreType::ZScore => Some(ScoreRange { min: -5.0, max: 5.0 }),
        ScoreType::Percentile | ScoreType::BaseRate => Some(ScoreRange { min: 0.0, max: 100.0 }),
        ScoreType::RawScore => None,
    }
}

/// A score that fell outside its metric's plausible range. The record is
/// kept; the warning is surfaced in the batch report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Error)]
#[error("{message}")]
pub struct RangeWarning {
    pub test_id: String,
    pub scale_name: String,
    pub value: f64,
    pub score_type: ScoreType,
    pub expected_range: ScoreRange,
    pub message: String,
}

/// Standard normal cumulative distribution function.
///
/// Uses the Chebyshev-fitted complementary error function, fractional
/// error below 1.2e-7 everywhere.
pub fn normal_cdf(x: f64) -> f64 {
    0.5 * erfc(-x / std::f64::consts::SQRT_2)
}

fn erfc(x: f64) -> f64 {
    let z = x.abs();
    let t = 1.0 / (1.0 + 0.5 * z);
    let ans = t
        * (-z * z - 1.265_512_23
            + t * (1.000_023_68
                + t * (0.374_091_96
                    + t * (0.096_784_18
                        + t * (-0.186_288_06
                            + t * (0.278_868_07
                                + t * (-1.135_203_98
                                    + t * (1.488_515_87
                                        + t * (-0.822_152_23 + t * 0.170_872_77)))))))))
            .exp();
    if x >= 0.0 { ans } else { 2.0 - ans }
}

/// Inverse of the standard normal CDF (the probit function).
///
/// Rational approximation with relative error below 1.2e-9 on (0, 1).
/// Returns ±infinity at the endpoints and NaN outside [0, 1].
pub fn inverse_normal_cdf(p: f64) -> f64 {
    const A: [f64; 6] = [
        -3.969_683_028_665_376e1,
        2.209_460_984_245_205e2,
        -2.759_285_104_469_687e2,
        1.383_577_518_672_69e2,
        -3.066_479_806_614_716e1,
        2.506_628_277_459_239,
    ];
    const B: [f64; 5] = [
        -5.447_609_879_822_406e1,
        1.615_858_368_580_409e2,
        -1.556_989_798_598_866e2,
        6.680_131_188_771_972e1,
        -1.328_068_155_288_572e1,
    ];
    const C: [f64; 6] = [
        -7.784_894_002_430_293e-3,
        -3.223_964_580_411_365e-1,
        -2.400_758_277_161_838,
        -2.549_732_539_343_734,
        4.374_664_141_464_968,
        2.938_163_982_698_783,
    ];
    const D: [f64; 4] = [
        7.784_695_709_041_462e-3,
        3.224_671_290_700_398e-1,
        2.445_134_137_142_996,
        3.754_408_661_907_416,
    ];
    const P_LOW: f64 = 0.02425;

    if p.is_nan() || !(0.0..=1.0).contains(&p) {
        return f64::NAN;
    }
    if p == 0.0 {
        return f64::NEG_INFINITY;
    }
    if p == 1.0 {
        return f64::INFINITY;
    }

    let tail = |q: f64| {
        (((((C[0] * q + C[1]) * q + C[2]) * q + C[3]) * q + C[4]) * q + C[5])
            / ((((D[0] * q + D[1]) * q + D[2]) * q + D[3]) * q + 1.0)
    };

    if p < P_LOW {
        tail((-2.0 * p.ln()).sqrt())
    } else if p <= 1.0 - P_LOW {
        let q = p - 0.5;
        let r = q * q;
        (((((A[0] * r + A[1]) * r + A[2]) * r + A[3]) * r + A[4]) * r + A[5]) * q
            / (((((B[0] * r + B[1]) * r + B[2]) * r + B[3]) * r + B[4]) * r + 1.0)
    } else {
        -tail((-2.0 * (1.0 - p).ln()).sqrt())
    }
}

/// z-score for a percentile rank on the 0–100 scale.
pub fn z_from_percentile(percentile: f64) -> f64 {
    let clamped = percentile.clamp(PERCENTILE_FLOOR, PERCENTILE_CEILING);
    inverse_normal_cdf(clamped / 100.0)
}

/// Percentile rank (0–100) for a z-score.
pub fn percentile_from_z(z: f64) -> f64 {
    100.0 * normal_cdf(z)
}

/// z-score for a standard score, when its metric is normed.
pub fn z_from_standard(score: f64, score_type: ScoreType) -> Option<f64> {
    norms(score_type).map(|n| n.to_z(score))
}

/// Percentile-to-label table, see [`QualitativeRange::from_percentile`].
pub fn qualitative_range(percentile: f64) -> Option<QualitativeRange> {
    QualitativeRange::from_percentile(percentile)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn median_maps_to_zero() {
        assert_eq!(inverse_normal_cdf(0.5), 0.0);
        assert!((normal_cdf(0.0) - 0.5).abs() < 1e-7);
    }

    #[test]
    fn known_quantiles() {
        assert!((inverse_normal_cdf(0.975) - 1.959_964).abs() < 1e-5);
        assert!((inverse_normal_cdf(0.025) + 1.959_964).abs() < 1e-5);
        assert!((inverse_normal_cdf(0.841_344_746) - 1.0).abs() < 1e-5);
        assert!((inverse_normal_cdf(0.001) + 3.090_232).abs() < 1e-5);
    }

    #[test]
    fn percentile_round_trips_through_z() {
        for p in [1.0, 5.0, 16.0, 37.0, 50.0, 63.0, 84.0, 95.0, 99.0] {
            let back = percentile_from_z(z_from_percentile(p));
            assert!((back - p).abs() < 1e-3, "percentile {p} came back as {back}");
        }
    }

    #[test]
    fn extreme_percentiles_stay_finite() {
        assert!(z_from_percentile(0.0).is_finite());
        assert!(z_from_percentile(100.0).is_finite());
        assert!(z_from_percentile(0.0) < -3.0);
    }

    #[test]
    fn out_of_domain_probability_is_nan() {
        assert!(inverse_normal_cdf(1.5).is_nan());
        assert!(inverse_normal_cdf(-0.1).is_nan());
    }

    #[test]
    fn standard_scores_convert_through_norms() {
        assert_eq!(z_from_standard(115.0, ScoreType::StandardScore), Some(1.0));
        assert_eq!(z_from_standard(40.0, ScoreType::TScore), Some(-1.0));
        assert_eq!(z_from_standard(7.0, ScoreType::ScaledScore), Some(-1.0));
        assert_eq!(z_from_standard(12.0, ScoreType::RawScore), None);
    }

    #[test]
    fn plausible_ranges_bound_metrics() {
        let scaled = plausible_range(ScoreType::ScaledScore).unwrap();
        assert!(scaled.contains(19.0));
        assert!(!scaled.contains(20.0));
        assert!(plausible_range(ScoreType::RawScore).is_none());
    }
}
