use neuro_core::models::score::{QualitativeRange, Rater, ScoreRecord, ScoreType};
use neuro_core::models::stats::DomainGroupStats;
use neuro_instruments::scoring;
use neuro_instruments::{Instrument, get_instrument};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::MalformedRowError;
use crate::raw::RawRow;
use crate::stats::group_statistics;

const TEST_ID_COLUMNS: &[&str] = &["test_id", "test"];
const TEST_NAME_COLUMNS: &[&str] = &["test_name"];
const SCALE_COLUMNS: &[&str] = &["scale_name", "scale"];
const RAW_SCORE_COLUMNS: &[&str] = &["raw_score", "raw"];
const STANDARD_SCORE_COLUMNS: &[&str] = &["standard_score", "score"];
const SCORE_TYPE_COLUMNS: &[&str] = &["score_type"];
const PERCENTILE_COLUMNS: &[&str] = &["percentile", "pct"];
const Z_COLUMNS: &[&str] = &["z", "z_score"];
const DOMAIN_COLUMNS: &[&str] = &["domain"];
const SUBDOMAIN_COLUMNS: &[&str] = &["subdomain"];
const NARROW_COLUMNS: &[&str] = &["narrow_category", "narrow"];
const RATER_COLUMNS: &[&str] = &["rater", "respondent"];
const SOURCE_COLUMNS: &[&str] = &["source_file", "filename"];

/// Domain assigned when a row names a test the catalogue does not know and
/// carries no domain of its own.
pub const UNCLASSIFIED_DOMAIN: &str = "Unclassified";

/// A non-fatal problem noticed while mapping a row. The row is still kept.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RowWarning {
    pub position: usize,
    pub source_file: String,
    pub message: String,
}

/// What happened to each row of a batch.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BatchReport {
    pub total_rows: usize,
    pub accepted_rows: usize,
    pub skipped: Vec<MalformedRowError>,
    pub warnings: Vec<RowWarning>,
}

impl BatchReport {
    pub fn skipped_positions(&self) -> Vec<usize> {
        self.skipped.iter().map(|e| e.position).collect()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NormalizeOutput {
    pub records: Vec<ScoreRecord>,
    pub group_stats: Vec<DomainGroupStats>,
    pub report: BatchReport,
}

/// Normalize a batch of raw rows.
///
/// One bad row never aborts the batch: rows lacking both a test id and a
/// domain are recorded in the report and skipped.
pub fn normalize(rows: &[RawRow]) -> NormalizeOutput {
    let mut report = BatchReport {
        total_rows: rows.len(),
        ..BatchReport::default()
    };
    let mut records = Vec::with_capacity(rows.len());

    for row in rows {
        match map_row(row, &mut report.warnings) {
            Ok(record) => records.push(record),
            Err(err) => {
                warn!(position = err.position, source_file = %err.source_file, "skipping malformed row: {}", err.message);
                report.skipped.push(err);
            }
        }
    }
    report.accepted_rows = records.len();

    let group_stats = group_statistics(&records);

    info!(
        total = report.total_rows,
        accepted = report.accepted_rows,
        skipped = report.skipped.len(),
        warnings = report.warnings.len(),
        groups = group_stats.len(),
        "normalized score batch"
    );

    NormalizeOutput {
        records,
        group_stats,
        report,
    }
}

/// Re-run the derivation step over already normalized records and rebuild
/// the group statistics. Derived values already present are left as they
/// are, so this is idempotent.
pub fn renormalize(mut records: Vec<ScoreRecord>) -> (Vec<ScoreRecord>, Vec<DomainGroupStats>) {
    for record in &mut records {
        derive_statistics(record);
    }
    let stats = group_statistics(&records);
    (records, stats)
}

/// Fill in the deferred statistics of a record.
///
/// - A score reported as a percentile rank fills an absent percentile.
/// - With a percentile and no usable z, z is the inverse normal CDF of
///   `percentile / 100`.
/// - Without a percentile, z comes from a normed standard score, and the
///   percentile is then read back off the normal curve.
/// - The qualitative range follows from the percentile.
///
/// A non-zero z that is already present is never overwritten.
pub fn derive_statistics(record: &mut ScoreRecord) {
    if record.percentile.is_none()
        && record.score_type == Some(ScoreType::Percentile)
        && let Some(score) = record.standard_score.filter(|s| (0.0..=100.0).contains(s))
    {
        record.percentile = Some(score);
    }

    if !record.has_usable_z() {
        if let Some(p) = record.percentile {
            record.z = Some(scoring::z_from_percentile(p));
        } else if let (Some(score), Some(score_type)) = (record.standard_score, record.score_type)
            && let Some(z) = scoring::z_from_standard(score, score_type)
        {
            record.z = Some(z);
        }
    }

    if record.percentile.is_none()
        && let Some(z) = record.z.filter(|z| z.is_finite())
        && (record.has_usable_z() || record.standard_score.is_some())
    {
        record.percentile = Some(scoring::percentile_from_z(z));
    }

    if record.qualitative_range.is_none() {
        record.qualitative_range = record.percentile.and_then(QualitativeRange::from_percentile);
    }
}

fn map_row(row: &RawRow, warnings: &mut Vec<RowWarning>) -> Result<ScoreRecord, MalformedRowError> {
    let source_file = row
        .text(SOURCE_COLUMNS)
        .unwrap_or_else(|| row.source.clone());
    let mut warn_row = |message: String| {
        warnings.push(RowWarning {
            position: row.position,
            source_file: source_file.clone(),
            message,
        })
    };

    let test_id = row.text(TEST_ID_COLUMNS);
    let given_domain = row.text(DOMAIN_COLUMNS);
    if test_id.is_none() && given_domain.is_none() {
        return Err(MalformedRowError {
            position: row.position,
            source_file: source_file.clone(),
            message: "row has neither a test id nor a domain".to_string(),
        });
    }

    let instrument = test_id.as_deref().and_then(get_instrument);
    let test_id = test_id
        .map(|id| id.to_ascii_lowercase())
        .unwrap_or_else(|| test_id_from_source(&source_file));

    let test_name = row
        .text(TEST_NAME_COLUMNS)
        .or_else(|| instrument.as_ref().map(|i| i.name().to_string()))
        .unwrap_or_else(|| test_id.clone());
    let scale_name = row
        .text(SCALE_COLUMNS)
        .unwrap_or_else(|| test_name.clone());

    let mut read_number = |columns: &[&str]| match row.number(columns) {
        Ok(v) => v,
        Err(bad) => {
            warn_row(format!("column '{}' is not numeric: {}", bad.column, bad.value));
            None
        }
    };
    let raw_score = read_number(RAW_SCORE_COLUMNS);
    let standard_score = read_number(STANDARD_SCORE_COLUMNS);
    let z = read_number(Z_COLUMNS);
    let percentile = read_number(PERCENTILE_COLUMNS);
    let percentile = percentile.filter(|p| {
        let in_bounds = (0.0..=100.0).contains(p);
        if !in_bounds {
            warn_row(format!("percentile {p} is outside 0–100 and was dropped"));
        }
        in_bounds
    });

    let score_type = match row.text(SCORE_TYPE_COLUMNS) {
        Some(text) => match text.parse::<ScoreType>() {
            Ok(t) => Some(t),
            Err(e) => {
                warn_row(e.to_string());
                instrument.as_ref().map(|i| i.score_type_for(&scale_name))
            }
        },
        None => instrument.as_ref().map(|i| i.score_type_for(&scale_name)),
    };

    let rater = row.text(RATER_COLUMNS).and_then(|text| match text.parse::<Rater>() {
        Ok(r) => Some(r),
        Err(e) => {
            warn_row(e.to_string());
            None
        }
    });

    let domain = given_domain
        .or_else(|| instrument.as_ref().map(|i| i.domain_for(&scale_name).to_string()))
        .unwrap_or_else(|| UNCLASSIFIED_DOMAIN.to_string());
    let subdomain = row.text(SUBDOMAIN_COLUMNS).or_else(|| {
        instrument
            .as_ref()
            .and_then(|i| i.scale(&scale_name))
            .filter(|s| s.domain == domain)
            .and_then(|s| s.subdomain.clone())
    });

    let mut record = ScoreRecord {
        test_id,
        test_name,
        scale_name,
        raw_score,
        standard_score,
        score_type,
        percentile,
        z,
        domain,
        subdomain,
        narrow_category: row.text(NARROW_COLUMNS),
        qualitative_range: None,
        rater,
        source_file: source_file.clone(),
    };

    if let Some(range_warning) = instrument.as_ref().and_then(|i| i.check_range(&record)) {
        warn_row(range_warning.message);
    }

    derive_statistics(&mut record);

    if !record.is_scoreable() {
        debug!(position = row.position, scale = %record.scale_name, "row has no quantitative score");
    }

    Ok(record)
}

/// Fallback test id for rows that only carry a domain: the export file's
/// stem, e.g. `data/wiat4.csv` → `wiat4`.
fn test_id_from_source(source_file: &str) -> String {
    std::path::Path::new(source_file)
        .file_stem()
        .and_then(|s| s.to_str())
        .map(|s| s.to_ascii_lowercase())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| "unknown".to_string())
}
