use std::collections::BTreeMap;
use std::path::Path;

use serde_json::Value;

use crate::error::NormalizeError;

/// Values that mean "no value" in score exports.
const MISSING_MARKERS: &[&str] = &["", "na", "n/a", "nan", "null", "-", "--"];

/// One row of a score export: column name → raw value, plus provenance.
///
/// Column names are lower-cased and trimmed on construction so lookups are
/// case-insensitive.
#[derive(Debug, Clone, PartialEq)]
pub struct RawRow {
    /// 1-based position within its source.
    pub position: usize,
    pub source: String,
    fields: BTreeMap<String, Value>,
}

/// A cell that was present but could not be read as a number.
#[derive(Debug, Clone, PartialEq)]
pub struct Unparseable {
    pub column: String,
    pub value: String,
}

impl RawRow {
    pub fn new(
        position: usize,
        source: impl Into<String>,
        fields: impl IntoIterator<Item = (String, Value)>,
    ) -> Self {
        let fields = fields
            .into_iter()
            .map(|(k, v)| (k.trim().to_ascii_lowercase(), v))
            .collect();
        Self {
            position,
            source: source.into(),
            fields,
        }
    }

    /// Build a row from a JSON value. Anything but an object yields an
    /// empty row, which the normalizer then rejects as malformed.
    pub fn from_json(position: usize, source: impl Into<String>, value: Value) -> Self {
        match value {
            Value::Object(map) => Self::new(position, source, map),
            _ => Self::new(position, source, std::iter::empty()),
        }
    }

    /// First non-missing value among the given column aliases.
    fn lookup(&self, columns: &[&str]) -> Option<(&str, &Value)> {
        columns.iter().find_map(|c| {
            self.fields
                .get_key_value(*c)
                .filter(|(_, v)| !is_missing(v))
                .map(|(k, v)| (k.as_str(), v))
        })
    }

    /// Text value of the first present column, trimmed.
    pub fn text(&self, columns: &[&str]) -> Option<String> {
        let (_, value) = self.lookup(columns)?;
        match value {
            Value::String(s) => Some(s.trim().to_string()),
            Value::Number(n) => Some(n.to_string()),
            Value::Bool(b) => Some(b.to_string()),
            _ => None,
        }
    }

    /// Numeric value of the first present column.
    ///
    /// Comparator prefixes (`<1`, `>99`) and a trailing `%` are stripped.
    /// A present but unreadable cell is reported rather than read as zero.
    pub fn number(&self, columns: &[&str]) -> Result<Option<f64>, Unparseable> {
        let Some((column, value)) = self.lookup(columns) else {
            return Ok(None);
        };
        let unparseable = || Unparseable {
            column: column.to_string(),
            value: value.to_string(),
        };
        match value {
            Value::Number(n) => n.as_f64().map(Some).ok_or_else(unparseable),
            Value::String(s) => {
                let cleaned = s
                    .trim()
                    .trim_start_matches(['<', '>', '≤', '≥', '='])
                    .trim_end_matches('%')
                    .trim();
                cleaned
                    .parse::<f64>()
                    .ok()
                    .filter(|v| v.is_finite())
                    .map(Some)
                    .ok_or_else(unparseable)
            }
            _ => Err(unparseable()),
        }
    }
}

fn is_missing(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => {
            let t = s.trim().to_ascii_lowercase();
            MISSING_MARKERS.contains(&t.as_str())
        }
        _ => false,
    }
}

/// Read a score export converted to JSON.
///
/// `.jsonl` / `.ndjson` files hold one row object per line; anything else
/// must be a JSON array of row objects.
pub fn read_rows(path: &Path) -> Result<Vec<RawRow>, NormalizeError> {
    let contents = std::fs::read_to_string(path).map_err(|source| NormalizeError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let source = path.display().to_string();

    let is_lines = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("jsonl") || e.eq_ignore_ascii_case("ndjson"));

    if is_lines {
        let mut rows = Vec::new();
        for (idx, line) in contents.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            let value: Value =
                serde_json::from_str(line).map_err(|source| NormalizeError::Parse {
                    path: path.to_path_buf(),
                    source,
                })?;
            rows.push(RawRow::from_json(idx + 1, source.clone(), value));
        }
        return Ok(rows);
    }

    let value: Value = serde_json::from_str(&contents).map_err(|e| NormalizeError::Parse {
        path: path.to_path_buf(),
        source: e,
    })?;
    let Value::Array(items) = value else {
        return Err(NormalizeError::UnexpectedShape {
            path: path.to_path_buf(),
            message: "expected a JSON array of row objects".to_string(),
        });
    };

    Ok(items
        .into_iter()
        .enumerate()
        .map(|(idx, item)| RawRow::from_json(idx + 1, source.clone(), item))
        .collect())
}
