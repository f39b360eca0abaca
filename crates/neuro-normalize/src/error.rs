use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum NormalizeError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("unexpected input shape in {path}: {message}")]
    UnexpectedShape { path: PathBuf, message: String },
}

/// A raw row that could not become a `ScoreRecord`. Collected into the
/// batch report; never aborts the batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
#[error("row {position} of {source_file}: {message}")]
pub struct MalformedRowError {
    pub position: usize,
    pub source_file: String,
    pub message: String,
}
