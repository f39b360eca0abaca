use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("unknown score type: {0}")]
    UnknownScoreType(String),

    #[error("unknown rater: {0}")]
    UnknownRater(String),

    #[error("unknown score field: {0}")]
    UnknownField(String),

    #[error("unknown section kind: {0}")]
    UnknownSectionKind(String),
}
