use thiserror::Error;

#[derive(Debug, Error)]
pub enum DomainError {
    #[error("unknown domain key: {0}")]
    UnknownDomainKey(String),

    #[error("unknown patient type: {0}")]
    UnknownPatientType(String),
}
