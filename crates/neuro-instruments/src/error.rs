use thiserror::Error;

use crate::scoring::RangeWarning;

#[derive(Debug, Error)]
pub enum InstrumentError {
    #[error("unknown instrument: {0}")]
    UnknownInstrument(String),

    #[error("score out of range: {0}")]
    Range(#[from] RangeWarning),

    #[error("unknown scale '{scale}' for instrument '{instrument_id}'")]
    UnknownScale {
        instrument_id: String,
        scale: String,
    },
}
