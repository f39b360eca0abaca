//! neuro-core
//!
//! Pure domain types for the neuropsychological report pipeline.
//! No I/O and no backend dependency; the normalizer, validator, generation
//! client and exporter all speak these types.

pub mod error;
pub mod models;
