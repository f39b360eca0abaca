//! neuro-cli library root.
//!
//! Re-exports the run pipeline and config handling so integration tests
//! can drive a full report run without going through the binary.

pub mod backend;
pub mod config;
pub mod run;
