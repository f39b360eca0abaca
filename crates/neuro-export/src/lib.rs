//! neuro-export
//!
//! Hands generated narratives to the document renderer: one text file per
//! report domain, a placeholder for domains that still need a clinician's
//! narrative, and a JSON manifest of the run.

pub mod error;
pub mod manifest;
pub mod render;
pub mod writer;

pub use manifest::{DomainEntry, NarrativeStatus, RunManifest};
pub use writer::NarrativeWriter;
