//! neuro-llm
//!
//! Narrative generation for validated domains: prompt assembly, the tiered
//! retry/fallback client, output quality checks, inference backends and the
//! usage ledger.

pub mod backend;
pub mod bedrock;
pub mod catalogue;
pub mod client;
pub mod error;
pub mod fallback;
pub mod ledger;
pub mod ollama;
pub mod prompt;
pub mod quality;

pub use backend::{Completion, CompletionRequest, InferenceBackend};
pub use catalogue::{ModelCatalogue, ModelTiers};
pub use client::{ClientConfig, GenerationClient, GenerationResult};
pub use error::{AttemptFailure, BackendError, FailureReason, GenerationError, LedgerError};
pub use ledger::UsageLedger;
pub use prompt::{DomainNarrative, NarrativeRequestBuilder};
pub use quality::QualityReport;
