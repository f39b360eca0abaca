use std::time::Duration;

use async_trait::async_trait;
use neuro_core::models::token_count::TokenCount;

use crate::error::BackendError;

/// One prompt addressed to one model.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    pub model_id: String,
    pub system: String,
    pub user: String,
    pub temperature: f32,
    /// Upper bound the backend should apply to its own I/O. The client
    /// enforces the same bound around the whole call.
    pub timeout: Duration,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Completion {
    pub text: String,
    pub tokens: TokenCount,
    pub latency_seconds: f64,
}

/// A text-generation service the client can route prompts to.
#[async_trait]
pub trait InferenceBackend: Send + Sync {
    /// Short name for logs, e.g. `"ollama"`.
    fn name(&self) -> &str;

    /// Whether `model_id` can be invoked right now. Probe failures count as
    /// unavailable.
    async fn is_available(&self, model_id: &str) -> bool;

    async fn complete(&self, request: &CompletionRequest) -> Result<Completion, BackendError>;
}
