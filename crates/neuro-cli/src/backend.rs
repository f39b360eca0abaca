use std::sync::Arc;

use neuro_llm::InferenceBackend;
use neuro_llm::bedrock::BedrockBackend;
use neuro_llm::ollama::OllamaBackend;

use crate::config::BackendConfig;

/// Build the inference backend named in the config.
pub async fn build_backend(config: &BackendConfig) -> Arc<dyn InferenceBackend> {
    match config {
        BackendConfig::Ollama { base_url } => {
            tracing::info!(%base_url, "using Ollama backend");
            Arc::new(OllamaBackend::new(base_url.clone()))
        }
        BackendConfig::Bedrock { region } => {
            tracing::info!(%region, "using Bedrock backend");
            Arc::new(BedrockBackend::from_region(region).await)
        }
    }
}
