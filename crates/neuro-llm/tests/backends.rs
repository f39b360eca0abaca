//! Live backend checks.
//!
//! These call a real Ollama server or real AWS APIs and are ignored by
//! default. Run with:
//!
//! `cargo test -p neuro-llm --test backends -- --ignored --nocapture`
//!
//! The Bedrock test needs credentials in the environment; the Ollama test
//! needs a server on `OLLAMA_HOST` (default `http://localhost:11434`).

use std::time::Duration;

use neuro_llm::bedrock::BedrockBackend;
use neuro_llm::ollama::{DEFAULT_BASE_URL, OllamaBackend};
use neuro_llm::{CompletionRequest, InferenceBackend};

#[tokio::test]
#[ignore]
async fn ollama_lists_and_completes() {
    let base_url = std::env::var("OLLAMA_HOST").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());
    let backend = OllamaBackend::new(base_url);

    let models = backend.list_models().await.unwrap();
    println!("installed: {models:?}");
    let Some(model_id) = models.first().cloned() else {
        println!("no models installed; skipping completion");
        return;
    };
    assert!(backend.is_available(&model_id).await);

    let completion = backend
        .complete(&CompletionRequest {
            model_id,
            system: "Answer in one short sentence.".to_string(),
            user: "What does a percentile rank of 50 mean?".to_string(),
            temperature: 0.0,
            timeout: Duration::from_secs(120),
        })
        .await
        .unwrap();
    println!("{completion:?}");
    assert!(!completion.text.is_empty());
}

#[tokio::test]
#[ignore]
async fn bedrock_discovers_claude_models() {
    let backend = BedrockBackend::from_region("us-east-1").await;
    let models = backend.list_chat_models().await.unwrap();

    println!("Discovered {} models:", models.len());
    for m in &models {
        println!("  {} ({})", m.model_id, m.name);
    }

    assert!(!models.is_empty(), "expected at least one Claude model");
    for m in &models {
        assert!(m.model_id.starts_with("us."), "{} is not a US profile", m.model_id);
        assert!(backend.is_available(&m.model_id).await);
    }
}
