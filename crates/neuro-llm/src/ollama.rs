//! Local inference through an Ollama server.
//!
//! Two endpoints are used: `GET /api/tags` lists the installed models (the
//! availability check) and `POST /api/chat` with `stream: false` produces a
//! completion together with prompt/eval token counts.

use std::time::Instant;

use async_trait::async_trait;
use neuro_core::models::token_count::TokenCount;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use tokio::sync::OnceCell;
use tracing::{info, warn};

use crate::backend::{Completion, CompletionRequest, InferenceBackend};
use crate::error::BackendError;

pub const DEFAULT_BASE_URL: &str = "http://localhost:11434";

pub struct OllamaBackend {
    base_url: String,
    client: Client,
    installed: OnceCell<Vec<String>>,
}

#[derive(Debug, Deserialize)]
struct TagsResponse {
    #[serde(default)]
    models: Vec<TagModel>,
}

#[derive(Debug, Deserialize)]
struct TagModel {
    name: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    message: Option<ChatMessage>,
    #[serde(default)]
    prompt_eval_count: u64,
    #[serde(default)]
    eval_count: u64,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    #[serde(default)]
    content: String,
}

impl OllamaBackend {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client: Client::new(),
            installed: OnceCell::new(),
        }
    }

    /// Names of the models installed on the server, e.g. `qwen3:8b`.
    pub async fn list_models(&self) -> Result<Vec<String>, BackendError> {
        let resp = self
            .client
            .get(format!("{}/api/tags", self.base_url))
            .send()
            .await?;

        let status = resp.status();
        let body = resp.text().await?;
        if !status.is_success() {
            return Err(BackendError::Invocation(format!(
                "Ollama /api/tags returned {status}: {body}"
            )));
        }

        let tags: TagsResponse = serde_json::from_str(&body)?;
        let names: Vec<String> = tags.models.into_iter().map(|m| m.name).collect();
        info!(count = names.len(), base_url = %self.base_url, "discovered local models");
        Ok(names)
    }
}

impl Default for OllamaBackend {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}

/// `qwen3` and `qwen3:latest` name the same model.
fn same_model(installed: &str, wanted: &str) -> bool {
    let normalize = |id: &str| {
        if id.contains(':') {
            id.to_string()
        } else {
            format!("{id}:latest")
        }
    };
    normalize(installed) == normalize(wanted)
}

#[async_trait]
impl InferenceBackend for OllamaBackend {
    fn name(&self) -> &str {
        "ollama"
    }

    async fn is_available(&self, model_id: &str) -> bool {
        match self.installed.get_or_try_init(|| self.list_models()).await {
            Ok(models) => models.iter().any(|m| same_model(m, model_id)),
            Err(e) => {
                warn!(model_id, error = %e, "model availability check failed");
                false
            }
        }
    }

    async fn complete(&self, request: &CompletionRequest) -> Result<Completion, BackendError> {
        let body = json!({
            "model": request.model_id,
            "messages": [
                { "role": "system", "content": request.system },
                { "role": "user", "content": request.user },
            ],
            "stream": false,
            "options": { "temperature": request.temperature },
        });

        let started = Instant::now();
        let resp = self
            .client
            .post(format!("{}/api/chat", self.base_url))
            .timeout(request.timeout)
            .json(&body)
            .send()
            .await?;

        let status = resp.status();
        let text = resp.text().await?;
        if !status.is_success() {
            return Err(BackendError::Invocation(format!(
                "Ollama /api/chat returned {status}: {text}"
            )));
        }

        let parsed: ChatResponse = serde_json::from_str(&text)?;
        let message = parsed
            .message
            .ok_or_else(|| BackendError::ResponseParse("no message in response".to_string()))?;

        Ok(Completion {
            text: message.content,
            tokens: TokenCount {
                input: parsed.prompt_eval_count,
                output: parsed.eval_count,
            },
            latency_seconds: started.elapsed().as_secs_f64(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn latest_tag_is_implicit() {
        assert!(same_model("qwen3:latest", "qwen3"));
        assert!(same_model("qwen3:8b", "qwen3:8b"));
        assert!(!same_model("qwen3:8b", "qwen3"));
    }

    #[test]
    fn chat_response_parses_token_counts() {
        let parsed: ChatResponse = serde_json::from_str(
            r#"{"model":"qwen3:8b","message":{"role":"assistant","content":"Hi"},"done":true,"prompt_eval_count":12,"eval_count":3}"#,
        )
        .unwrap();
        assert_eq!(parsed.message.unwrap().content, "Hi");
        assert_eq!(parsed.prompt_eval_count, 12);
        assert_eq!(parsed.eval_count, 3);
    }

    #[test]
    fn base_url_trailing_slash_is_trimmed() {
        let backend = OllamaBackend::new("http://gpu-box:11434/");
        assert_eq!(backend.base_url, "http://gpu-box:11434");
    }
}
