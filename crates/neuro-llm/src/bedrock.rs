//! Hosted inference through AWS Bedrock.
//!
//! # Model discovery
//!
//! Bedrock has two overlapping registries:
//!
//! - **Foundation models** (`ListFoundationModels`), e.g.
//!   `anthropic.claude-sonnet-4-6`, with a lifecycle status (`ACTIVE` or
//!   `LEGACY`).
//! - **Inference profiles** (`ListInferenceProfiles`), region-scoped
//!   routing wrappers such as `us.anthropic.claude-sonnet-4-6`. The Converse
//!   API only accepts the profile form for on-demand throughput.
//!
//! Availability starts from the `ACTIVE` foundation models (context-window
//! variants like `:200k` skipped) and maps each one to its `us.` profile,
//! constructing `us.{model_id}` when the profile list does not carry it
//! yet. A configured model id matches when it names either the profile or
//! the bare foundation model.
//!
//! # Required IAM permissions
//!
//! ```text
//! bedrock:ListFoundationModels
//! bedrock:ListInferenceProfiles
//! bedrock:InvokeModel
//! ```

use std::collections::HashMap;
use std::time::Instant;

use async_trait::async_trait;
use aws_sdk_bedrock::types::{
    FoundationModelLifecycleStatus, InferenceProfileStatus, InferenceProfileType,
};
use aws_sdk_bedrockruntime::types::{
    ContentBlock, ConversationRole, InferenceConfiguration, Message, SystemContentBlock,
};
use neuro_core::models::token_count::TokenCount;
use serde::{Deserialize, Serialize};
use tokio::sync::OnceCell;
use tracing::{info, warn};

use crate::backend::{Completion, CompletionRequest, InferenceBackend};
use crate::error::BackendError;

/// A chat model that can be invoked through Converse.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatModel {
    /// Inference profile ID, e.g. `us.anthropic.claude-sonnet-4-20250514-v1:0`.
    pub model_id: String,
    pub name: String,
}

pub struct BedrockBackend {
    config: aws_config::SdkConfig,
    models: OnceCell<Vec<ChatModel>>,
}

impl BedrockBackend {
    pub fn new(config: aws_config::SdkConfig) -> Self {
        Self {
            config,
            models: OnceCell::new(),
        }
    }

    /// Load the default credential chain, pinned to `region`.
    pub async fn from_region(region: &str) -> Self {
        let config = aws_config::defaults(aws_config::BehaviorVersion::latest())
            .region(aws_config::Region::new(region.to_string()))
            .load()
            .await;
        Self::new(config)
    }

    /// Active Anthropic chat models in this account and region, sorted by
    /// name.
    pub async fn list_chat_models(&self) -> Result<Vec<ChatModel>, BackendError> {
        let client = aws_sdk_bedrock::Client::new(&self.config);

        let active_models = fetch_active_foundation_models(&client).await?;
        let us_profiles = fetch_us_inference_profiles(&client).await?;

        let mut models: Vec<ChatModel> = active_models
            .into_iter()
            .map(|(model_id, model_name)| match us_profiles.get(&model_id) {
                Some((profile_id, profile_name)) => ChatModel {
                    model_id: profile_id.clone(),
                    name: profile_name.clone(),
                },
                None => ChatModel {
                    model_id: format!("us.{model_id}"),
                    name: model_name,
                },
            })
            .collect();

        models.sort_by(|a, b| a.name.cmp(&b.name));

        info!(count = models.len(), "discovered chat models");

        Ok(models)
    }
}

async fn fetch_active_foundation_models(
    client: &aws_sdk_bedrock::Client,
) -> Result<Vec<(String, String)>, BackendError> {
    let response = client
        .list_foundation_models()
        .by_provider("anthropic")
        .send()
        .await
        .map_err(|e| BackendError::Invocation(e.into_service_error().to_string()))?;

    let models = response
        .model_summaries()
        .iter()
        .filter(|m| {
            let id = m.model_id();
            let is_active = m
                .model_lifecycle()
                .is_some_and(|lc| *lc.status() == FoundationModelLifecycleStatus::Active);
            is_active && id.contains("claude") && !is_context_variant(id)
        })
        .map(|m| {
            let name = m.model_name().unwrap_or(m.model_id()).to_string();
            (m.model_id().to_string(), name)
        })
        .collect();

    Ok(models)
}

/// Map from bare foundation model ID to its `us.` profile (id, name).
async fn fetch_us_inference_profiles(
    client: &aws_sdk_bedrock::Client,
) -> Result<HashMap<String, (String, String)>, BackendError> {
    let response = client
        .list_inference_profiles()
        .type_equals(InferenceProfileType::SystemDefined)
        .max_results(100)
        .send()
        .await
        .map_err(|e| BackendError::Invocation(e.into_service_error().to_string()))?;

    let mut map = HashMap::new();
    for p in response.inference_profile_summaries() {
        let id = p.inference_profile_id();
        if *p.status() != InferenceProfileStatus::Active {
            continue;
        }
        if let Some(bare_id) = id.strip_prefix("us.")
            && bare_id.starts_with("anthropic.claude")
        {
            map.insert(
                bare_id.to_string(),
                (id.to_string(), p.inference_profile_name().to_string()),
            );
        }
    }

    Ok(map)
}

/// `anthropic.claude-x-v1:0:200k` style ids; `:0` is a version, not a
/// context window.
fn is_context_variant(id: &str) -> bool {
    id.rsplit_once(':').is_some_and(|(_, suffix)| {
        suffix.chars().next().is_some_and(|c| c.is_ascii_digit()) && suffix != "0"
    })
}

/// Strip a scope prefix (`us.`, `eu.`, `global.`) from an inference profile
/// ID. Bare foundation model IDs are returned unchanged.
fn strip_scope_prefix(id: &str) -> &str {
    if let Some((prefix, rest)) = id.split_once('.') {
        let is_scope = prefix.len() <= 6 && prefix.chars().all(|c| c.is_ascii_lowercase());
        if is_scope && rest.contains('.') {
            return rest;
        }
    }
    id
}

fn extract_token_usage(usage: &aws_sdk_bedrockruntime::types::TokenUsage) -> TokenCount {
    TokenCount {
        input: usage.input_tokens.max(0) as u64,
        output: usage.output_tokens.max(0) as u64,
    }
}

#[async_trait]
impl InferenceBackend for BedrockBackend {
    fn name(&self) -> &str {
        "bedrock"
    }

    async fn is_available(&self, model_id: &str) -> bool {
        match self.models.get_or_try_init(|| self.list_chat_models()).await {
            Ok(models) => {
                let wanted = strip_scope_prefix(model_id);
                models
                    .iter()
                    .any(|m| m.model_id == model_id || strip_scope_prefix(&m.model_id) == wanted)
            }
            Err(e) => {
                warn!(model_id, error = %e, "model discovery failed");
                false
            }
        }
    }

    async fn complete(&self, request: &CompletionRequest) -> Result<Completion, BackendError> {
        let client = aws_sdk_bedrockruntime::Client::new(&self.config);

        let message = Message::builder()
            .role(ConversationRole::User)
            .content(ContentBlock::Text(request.user.clone()))
            .build()
            .map_err(|e| BackendError::Invocation(e.to_string()))?;

        let started = Instant::now();
        let response = client
            .converse()
            .model_id(&request.model_id)
            .system(SystemContentBlock::Text(request.system.clone()))
            .messages(message)
            .inference_config(
                InferenceConfiguration::builder()
                    .temperature(request.temperature)
                    .build(),
            )
            .send()
            .await
            .map_err(|e| BackendError::Invocation(e.into_service_error().to_string()))?;
        let latency_seconds = started.elapsed().as_secs_f64();

        let output_message = response
            .output()
            .and_then(|o| o.as_message().ok())
            .ok_or_else(|| BackendError::ResponseParse("no message in response".to_string()))?;

        let text = output_message
            .content()
            .iter()
            .filter_map(|block| match block {
                ContentBlock::Text(text) => Some(text.as_str()),
                _ => None,
            })
            .collect::<Vec<_>>()
            .join("");

        let tokens = response
            .usage()
            .map(extract_token_usage)
            .unwrap_or_default();

        Ok(Completion {
            text,
            tokens,
            latency_seconds,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scope_prefix_is_stripped() {
        assert_eq!(
            strip_scope_prefix("us.anthropic.claude-sonnet-4-6"),
            "anthropic.claude-sonnet-4-6"
        );
        assert_eq!(
            strip_scope_prefix("global.anthropic.claude-sonnet-4-6"),
            "anthropic.claude-sonnet-4-6"
        );
        assert_eq!(
            strip_scope_prefix("anthropic.claude-sonnet-4-6"),
            "anthropic.claude-sonnet-4-6"
        );
    }

    #[test]
    fn context_window_variants_are_detected() {
        assert!(is_context_variant("anthropic.claude-3-5-sonnet-20240620-v1:0:200k"));
        assert!(!is_context_variant("anthropic.claude-3-5-sonnet-20240620-v1:0"));
        assert!(!is_context_variant("anthropic.claude-sonnet-4-6"));
    }
}
