//! The generation client: availability probing, tiered retry/fallback,
//! output validation and usage logging for each request.

use std::sync::Arc;
use std::time::{Duration, Instant};

use futures::StreamExt;
use neuro_core::models::generation::GenerationRequest;
use neuro_core::models::token_count::TokenCount;
use neuro_core::models::usage::{GenerationAttemptRecord, Tier};
use serde::Serialize;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::backend::{CompletionRequest, InferenceBackend};
use crate::catalogue::ModelCatalogue;
use crate::error::{AttemptFailure, FailureReason, GenerationError};
use crate::fallback::{AttemptOutcome, AttemptState, FallbackPlan, Step};
use crate::ledger::UsageLedger;
use crate::quality::{self, QualityReport};

pub const DEFAULT_MAX_RETRIES: u32 = 2;
pub const DEFAULT_ATTEMPT_TIMEOUT: Duration = Duration::from_secs(120);

#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    /// Attempts per model before moving to the next one.
    pub max_retries: u32,
    pub attempt_timeout: Duration,
    /// Run the quality check on every response, not only on requests that
    /// ask for strict validation.
    pub validate_all: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            max_retries: DEFAULT_MAX_RETRIES,
            attempt_timeout: DEFAULT_ATTEMPT_TIMEOUT,
            validate_all: false,
        }
    }
}

/// The first attempt that passed transport and validation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GenerationResult {
    pub request_id: Uuid,
    pub domain_key: String,
    pub text: String,
    pub model_id: String,
    pub tier: Tier,
    /// Attempt number against `model_id`.
    pub attempt: u32,
    /// Attempts made for this request across all models.
    pub total_attempts: u32,
    pub tokens: TokenCount,
    pub latency_seconds: f64,
    /// Present when the output was validated.
    pub quality: Option<QualityReport>,
}

pub struct GenerationClient {
    backend: Arc<dyn InferenceBackend>,
    config: ClientConfig,
}

impl GenerationClient {
    pub fn new(backend: Arc<dyn InferenceBackend>, config: ClientConfig) -> Self {
        Self { backend, config }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Generate text for `request`.
    ///
    /// Candidate models are narrowed to those the backend reports available,
    /// then tried primary tier first, each up to `max_retries` times. A
    /// transport error, a timeout and rejected output are all failed
    /// attempts. Every attempt is appended to `ledger` before the next one
    /// starts.
    pub async fn generate(
        &self,
        request: &GenerationRequest,
        catalogue: &ModelCatalogue,
        ledger: &UsageLedger,
    ) -> Result<GenerationResult, GenerationError> {
        let request_id = Uuid::new_v4();
        let tiers = catalogue.tiers(request.section_kind);
        let mut failures = Vec::new();

        let primary = self.available(tiers.primary, Tier::Primary, &mut failures).await;
        let fallback = self.available(tiers.fallback, Tier::Fallback, &mut failures).await;
        let plan = FallbackPlan::new(primary, fallback, self.config.max_retries);

        info!(
            domain_key = %request.domain_key,
            section_kind = %request.section_kind,
            %request_id,
            budget = plan.attempt_budget(),
            "starting generation"
        );

        let mut state = plan.start();
        let mut total_attempts = 0u32;
        let mut succeeded = None;
        while let Some(step) = plan.step(&state) {
            total_attempts += 1;
            let outcome = match self.attempt(request, request_id, step, ledger).await {
                Ok(result) => {
                    succeeded = Some(result);
                    AttemptOutcome::Success
                }
                Err(reason) => {
                    failures.push(AttemptFailure {
                        model_id: step.model_id.to_string(),
                        tier: step.tier,
                        attempt: step.attempt,
                        reason,
                    });
                    AttemptOutcome::Failure
                }
            };
            state = plan.advance(&state, outcome);
        }

        match (state, succeeded) {
            (AttemptState::Succeeded { .. }, Some(mut result)) => {
                result.total_attempts = total_attempts;
                Ok(result)
            }
            _ => {
                error!(
                    domain_key = %request.domain_key,
                    attempts = total_attempts,
                    "all models exhausted"
                );
                Err(GenerationError::AllModelsExhausted {
                    domain_key: request.domain_key.clone(),
                    failures,
                })
            }
        }
    }

    /// Run independent requests concurrently, at most `concurrency` at a
    /// time. Outcomes arrive in completion order, keyed by domain key; one
    /// request's exhaustion does not affect the others.
    pub async fn generate_batch(
        &self,
        requests: Vec<GenerationRequest>,
        catalogue: &ModelCatalogue,
        ledger: &UsageLedger,
        concurrency: usize,
    ) -> Vec<(String, Result<GenerationResult, GenerationError>)> {
        futures::stream::iter(requests)
            .map(|request| async move {
                let outcome = self.generate(&request, catalogue, ledger).await;
                (request.domain_key, outcome)
            })
            .buffer_unordered(concurrency.max(1))
            .collect()
            .await
    }

    async fn available(
        &self,
        models: Vec<String>,
        tier: Tier,
        failures: &mut Vec<AttemptFailure>,
    ) -> Vec<String> {
        let mut available = Vec::with_capacity(models.len());
        for model_id in models {
            if self.backend.is_available(&model_id).await {
                available.push(model_id);
            } else {
                warn!(model_id = %model_id, %tier, backend = self.backend.name(), "model unavailable, skipping");
                failures.push(AttemptFailure {
                    model_id,
                    tier,
                    attempt: 0,
                    reason: FailureReason::Unavailable,
                });
            }
        }
        available
    }

    fn should_validate(&self, request: &GenerationRequest) -> bool {
        request.requires_strict_validation || self.config.validate_all
    }

    async fn attempt(
        &self,
        request: &GenerationRequest,
        request_id: Uuid,
        step: Step<'_>,
        ledger: &UsageLedger,
    ) -> Result<GenerationResult, FailureReason> {
        let completion_request = CompletionRequest {
            model_id: step.model_id.to_string(),
            system: request.prompt_system.clone(),
            user: request.prompt_user.clone(),
            temperature: request.temperature,
            timeout: self.config.attempt_timeout,
        };

        let started = Instant::now();
        let response = tokio::time::timeout(
            self.config.attempt_timeout,
            self.backend.complete(&completion_request),
        )
        .await;
        let elapsed = started.elapsed().as_secs_f64();

        let (outcome, tokens, latency_seconds) = match response {
            Err(_) => (
                Err(FailureReason::Timeout {
                    seconds: self.config.attempt_timeout.as_secs_f64(),
                }),
                TokenCount::default(),
                elapsed,
            ),
            Ok(Err(e)) => (
                Err(FailureReason::Transport {
                    message: e.to_string(),
                }),
                TokenCount::default(),
                elapsed,
            ),
            Ok(Ok(completion)) => {
                let quality = self
                    .should_validate(request)
                    .then(|| quality::assess(&completion.text, request));
                let rejected = quality.as_ref().filter(|report| !report.is_valid).map(|report| {
                    FailureReason::ValidationRejected {
                        quality_score: report.quality_score,
                        issues: report.issues.clone(),
                    }
                });
                let outcome = match rejected {
                    Some(reason) => Err(reason),
                    None => Ok(GenerationResult {
                        request_id,
                        domain_key: request.domain_key.clone(),
                        text: completion.text,
                        model_id: step.model_id.to_string(),
                        tier: step.tier,
                        attempt: step.attempt,
                        total_attempts: 0,
                        tokens: completion.tokens,
                        latency_seconds: completion.latency_seconds,
                        quality,
                    }),
                };
                (outcome, completion.tokens, completion.latency_seconds)
            }
        };

        ledger.append(GenerationAttemptRecord {
            timestamp: jiff::Timestamp::now(),
            request_id,
            section_kind: request.section_kind,
            model_id: step.model_id.to_string(),
            tier: step.tier,
            attempt: step.attempt,
            input_tokens: tokens.input,
            output_tokens: tokens.output,
            latency_seconds,
            success: outcome.is_ok(),
            domain_key: request.domain_key.clone(),
            failure: outcome.as_ref().err().map(ToString::to_string),
        });

        match &outcome {
            Ok(_) => info!(
                domain_key = %request.domain_key,
                model_id = step.model_id,
                tier = %step.tier,
                attempt = step.attempt,
                latency_seconds,
                "generation attempt succeeded"
            ),
            Err(reason) => warn!(
                domain_key = %request.domain_key,
                model_id = step.model_id,
                tier = %step.tier,
                attempt = step.attempt,
                latency_seconds,
                reason = %reason,
                "generation attempt failed"
            ),
        }

        outcome
    }
}
