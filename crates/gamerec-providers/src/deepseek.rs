//! DeepSeek provider — the live backend, talking to an OpenAI-compatible
//! `/chat/completions` endpoint via `reqwest`.
//!
//! Every operation runs the same envelope: credentials check → circuit
//! breaker admission → retry with backoff → response extraction. Any
//! unrecoverable failure collapses into the fallback catalogue (for
//! recommendations) or a fixed apology (for chat); raw provider errors
//! never escape.

use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use tracing::{debug, error, warn};

use gamerec_core::config::ProviderConfig;
use gamerec_core::types::{
    ChatCompletionRequest, ChatCompletionResponse, ChatMessage, FallbackReason, LibraryRequest,
    RecommendationRequest, RecommendationResult,
};
use gamerec_core::ProviderError;

use crate::breaker::{BreakerStatus, CircuitBreaker};
use crate::extract::{fallback_recommendations, ExtractionSource, ResponseExtractor};
use crate::prompt;
use crate::retry::RetryExecutor;
use crate::traits::AiProvider;

/// Default API base; override via `DEEPSEEK_API_BASE` for proxies and tests.
pub const DEFAULT_API_BASE: &str = "https://api.deepseek.com/v1";

const MODEL: &str = "deepseek-chat";
const MAX_TOKENS: u32 = 1000;
const TEMPERATURE: f64 = 0.7;

const NO_CREDENTIALS_REPLY: &str =
    "Sorry, DeepSeek API key is not configured. Please set DEEPSEEK_API_KEY environment variable.";
const UNAVAILABLE_REPLY: &str =
    "Sorry, the AI service is temporarily unavailable. Please try again later.";
const NO_ANSWER_REPLY: &str = "Sorry, I couldn't generate a proper response. Please try again.";

/// Live provider backed by the DeepSeek chat-completion API.
pub struct DeepSeekProvider {
    client: reqwest::Client,
    api_key: Option<String>,
    api_base: String,
    breaker: Mutex<CircuitBreaker>,
    retry: RetryExecutor,
    extractor: ResponseExtractor,
}

impl std::fmt::Debug for DeepSeekProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeepSeekProvider")
            .field("api_base", &self.api_base)
            .field("configured", &self.api_key.is_some())
            .finish()
    }
}

impl DeepSeekProvider {
    /// Provider with the standard breaker and retry policies.
    pub fn new(config: &ProviderConfig) -> Self {
        Self::with_policies(config, RetryExecutor::default(), CircuitBreaker::new())
    }

    /// Provider with explicit policies; tests shrink delays here.
    pub fn with_policies(
        config: &ProviderConfig,
        retry: RetryExecutor,
        breaker: CircuitBreaker,
    ) -> Self {
        let api_key = if config.api_key.is_empty() {
            None
        } else {
            Some(config.api_key.clone())
        };
        let api_base = config
            .api_base
            .clone()
            .unwrap_or_else(|| DEFAULT_API_BASE.to_string());

        Self {
            client: reqwest::Client::new(),
            api_key,
            api_base,
            breaker: Mutex::new(breaker),
            retry,
            extractor: ResponseExtractor::new(),
        }
    }

    fn breaker(&self) -> MutexGuard<'_, CircuitBreaker> {
        self.breaker.lock().expect("breaker mutex poisoned")
    }

    fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.api_base.trim_end_matches('/'))
    }

    /// One remote round trip. `Ok(None)` when the reply has no textual choice.
    async fn post_completion(&self, prompt: &str) -> Result<Option<String>, ProviderError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or(ProviderError::MissingCredentials)?;

        let body = ChatCompletionRequest {
            model: MODEL.to_string(),
            messages: vec![ChatMessage::user(prompt)],
            max_tokens: Some(MAX_TOKENS),
            temperature: Some(TEMPERATURE),
        };

        let response = self
            .client
            .post(self.completions_url())
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .await
            .map_err(ProviderError::remote)?;

        let status = response.status();
        if !status.is_success() {
            let error_body = response
                .text()
                .await
                .unwrap_or_else(|_| "failed to read error body".to_string());
            error!(%status, body = %error_body, "DeepSeek API error");
            return Err(ProviderError::Remote(format!("{status} — {error_body}")));
        }

        let parsed: ChatCompletionResponse =
            response.json().await.map_err(ProviderError::remote)?;
        Ok(parsed.first_content())
    }

    /// The full resilience envelope for one logical operation.
    async fn complete(&self, prompt: &str) -> Result<Option<String>, ProviderError> {
        if self.api_key.is_none() {
            return Err(ProviderError::MissingCredentials);
        }
        if !self.breaker().admit() {
            return Err(ProviderError::CircuitOpen);
        }
        self.retry.run(|| self.post_completion(prompt)).await
    }

    /// Shared recommendation path: remote call, extraction, degraded branches.
    async fn recommend(&self, prompt: &str, max_count: usize) -> RecommendationResult {
        match self.complete(prompt).await {
            Ok(Some(raw)) => {
                let extraction = self.extractor.extract(&raw, max_count);
                match extraction.source {
                    ExtractionSource::Fallback => {
                        warn!("model reply had no extractable recommendations");
                        RecommendationResult::Fallback {
                            records: extraction.records,
                            reason: FallbackReason::UnparsableReply,
                        }
                    }
                    source => {
                        self.breaker().record_success();
                        debug!(?source, count = extraction.records.len(), "recommendations extracted");
                        RecommendationResult::Generated(extraction.records)
                    }
                }
            }
            Ok(None) => {
                warn!("no reply from DeepSeek after retries, serving fallback");
                RecommendationResult::Fallback {
                    records: fallback_recommendations(max_count),
                    reason: FallbackReason::UnparsableReply,
                }
            }
            Err(ProviderError::MissingCredentials) => {
                warn!("no DeepSeek API key configured, serving fallback");
                RecommendationResult::Fallback {
                    records: fallback_recommendations(max_count),
                    reason: FallbackReason::MissingCredentials,
                }
            }
            Err(ProviderError::CircuitOpen) => {
                warn!("circuit breaker is open, serving fallback");
                RecommendationResult::Fallback {
                    records: fallback_recommendations(max_count),
                    reason: FallbackReason::CircuitOpen,
                }
            }
            Err(err) => {
                self.breaker().record_failure();
                error!(error = %err, "DeepSeek call failed, serving fallback");
                RecommendationResult::Fallback {
                    records: fallback_recommendations(max_count),
                    reason: FallbackReason::RemoteFailure,
                }
            }
        }
    }
}

#[async_trait]
impl AiProvider for DeepSeekProvider {
    fn name(&self) -> &str {
        "DeepSeek"
    }

    async fn recommendations(&self, request: &RecommendationRequest) -> RecommendationResult {
        let prompt = prompt::recommendation_prompt(request);
        self.recommend(&prompt, request.max_recommendations).await
    }

    async fn recommendations_with_library(
        &self,
        request: &LibraryRequest,
    ) -> RecommendationResult {
        let prompt = prompt::library_prompt(request);
        self.recommend(&prompt, request.max_recommendations).await
    }

    async fn chat(&self, message: &str, context: Option<&str>) -> String {
        let prompt = prompt::chat_prompt(message, context);
        match self.complete(&prompt).await {
            Ok(Some(reply)) => {
                self.breaker().record_success();
                reply
            }
            Ok(None) => {
                self.breaker().record_failure();
                warn!("invalid chat response from DeepSeek");
                NO_ANSWER_REPLY.to_string()
            }
            Err(ProviderError::MissingCredentials) => NO_CREDENTIALS_REPLY.to_string(),
            Err(ProviderError::CircuitOpen) => UNAVAILABLE_REPLY.to_string(),
            Err(err) => {
                self.breaker().record_failure();
                error!(error = %err, "DeepSeek chat failed");
                format!("Sorry, I encountered an error: {err}")
            }
        }
    }

    async fn is_available(&self) -> bool {
        self.api_key.is_some() && self.breaker().admit()
    }

    fn breaker_status(&self) -> Option<BreakerStatus> {
        Some(self.breaker().status(self.api_key.is_some()))
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
