//! The AI provider trait — the capability every backend implements.
//!
//! Each external LLM backend (DeepSeek, GigaChat, …) is wrapped in a type
//! implementing this trait. The registry holds them as `Arc<dyn AiProvider>`
//! and only ever talks through this surface.

use async_trait::async_trait;

use gamerec_core::types::{LibraryRequest, RecommendationRequest, RecommendationResult};

use crate::breaker::BreakerStatus;

/// Trait that all AI providers must implement.
///
/// Every operation is total: recommendation calls degrade to a fallback
/// catalogue and chat calls degrade to a fixed apology string, so callers
/// never see a provider error.
#[async_trait]
pub trait AiProvider: Send + Sync {
    /// Display name for logs and the registry's case-insensitive lookup.
    fn name(&self) -> &str;

    /// Get structured recommendations for free-text preferences.
    async fn recommendations(&self, request: &RecommendationRequest) -> RecommendationResult;

    /// Get recommendations informed by the caller's game library.
    ///
    /// Ranks the library by playtime, folds the top titles into the
    /// instruction, and asks for games the caller does not already own.
    async fn recommendations_with_library(&self, request: &LibraryRequest)
        -> RecommendationResult;

    /// Free-form chat. Returns the model's first textual reply verbatim, or
    /// a fixed apology naming the failure cause.
    async fn chat(&self, message: &str, context: Option<&str>) -> String;

    /// Whether the provider has credentials and its breaker admits calls.
    /// Does not perform a live probe.
    async fn is_available(&self) -> bool;

    /// Circuit breaker snapshot for monitoring; `None` for providers
    /// without a breaker.
    fn breaker_status(&self) -> Option<BreakerStatus> {
        None
    }
}
