//! GigaChat provider — the minimal, chat-only variant.
//!
//! Has no structured-recommendation call: recommendations come from a small
//! fixed catalogue and chat is a simple echo. Availability only checks that
//! a key is configured.

use async_trait::async_trait;
use tracing::debug;

use gamerec_core::config::ProviderConfig;
use gamerec_core::types::{
    LibraryRequest, Recommendation, RecommendationRequest, RecommendationResult,
};

use crate::traits::AiProvider;

/// Minimal provider for the GigaChat backend.
#[derive(Debug)]
pub struct GigaChatProvider {
    api_key: Option<String>,
}

impl GigaChatProvider {
    // TODO: wire the real GigaChat chat-completion API; until then this
    // provider serves its fixed catalogue and echoes chat messages.
    pub fn new(config: &ProviderConfig) -> Self {
        let api_key = if config.api_key.is_empty() {
            None
        } else {
            Some(config.api_key.clone())
        };
        Self { api_key }
    }

    fn catalogue(max_count: usize) -> Vec<Recommendation> {
        let records = vec![
            Recommendation {
                title: "Red Dead Redemption 2".to_string(),
                genre: "Action-Adventure".to_string(),
                description: "Western action-adventure game set in 1899".to_string(),
                why_recommended: "Perfect for action game lovers with immersive storytelling"
                    .to_string(),
                platforms: ["PC", "PS4", "PS5", "Xbox One", "Xbox Series X"]
                    .iter()
                    .map(|p| p.to_string())
                    .collect(),
                rating: 9.7,
                release_year: "2018".to_string(),
            },
            Recommendation {
                title: "God of War (2018)".to_string(),
                genre: "Action-Adventure".to_string(),
                description: "Epic action-adventure with Norse mythology".to_string(),
                why_recommended: "Intense action combat with compelling narrative".to_string(),
                platforms: ["PC", "PS4", "PS5"].iter().map(|p| p.to_string()).collect(),
                rating: 9.4,
                release_year: "2018".to_string(),
            },
        ];
        records.into_iter().take(max_count).collect()
    }
}

#[async_trait]
impl AiProvider for GigaChatProvider {
    fn name(&self) -> &str {
        "GigaChat"
    }

    async fn recommendations(&self, request: &RecommendationRequest) -> RecommendationResult {
        debug!(preferences = %request.preferences, "serving GigaChat catalogue recommendations");
        RecommendationResult::Generated(Self::catalogue(request.max_recommendations))
    }

    async fn recommendations_with_library(
        &self,
        request: &LibraryRequest,
    ) -> RecommendationResult {
        debug!(message = %request.message, "serving GigaChat catalogue recommendations");
        RecommendationResult::Generated(Self::catalogue(request.max_recommendations))
    }

    async fn chat(&self, message: &str, _context: Option<&str>) -> String {
        debug!(%message, "GigaChat echo chat");
        format!(
            "GigaChat AI: I understand you're asking about '{message}'. \
             This backend is not fully integrated yet."
        )
    }

    async fn is_available(&self) -> bool {
        self.api_key.is_some()
    }
}
