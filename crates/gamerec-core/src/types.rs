//! Shared types for the recommendation service.
//!
//! Two families live here: the domain records exchanged with callers
//! (recommendations, requests, results) and the OpenAI-compatible chat
//! completions wire format used by live providers.

use serde::{Deserialize, Serialize};

// ─────────────────────────────────────────────
// Recommendation records
// ─────────────────────────────────────────────

/// A single game recommendation.
///
/// Produced only by the response extractor or the deterministic fallback
/// catalogue. Every field carries a serde default so a partially-populated
/// model reply still deserializes into a complete record — a record is either
/// whole or not emitted at all.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Recommendation {
    pub title: String,
    pub genre: String,
    pub description: String,
    pub why_recommended: String,
    pub platforms: Vec<String>,
    /// Score in `[0, 10]`; clamped during extraction.
    pub rating: f64,
    pub release_year: String,
}

impl Recommendation {
    /// Clamp the rating into the valid `[0, 10]` range.
    pub fn clamp_rating(mut self) -> Self {
        self.rating = self.rating.clamp(0.0, 10.0);
        self
    }
}

/// A request for structured recommendations.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RecommendationRequest {
    /// Free-text description of what the user is looking for.
    pub preferences: String,
    /// Optional genre constraints.
    #[serde(default)]
    pub genres: Vec<String>,
    /// Optional platform constraints.
    #[serde(default)]
    pub platforms: Vec<String>,
    /// Upper bound on the number of records returned.
    #[serde(default = "default_max_recommendations")]
    pub max_recommendations: usize,
}

fn default_max_recommendations() -> usize {
    5
}

impl RecommendationRequest {
    /// Build a request with default limits and no constraints.
    pub fn new(preferences: impl Into<String>) -> Self {
        Self {
            preferences: preferences.into(),
            genres: Vec::new(),
            platforms: Vec::new(),
            max_recommendations: default_max_recommendations(),
        }
    }
}

/// One previously-played title from the caller's game library.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PlayedGame {
    pub name: String,
    /// Total playtime, in minutes.
    #[serde(default)]
    pub playtime_forever: u32,
    /// Playtime over the last two weeks, in minutes.
    #[serde(default)]
    pub playtime_2weeks: u32,
}

/// A recommendation request carrying the caller's library as context.
///
/// The provider ranks the library by playtime, folds the favorites into the
/// instruction, and asks for titles the caller does not already own.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LibraryRequest {
    pub message: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub library: Vec<PlayedGame>,
    #[serde(default = "default_max_recommendations")]
    pub max_recommendations: usize,
}

// ─────────────────────────────────────────────
// Results
// ─────────────────────────────────────────────

/// Why a provider served fallback records instead of model output.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FallbackReason {
    /// No API key configured for the provider.
    MissingCredentials,
    /// The circuit breaker rejected the call before any remote attempt.
    CircuitOpen,
    /// The remote call failed after exhausting all retry attempts.
    RemoteFailure,
    /// The remote reply carried no extractable recommendations.
    UnparsableReply,
}

impl FallbackReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            FallbackReason::MissingCredentials => "missing_credentials",
            FallbackReason::CircuitOpen => "circuit_open",
            FallbackReason::RemoteFailure => "remote_failure",
            FallbackReason::UnparsableReply => "unparsable_reply",
        }
    }
}

/// Outcome of a recommendation call.
///
/// The provider contract is "never fails, always returns usable data"; this
/// type makes that visible: the degraded path is an explicit variant carrying
/// the same record shape, not an error.
#[derive(Clone, Debug)]
pub enum RecommendationResult {
    /// Records extracted from a live model reply.
    Generated(Vec<Recommendation>),
    /// Deterministic fallback records, with the cause of degradation.
    Fallback {
        records: Vec<Recommendation>,
        reason: FallbackReason,
    },
}

impl RecommendationResult {
    /// The records, regardless of how they were produced.
    pub fn records(&self) -> &[Recommendation] {
        match self {
            RecommendationResult::Generated(records) => records,
            RecommendationResult::Fallback { records, .. } => records,
        }
    }

    /// Flatten into plain records for transport callers.
    pub fn into_records(self) -> Vec<Recommendation> {
        match self {
            RecommendationResult::Generated(records) => records,
            RecommendationResult::Fallback { records, .. } => records,
        }
    }

    /// The degradation cause, if this is a fallback result.
    pub fn fallback_reason(&self) -> Option<FallbackReason> {
        match self {
            RecommendationResult::Generated(_) => None,
            RecommendationResult::Fallback { reason, .. } => Some(*reason),
        }
    }
}

// ─────────────────────────────────────────────
// Chat completions wire format
// ─────────────────────────────────────────────

/// A chat message in the OpenAI-compatible request format.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    /// Create a user message.
    pub fn user(content: impl Into<String>) -> Self {
        ChatMessage {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

/// Request body for an OpenAI-compatible chat completion API.
#[derive(Debug, Serialize)]
pub struct ChatCompletionRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
}

/// Raw chat completion response from an OpenAI-compatible API.
#[derive(Debug, Deserialize)]
pub struct ChatCompletionResponse {
    pub choices: Vec<ChatChoice>,
}

/// A single choice in a chat completion response.
#[derive(Debug, Deserialize)]
pub struct ChatChoice {
    pub message: AssistantReply,
}

/// The assistant message within a chat completion choice.
#[derive(Debug, Deserialize)]
pub struct AssistantReply {
    pub content: Option<String>,
}

impl ChatCompletionResponse {
    /// The first textual reply, if the response carries one.
    pub fn first_content(self) -> Option<String> {
        self.choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .filter(|content| !content.is_empty())
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
