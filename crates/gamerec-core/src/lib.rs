//! Core types, configuration, and error taxonomy for Gamerec.
//!
//! Everything shared between the provider layer and the transport layer lives
//! here: the recommendation record and request shapes, the chat-completion
//! wire format, the [`ProviderError`] taxonomy, and the env-based [`Config`].

pub mod config;
pub mod error;
pub mod types;

pub use config::{Config, ProviderConfig, ProvidersConfig, ServerConfig};
pub use error::ProviderError;
pub use types::{
    FallbackReason, LibraryRequest, PlayedGame, Recommendation, RecommendationRequest,
    RecommendationResult,
};
