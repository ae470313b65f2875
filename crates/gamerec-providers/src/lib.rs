//! AI provider layer for Gamerec.
//!
//! Fronts one or more external LLM completion APIs behind a uniform
//! recommendations/chat contract, tolerating provider failures, malformed
//! replies, and rate limits without surfacing raw provider errors to callers.
//!
//! # Architecture
//!
//! - [`traits::AiProvider`] — capability trait every provider implements
//! - [`breaker::CircuitBreaker`] — per-provider failure gate
//! - [`retry::RetryExecutor`] — bounded retries with exponential backoff
//! - [`extract::ResponseExtractor`] — JSON → text-scan → fallback pipeline
//! - [`deepseek::DeepSeekProvider`] — live OpenAI-compatible HTTP provider
//! - [`gigachat::GigaChatProvider`] — minimal chat-only provider
//! - [`registry::ServiceRegistry`] — provider selection and failover surface

pub mod breaker;
pub mod deepseek;
pub mod extract;
pub mod gigachat;
pub mod prompt;
pub mod registry;
pub mod retry;
pub mod traits;

// Re-export the main entry points for convenience
pub use breaker::{BreakerStatus, CircuitBreaker};
pub use deepseek::DeepSeekProvider;
pub use extract::ResponseExtractor;
pub use gigachat::GigaChatProvider;
pub use registry::ServiceRegistry;
pub use retry::RetryExecutor;
pub use traits::AiProvider;
