//! Error taxonomy for the provider layer.
//!
//! None of these ever reach a registry caller as a hard failure — each kind
//! collapses into a fallback result or a fixed apology string inside the
//! provider. The distinction exists so logs and apologies can name the cause.

use thiserror::Error;

/// Why a remote provider call could not produce a usable reply.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// The provider has no API key configured. Permanently degrades the
    /// provider to fallback-only; never fatal.
    #[error("no API credentials configured")]
    MissingCredentials,

    /// The circuit breaker is open; the remote call was not attempted.
    #[error("circuit breaker is open")]
    CircuitOpen,

    /// Transport or API-level failure (network error, non-2xx status,
    /// undecodable response body).
    #[error("remote API call failed: {0}")]
    Remote(String),
}

impl ProviderError {
    /// Build a [`ProviderError::Remote`] from any displayable error.
    pub fn remote(err: impl std::fmt::Display) -> Self {
        ProviderError::Remote(err.to_string())
    }
}
