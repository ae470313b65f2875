//! Environment-based configuration.
//!
//! The service is configured entirely through environment variables, read
//! once at startup:
//!
//! - `DEEPSEEK_API_KEY` / `DEEPSEEK_API_BASE` — live provider credentials
//!   and an optional endpoint override (useful for proxies and tests)
//! - `GIGACHAT_API_KEY` — minimal provider credentials
//! - `HTTP_HOST` / `HTTP_PORT` — transport bind address (default `0.0.0.0:8000`)
//!
//! A provider whose key is absent or empty is simply not registered; this is
//! a degraded-but-valid configuration, not an error.

/// Root configuration for the service.
#[derive(Clone, Debug, Default)]
pub struct Config {
    pub providers: ProvidersConfig,
    pub server: ServerConfig,
}

/// Per-provider credential blocks, in fixed configuration order.
#[derive(Clone, Debug, Default)]
pub struct ProvidersConfig {
    pub deepseek: ProviderConfig,
    pub gigachat: ProviderConfig,
}

/// Credentials and endpoint override for a single provider.
#[derive(Clone, Debug, Default)]
pub struct ProviderConfig {
    /// API key for authentication. Empty means "not configured".
    pub api_key: String,
    /// Custom API base URL (overrides the provider default).
    pub api_base: Option<String>,
}

impl ProviderConfig {
    /// Whether this provider has a usable API key.
    pub fn is_configured(&self) -> bool {
        !self.api_key.is_empty()
    }
}

/// HTTP transport bind address.
#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
        }
    }
}

impl Config {
    /// Load configuration from process environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary lookup function.
    ///
    /// `from_env` is a thin wrapper over this; tests pass a closure over a
    /// map instead of mutating process-global env state.
    pub fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Config::default();

        if let Some(key) = get("DEEPSEEK_API_KEY") {
            config.providers.deepseek.api_key = key;
        }
        config.providers.deepseek.api_base =
            get("DEEPSEEK_API_BASE").filter(|base| !base.is_empty());

        if let Some(key) = get("GIGACHAT_API_KEY") {
            config.providers.gigachat.api_key = key;
        }

        if let Some(host) = get("HTTP_HOST") {
            config.server.host = host;
        }
        if let Some(port) = get("HTTP_PORT") {
            match port.parse::<u16>() {
                Ok(p) => config.server.port = p,
                Err(_) => tracing::warn!(value = %port, "invalid HTTP_PORT, keeping default"),
            }
        }

        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_when_env_empty() {
        let config = Config::from_lookup(|_| None);
        assert!(!config.providers.deepseek.is_configured());
        assert!(!config.providers.gigachat.is_configured());
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 8000);
    }

    #[test]
    fn test_provider_keys_read_from_env() {
        let config = Config::from_lookup(lookup(&[
            ("DEEPSEEK_API_KEY", "sk-ds-123"),
            ("DEEPSEEK_API_BASE", "http://localhost:9999/v1"),
            ("GIGACHAT_API_KEY", "gc-456"),
        ]));
        assert!(config.providers.deepseek.is_configured());
        assert_eq!(
            config.providers.deepseek.api_base.as_deref(),
            Some("http://localhost:9999/v1")
        );
        assert!(config.providers.gigachat.is_configured());
    }

    #[test]
    fn test_empty_key_is_not_configured() {
        let config = Config::from_lookup(lookup(&[("DEEPSEEK_API_KEY", "")]));
        assert!(!config.providers.deepseek.is_configured());
    }

    #[test]
    fn test_server_overrides() {
        let config =
            Config::from_lookup(lookup(&[("HTTP_HOST", "127.0.0.1"), ("HTTP_PORT", "9090")]));
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 9090);
    }

    #[test]
    fn test_invalid_port_keeps_default() {
        let config = Config::from_lookup(lookup(&[("HTTP_PORT", "not-a-port")]));
        assert_eq!(config.server.port, 8000);
    }
}
