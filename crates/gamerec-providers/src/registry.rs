//! Service registry — owns the configured providers and routes every call
//! to the currently-active one.
//!
//! Construction enumerates providers with credentials present, in fixed
//! configuration order (DeepSeek first, then GigaChat); the first becomes
//! active. The active reference is an index into the registry's own
//! sequence. `switch_to` may race with in-flight requests; each request
//! snapshots the active provider once and is never redirected retroactively.
//!
//! No registry operation fails: with nothing configured the recommendation
//! calls return empty records and chat returns a fixed notice.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use serde::Serialize;
use tracing::{error, info, warn};

use gamerec_core::config::ProvidersConfig;
use gamerec_core::types::{LibraryRequest, Recommendation, RecommendationRequest};

use crate::breaker::BreakerStatus;
use crate::deepseek::DeepSeekProvider;
use crate::gigachat::GigaChatProvider;
use crate::traits::AiProvider;

const NO_SERVICE_REPLY: &str = "No AI service available";

/// Registry of configured AI providers.
pub struct ServiceRegistry {
    services: Vec<Arc<dyn AiProvider>>,
    active: RwLock<Option<usize>>,
}

/// Per-service entry in the monitoring report.
#[derive(Clone, Debug, Serialize)]
pub struct ServiceStatus {
    pub available: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub circuit_breaker: Option<BreakerStatus>,
}

impl ServiceRegistry {
    /// Enumerate providers whose credentials are present.
    pub fn from_config(config: &ProvidersConfig) -> Self {
        let mut services: Vec<Arc<dyn AiProvider>> = Vec::new();

        if config.deepseek.is_configured() {
            services.push(Arc::new(DeepSeekProvider::new(&config.deepseek)));
            info!("DeepSeek provider initialized");
        }
        if config.gigachat.is_configured() {
            services.push(Arc::new(GigaChatProvider::new(&config.gigachat)));
            info!("GigaChat provider initialized");
        }

        Self::with_services(services)
    }

    /// Build a registry over an explicit provider list; the first is active.
    pub fn with_services(services: Vec<Arc<dyn AiProvider>>) -> Self {
        let active = if services.is_empty() {
            warn!("no AI providers configured");
            None
        } else {
            info!(provider = services[0].name(), "active provider set");
            Some(0)
        };

        Self {
            services,
            active: RwLock::new(active),
        }
    }

    fn active_service(&self) -> Option<Arc<dyn AiProvider>> {
        let index = (*self.active.read().expect("active lock poisoned"))?;
        self.services.get(index).cloned()
    }

    /// Name of the active provider, or `"none"`.
    pub fn active_provider_name(&self) -> String {
        self.active_service()
            .map(|service| service.name().to_string())
            .unwrap_or_else(|| "none".to_string())
    }

    /// Names of all configured providers, in configuration order.
    pub fn available_services(&self) -> Vec<String> {
        self.services
            .iter()
            .map(|service| service.name().to_string())
            .collect()
    }

    /// Switch the active provider by name (case-insensitive).
    ///
    /// Returns false and leaves the registry untouched when no provider
    /// matches.
    pub fn switch_to(&self, name: &str) -> bool {
        let found = self
            .services
            .iter()
            .position(|service| service.name().eq_ignore_ascii_case(name));

        match found {
            Some(index) => {
                *self.active.write().expect("active lock poisoned") = Some(index);
                info!(provider = self.services[index].name(), "switched active provider");
                true
            }
            None => {
                warn!(%name, "provider not found, active provider unchanged");
                false
            }
        }
    }

    /// Get recommendations from the active provider.
    pub async fn recommendations(&self, request: &RecommendationRequest) -> Vec<Recommendation> {
        let Some(service) = self.active_service() else {
            error!("no active AI service");
            return Vec::new();
        };

        let result = service.recommendations(request).await;
        if let Some(reason) = result.fallback_reason() {
            warn!(
                provider = service.name(),
                reason = reason.as_str(),
                "serving fallback recommendations"
            );
        }
        let records = result.into_records();
        info!(
            provider = service.name(),
            count = records.len(),
            "recommendations returned"
        );
        records
    }

    /// Get library-aware recommendations from the active provider.
    pub async fn recommendations_with_library(
        &self,
        request: &LibraryRequest,
    ) -> Vec<Recommendation> {
        let Some(service) = self.active_service() else {
            error!("no active AI service");
            return Vec::new();
        };

        let result = service.recommendations_with_library(request).await;
        if let Some(reason) = result.fallback_reason() {
            warn!(
                provider = service.name(),
                reason = reason.as_str(),
                "serving fallback recommendations"
            );
        }
        result.into_records()
    }

    /// Chat with the active provider.
    pub async fn chat(&self, message: &str, context: Option<&str>) -> String {
        let Some(service) = self.active_service() else {
            error!("no active AI service");
            return NO_SERVICE_REPLY.to_string();
        };
        service.chat(message, context).await
    }

    /// Availability of every configured provider.
    pub async fn check_health(&self) -> HashMap<String, bool> {
        let mut health = HashMap::new();
        for service in &self.services {
            health.insert(service.name().to_string(), service.is_available().await);
        }
        health
    }

    /// Full monitoring report: availability plus breaker snapshots.
    pub async fn service_status(&self) -> HashMap<String, ServiceStatus> {
        let mut report = HashMap::new();
        for service in &self.services {
            report.insert(
                service.name().to_string(),
                ServiceStatus {
                    available: service.is_available().await,
                    circuit_breaker: service.breaker_status(),
                },
            );
        }
        report
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use gamerec_core::config::ProviderConfig;
    use gamerec_core::types::{FallbackReason, RecommendationResult};

    /// Deterministic test double.
    struct MockProvider {
        name: &'static str,
        available: bool,
        degraded: bool,
        calls: AtomicUsize,
    }

    impl MockProvider {
        fn new(name: &'static str) -> Arc<Self> {
            Arc::new(Self {
                name,
                available: true,
                degraded: false,
                calls: AtomicUsize::new(0),
            })
        }

        fn degraded(name: &'static str) -> Arc<Self> {
            Arc::new(Self {
                name,
                available: false,
                degraded: true,
                calls: AtomicUsize::new(0),
            })
        }

        fn record(&self) -> Recommendation {
            Recommendation {
                title: format!("{} pick", self.name),
                ..Default::default()
            }
        }
    }

    #[async_trait]
    impl AiProvider for MockProvider {
        fn name(&self) -> &str {
            self.name
        }

        async fn recommendations(&self, _: &RecommendationRequest) -> RecommendationResult {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.degraded {
                RecommendationResult::Fallback {
                    records: vec![self.record()],
                    reason: FallbackReason::CircuitOpen,
                }
            } else {
                RecommendationResult::Generated(vec![self.record()])
            }
        }

        async fn recommendations_with_library(&self, _: &LibraryRequest) -> RecommendationResult {
            self.calls.fetch_add(1, Ordering::SeqCst);
            RecommendationResult::Generated(vec![self.record()])
        }

        async fn chat(&self, message: &str, _: Option<&str>) -> String {
            format!("{}: {}", self.name, message)
        }

        async fn is_available(&self) -> bool {
            self.available
        }
    }

    #[test]
    fn test_from_config_filters_unconfigured() {
        let mut config = ProvidersConfig::default();
        config.gigachat = ProviderConfig {
            api_key: "gc-key".to_string(),
            api_base: None,
        };

        let registry = ServiceRegistry::from_config(&config);
        assert_eq!(registry.available_services(), vec!["GigaChat"]);
        assert_eq!(registry.active_provider_name(), "GigaChat");
    }

    #[test]
    fn test_from_config_prefers_first_configured() {
        let config = ProvidersConfig {
            deepseek: ProviderConfig {
                api_key: "ds-key".to_string(),
                api_base: None,
            },
            gigachat: ProviderConfig {
                api_key: "gc-key".to_string(),
                api_base: None,
            },
        };

        let registry = ServiceRegistry::from_config(&config);
        assert_eq!(registry.available_services(), vec!["DeepSeek", "GigaChat"]);
        assert_eq!(registry.active_provider_name(), "DeepSeek");
    }

    #[tokio::test]
    async fn test_empty_registry_degrades_gracefully() {
        let registry = ServiceRegistry::with_services(vec![]);

        assert_eq!(registry.active_provider_name(), "none");
        assert!(registry.available_services().is_empty());
        assert!(registry
            .recommendations(&RecommendationRequest::new("anything"))
            .await
            .is_empty());
        assert_eq!(registry.chat("hello", None).await, NO_SERVICE_REPLY);
        assert!(registry.check_health().await.is_empty());
    }

    #[tokio::test]
    async fn test_operations_delegate_to_active_only() {
        let first = MockProvider::new("First");
        let second = MockProvider::new("Second");
        let services: Vec<Arc<dyn AiProvider>> = vec![first.clone(), second.clone()];
        let registry = ServiceRegistry::with_services(services);

        let records = registry
            .recommendations(&RecommendationRequest::new("anything"))
            .await;
        assert_eq!(records[0].title, "First pick");
        assert_eq!(first.calls.load(Ordering::SeqCst), 1);
        assert_eq!(second.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_switch_to_reassigns_case_insensitive() {
        let first = MockProvider::new("First");
        let second = MockProvider::new("Second");
        let services: Vec<Arc<dyn AiProvider>> = vec![first.clone(), second.clone()];
        let registry = ServiceRegistry::with_services(services);

        assert!(registry.switch_to("SECOND"));
        assert_eq!(registry.active_provider_name(), "Second");

        let records = registry
            .recommendations(&RecommendationRequest::new("anything"))
            .await;
        assert_eq!(records[0].title, "Second pick");
    }

    #[tokio::test]
    async fn test_switch_to_unknown_leaves_active_unchanged() {
        let services: Vec<Arc<dyn AiProvider>> = vec![MockProvider::new("Only")];
        let registry = ServiceRegistry::with_services(services);

        assert!(!registry.switch_to("Nope"));
        assert_eq!(registry.active_provider_name(), "Only");
    }

    #[tokio::test]
    async fn test_degraded_results_still_flatten_to_records() {
        let services: Vec<Arc<dyn AiProvider>> = vec![MockProvider::degraded("Broken")];
        let registry = ServiceRegistry::with_services(services);

        let records = registry
            .recommendations(&RecommendationRequest::new("anything"))
            .await;
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].title, "Broken pick");
    }

    #[tokio::test]
    async fn test_check_health_reports_all_services() {
        let services: Vec<Arc<dyn AiProvider>> =
            vec![MockProvider::new("Up"), MockProvider::degraded("Down")];
        let registry = ServiceRegistry::with_services(services);

        let health = registry.check_health().await;
        assert_eq!(health.get("Up"), Some(&true));
        assert_eq!(health.get("Down"), Some(&false));
    }

    #[tokio::test]
    async fn test_chat_is_idempotent_against_deterministic_backend() {
        let services: Vec<Arc<dyn AiProvider>> = vec![MockProvider::new("Echo")];
        let registry = ServiceRegistry::with_services(services);

        let first = registry.chat("same question", None).await;
        let second = registry.chat("same question", None).await;
        assert_eq!(first, "Echo: same question");
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_service_status_includes_breaker_for_live_provider() {
        let config = ProvidersConfig {
            deepseek: ProviderConfig {
                api_key: "ds-key".to_string(),
                api_base: None,
            },
            ..Default::default()
        };
        let registry = ServiceRegistry::from_config(&config);

        let report = registry.service_status().await;
        let deepseek = report.get("DeepSeek").unwrap();
        assert!(deepseek.available);
        let breaker = deepseek.circuit_breaker.as_ref().unwrap();
        assert!(!breaker.circuit_open);
        assert!(breaker.api_key_configured);
    }
}
