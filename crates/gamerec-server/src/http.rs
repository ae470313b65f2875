//! HTTP routes over the provider registry.
//!
//! Thin plumbing: every handler delegates to [`ServiceRegistry`] and wraps
//! the result in a plain JSON shape. Failures have already collapsed into
//! valid-but-degraded results by the time they reach this layer, so no
//! handler returns an error status for provider trouble.

use std::collections::HashMap;
use std::sync::Arc;

use axum::extract::State;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tower_http::trace::TraceLayer;
use tracing::info;

use gamerec_core::types::{LibraryRequest, Recommendation, RecommendationRequest};
use gamerec_providers::registry::{ServiceRegistry, ServiceStatus};

const SERVICE_NAME: &str = "gamerec-ai-service";
const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Build the service router.
pub fn router(registry: Arc<ServiceRegistry>) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/status", get(status))
        .route("/recommendations", post(recommendations))
        .route("/recommendations/library", post(recommendations_with_library))
        .route("/chat", post(chat))
        .with_state(registry)
        .layer(TraceLayer::new_for_http())
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    timestamp: String,
    service: &'static str,
    version: &'static str,
}

#[derive(Serialize)]
struct StatusResponse {
    status: &'static str,
    timestamp: String,
    active_provider: String,
    available_services: Vec<String>,
    services: HashMap<String, ServiceStatus>,
}

#[derive(Serialize)]
struct RecommendationsResponse {
    provider: String,
    recommendations: Vec<Recommendation>,
}

#[derive(Deserialize)]
struct ChatRequest {
    message: String,
    #[serde(default)]
    context: Option<String>,
}

#[derive(Serialize)]
struct ChatResponse {
    provider: String,
    response: String,
}

fn timestamp() -> String {
    chrono::Utc::now().to_rfc3339()
}

async fn healthz() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        timestamp: timestamp(),
        service: SERVICE_NAME,
        version: VERSION,
    })
}

async fn status(State(registry): State<Arc<ServiceRegistry>>) -> Json<StatusResponse> {
    Json(StatusResponse {
        status: "ok",
        timestamp: timestamp(),
        active_provider: registry.active_provider_name(),
        available_services: registry.available_services(),
        services: registry.service_status().await,
    })
}

async fn recommendations(
    State(registry): State<Arc<ServiceRegistry>>,
    Json(request): Json<RecommendationRequest>,
) -> Json<RecommendationsResponse> {
    info!(preferences = %request.preferences, "recommendation request received");
    let records = registry.recommendations(&request).await;
    Json(RecommendationsResponse {
        provider: registry.active_provider_name(),
        recommendations: records,
    })
}

async fn recommendations_with_library(
    State(registry): State<Arc<ServiceRegistry>>,
    Json(request): Json<LibraryRequest>,
) -> Json<RecommendationsResponse> {
    info!(
        owned = request.library.len(),
        "library recommendation request received"
    );
    let records = registry.recommendations_with_library(&request).await;
    Json(RecommendationsResponse {
        provider: registry.active_provider_name(),
        recommendations: records,
    })
}

async fn chat(
    State(registry): State<Arc<ServiceRegistry>>,
    Json(request): Json<ChatRequest>,
) -> Json<ChatResponse> {
    let response = registry
        .chat(&request.message, request.context.as_deref())
        .await;
    Json(ChatResponse {
        provider: registry.active_provider_name(),
        response,
    })
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
