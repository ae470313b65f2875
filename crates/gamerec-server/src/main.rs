//! AI service entry point.
//!
//! Startup sequence:
//! 1. Initialize tracing
//! 2. Load config from environment variables
//! 3. Build the provider registry (providers with credentials present)
//! 4. Serve the HTTP API until ctrl-c

mod http;

use std::sync::Arc;

use anyhow::Context;
use tracing::info;
use tracing_subscriber::EnvFilter;

use gamerec_core::Config;
use gamerec_providers::ServiceRegistry;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::from_env();
    let registry = Arc::new(ServiceRegistry::from_config(&config.providers));
    info!(
        active = %registry.active_provider_name(),
        services = ?registry.available_services(),
        "AI service starting"
    );

    let app = http::router(registry);
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!("HTTP server listening on {addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("AI service stopped");
    Ok(())
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("shutdown signal received"),
        Err(err) => tracing::error!(error = %err, "failed to listen for shutdown signal"),
    }
}
