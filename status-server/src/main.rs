//! ATM Health Status Server
//!
//! Predict/status service between the simulator and the dashboards.
//!
//! # Architecture
//!
//! ```text
//! ┌───────────┐  POST /predict  ┌──────────────────────────────┐  GET /status  ┌───────────┐
//! │ simulator │ ──────────────▶ │ classify ─▶ publish ─▶ store │ ◀──────────── │ dashboard │
//! └───────────┘                 └──────────────────────────────┘               └───────────┘
//! ```

mod config;
mod error;
mod handlers;
mod state;


use anyhow::Context;
use axum::{
    Router,
    routing::{get, post},
};
use tower_http::{
    cors::{CorsLayer, Any},
    trace::TraceLayer,
    compression::CompressionLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use std::net::SocketAddr;

use atm_health_core::{FleetConfig, InferenceEngine, ScoringPipeline};

pub use error::{AppError, AppResult};
pub use state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = config::Config::from_env();

    // Initialize logging (JSON lines in production)
    let registry = tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| "atm_status_server=debug,atm_health_core=info,tower_http=debug".into()));
    if config.is_production() {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }

    tracing::info!("ATM Health Status Server starting ({})...", config.environment);

    let fleet = FleetConfig::from_env().context("Failed to load fleet config")?;

    let engine = InferenceEngine::load(&config.model_path)
        .with_context(|| format!("Failed to load classifier {}", config.model_path.display()))?;
    let meta = engine.metadata();
    tracing::info!(
        "Classifier loaded: {} ({}, {} estimators, sha256 {})",
        meta.model_path,
        meta.format,
        meta.estimators,
        &meta.checksum[..12.min(meta.checksum.len())]
    );

    let state = AppState::new(ScoringPipeline::new(engine, fleet.status_classifier()));

    let app = create_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("🚀 Server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
    }
}

/// Create the router with all routes
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health::check))
        .route("/predict", post(handlers::predict::predict))
        .route("/status", get(handlers::status::latest))
        .route("/api/v1/model", get(handlers::model::info))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any)
        )
        .with_state(state)
}
