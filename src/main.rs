mod api;
mod models;
mod services;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use dotenv::dotenv;
use http::Method;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::api::handlers::AppState;
use crate::services::ingestion::{IngestionConfig, IngestionService};

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables
    dotenv().ok();

    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "gridmill=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting gridmill ingestion engine...");

    // The Bearer secret is the one setting without a default.
    let api_key = std::env::var("ENGINE_API_KEY")
        .ok()
        .filter(|k| !k.trim().is_empty())
        .context("ENGINE_API_KEY is not set; refusing to start an open ingestion endpoint")?;

    let config = IngestionConfig::from_env();
    config
        .validate()
        .context("invalid ingestion configuration")?;
    info!(
        "Pipeline config: pages={:?}, window={} chars (overlap {}), {} extractor worker(s)",
        config.pages, config.max_doc_chars, config.overlap_chars, config.extractor_workers
    );

    let state = Arc::new(AppState {
        api_key,
        service: IngestionService::new(config),
    });

    // Permissive CORS; the Bearer check is the real gate.
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::PUT, Method::OPTIONS])
        .allow_headers(Any)
        .max_age(std::time::Duration::from_secs(3600));

    let app = api::routes::create_router(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http());

    let port: u16 = std::env::var("SERVER_PORT")
        .unwrap_or_else(|_| "8088".to_string())
        .parse()
        .unwrap_or(8088);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));

    info!("gridmill API server starting on http://{}", addr);
    api::routes::print_routes();

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("gridmill shut down gracefully");

    Ok(())
}

/// Graceful shutdown signal
async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("Failed to install CTRL+C signal handler");
    info!("Shutdown signal received...");
}
