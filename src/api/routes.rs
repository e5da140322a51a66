//! API route definitions.

#![allow(dead_code)]

use axum::{
    routing::{get, put},
    Router,
};

use super::handlers::{self, SharedState};

/// Creates the API router with all routes configured
pub fn create_router(state: SharedState) -> Router {
    Router::new()
        // Health check
        .route("/health", get(handlers::health_check))
        // Document processing
        .route("/process", put(handlers::process))
        // State
        .with_state(state)
}

/// Prints all available routes for logging
pub fn print_routes() {
    tracing::info!("Available API routes:");
    tracing::info!("  GET /health   - Health check");
    tracing::info!("  PUT /process  - Convert an uploaded document into retrieval documents");
}
