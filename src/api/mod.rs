//! API module for gridmill.
//!
//! This module provides the HTTP surface built with Axum:
//! - `/health` - Health check endpoint
//! - `/process` - Document ingestion (PUT, Bearer-authenticated)

pub mod error;
pub mod handlers;
pub mod routes;
pub mod types;

// Re-exports
pub use error::{ApiError, ApiResult, ErrorResponse};
pub use handlers::{AppState, SharedState};
pub use routes::{create_router, print_routes};
pub use types::HealthResponse;
