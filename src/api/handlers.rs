//! API request handlers.

#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::HeaderMap;
use axum::Json;
use tracing::debug;

use crate::models::Document;
use crate::services::ingestion::{IngestionService, ProcessInput};

use super::error::{ApiError, ApiResult};
use super::types::HealthResponse;

/// Application state shared across handlers
pub struct AppState {
    /// Bearer secret clients must present.
    pub api_key: String,

    /// The ingestion pipeline.
    pub service: IngestionService,
}

/// Thread-safe shared state. Configuration is read once at startup and
/// immutable afterwards, so no lock is needed.
pub type SharedState = Arc<AppState>;

// ============================================================================
// Health Check Handler
// ============================================================================

/// Health check endpoint
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse { ok: true })
}

// ============================================================================
// Process Handler
// ============================================================================

/// Converts an uploaded document into retrieval documents.
///
/// Auth is checked before anything touches the body: `401` without a
/// Bearer header, `403` on a token mismatch, `400` on an empty body.
pub async fn process(
    State(state): State<SharedState>,
    headers: HeaderMap,
    body: Bytes,
) -> ApiResult<Json<Vec<Document>>> {
    require_bearer(&state.api_key, &headers)?;

    if body.is_empty() {
        return Err(ApiError::BadRequest("Empty body".to_string()));
    }

    let mut input = ProcessInput::new(body.to_vec());
    if let Some(mime) = header_str(&headers, "content-type") {
        input = input.with_content_type(mime);
    }
    if let Some(filename) = header_str(&headers, "x-filename") {
        input = input.with_filename(filename);
    }

    debug!(
        "processing upload: source={:?}, pdf={}, {} byte(s)",
        input.source(),
        input.is_pdf(),
        input.data.len()
    );

    let documents = state.service.process(input).await?;
    Ok(Json(documents))
}

/// Validates the `Authorization: Bearer <key>` header.
fn require_bearer(api_key: &str, headers: &HeaderMap) -> Result<(), ApiError> {
    let header = header_str(headers, "authorization").ok_or(ApiError::Unauthorized)?;

    let (scheme, token) = header.split_once(' ').ok_or(ApiError::Unauthorized)?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return Err(ApiError::Unauthorized);
    }
    if token.trim() != api_key {
        return Err(ApiError::Forbidden);
    }
    Ok(())
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}
