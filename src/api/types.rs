//! API request/response types.

#![allow(dead_code)]

use serde::Serialize;

/// Health check response
#[derive(Serialize, Clone)]
pub struct HealthResponse {
    pub ok: bool,
}
