//! gridmill: table-aware PDF ingestion service for RAG pipelines.
//!
//! This module exposes the public API of the library.

#![allow(dead_code)]

pub mod api;
pub mod models;
pub mod services;

// Re-export main types
pub use api::{ApiError, ApiResult, AppState, SharedState};
pub use models::{DocFormat, Document, DocumentMetadata, Strategy, Table};
pub use services::ingestion::{
    IngestionConfig, IngestionService, Normalizer, PageSelector, ProcessInput, TextChunker,
};
