//! Business services for gridmill.
//!
//! The single service here is **ingestion**: the table-aware pipeline
//! that converts uploaded documents into retrieval documents.

#![allow(dead_code)]

pub mod ingestion;

// Re-exports
pub use ingestion::{
    IngestionConfig, IngestionService, Normalizer, PageSelector, ProcessInput, TextChunk,
    TextChunker,
};
