//! Document ingestion pipeline.
//!
//! Turns uploaded bytes into retrieval documents:
//! - PDF bodies run the table pipeline (three extraction strategies,
//!   normalization with multi-row header reconstruction, content-hash
//!   deduplication, markdown + row-level emission)
//! - everything else takes the text path
//! - oversized documents are chunked with overlap
//!
//! # Example
//!
//! ```ignore
//! use gridmill::services::ingestion::{IngestionService, ProcessInput};
//!
//! let service = IngestionService::with_defaults();
//! let input = ProcessInput::new(data)
//!     .with_filename("tarifs.pdf")
//!     .with_content_type("application/pdf");
//!
//! let documents = service.process(input).await?;
//! ```

#![allow(dead_code)]

pub mod chunker;
pub mod config;
pub mod emit;
pub mod extractors;
pub mod normalize;
pub mod pdf;
pub mod service;

// Re-exports
pub use chunker::{TextChunk, TextChunker};
pub use config::{ConfigError, IngestionConfig, PageSelector};
pub use extractors::{extract_tables, TableStrategy};
pub use normalize::Normalizer;
pub use service::{IngestionService, ProcessInput};
