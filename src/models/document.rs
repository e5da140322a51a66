//! Output document model: the JSON objects returned to the indexer.

#![allow(dead_code)]

use serde::{Deserialize, Serialize};

/// Textual form a document was emitted in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocFormat {
    /// Full table rendered as a markdown pipe table.
    TableMd,
    /// One table row as `header: value` lines.
    RowKv,
    /// Per-page PDF text when no table survived extraction.
    FallbackText,
    /// Best-effort UTF-8 decode of a non-PDF body.
    BasicText,
}

impl DocFormat {
    /// Wire name, as serialized into metadata.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::TableMd => "table_md",
            Self::RowKv => "row_kv",
            Self::FallbackText => "fallback_text",
            Self::BasicText => "basic_text",
        }
    }
}

/// Metadata attached to every emitted document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentMetadata {
    /// Originating filename (from `X-Filename`, or a stable default).
    pub source: String,

    /// 1-based page the content came from.
    pub page: u32,

    /// What produced the content: a strategy name or a fallback path.
    pub extractor: String,

    /// Stable table identifier; present for table-origin documents only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub table_id: Option<String>,

    /// Emission format.
    pub format: DocFormat,

    /// 1-based chunk index, present only when the document was split.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chunk: Option<u32>,

    /// Total chunk count, present only when the document was split.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chunks_total: Option<u32>,
}

/// A single retrieval document: text plus provenance metadata.
///
/// Documents are produced once by the emitter and never mutated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    /// The document text handed to the embedding layer.
    pub page_content: String,

    /// Provenance and formatting metadata.
    pub metadata: DocumentMetadata,
}

impl Document {
    /// Creates a document with the given text and metadata.
    pub fn new(page_content: String, metadata: DocumentMetadata) -> Self {
        Self {
            page_content,
            metadata,
        }
    }

    /// Text length in characters.
    pub fn char_len(&self) -> usize {
        self.page_content.chars().count()
    }
}
