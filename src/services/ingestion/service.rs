//! Main ingestion service.
//!
//! Orchestrates the pipeline per request:
//! 1. Table extraction (three concurrent strategies, merged + deduped)
//! 2. Document emission (markdown snapshot + row-level documents)
//! 3. Chunking of oversized documents
//! 4. Text fallback when no table survives
//!
//! The service holds immutable configuration only; all working state is
//! request-scoped, and the output is deterministic for identical input.

#![allow(dead_code)]

use std::collections::BTreeMap;
use std::time::Instant;

use anyhow::Result;
use tracing::{debug, info};

use crate::models::{DocFormat, Document, DocumentMetadata};

use super::chunker::TextChunker;
use super::config::IngestionConfig;
use super::{emit, extractors};

/// Default `source` when the client sends no filename.
const DEFAULT_SOURCE: &str = "uploaded";

/// Input for one processing request.
#[derive(Debug, Clone)]
pub struct ProcessInput {
    /// Raw request body.
    pub data: Vec<u8>,

    /// Filename from `X-Filename`, if any.
    pub filename: Option<String>,

    /// Content type from the request, if any.
    pub content_type: Option<String>,
}

impl ProcessInput {
    /// Creates an input from raw bytes.
    pub fn new(data: Vec<u8>) -> Self {
        Self {
            data,
            filename: None,
            content_type: None,
        }
    }

    /// Sets the filename.
    pub fn with_filename(mut self, filename: &str) -> Self {
        self.filename = Some(filename.to_string());
        self
    }

    /// Sets the content type.
    pub fn with_content_type(mut self, content_type: &str) -> Self {
        self.content_type = Some(content_type.to_string());
        self
    }

    /// Effective source name for metadata.
    pub fn source(&self) -> &str {
        match self.filename.as_deref().map(str::trim) {
            Some(name) if !name.is_empty() => name,
            _ => DEFAULT_SOURCE,
        }
    }

    /// PDF routing rule: content type contains `pdf`, or the filename
    /// ends in `.pdf` (case-insensitive).
    pub fn is_pdf(&self) -> bool {
        let by_mime = self
            .content_type
            .as_deref()
            .map(|m| m.to_ascii_lowercase().contains("pdf"))
            .unwrap_or(false);
        let by_name = self
            .filename
            .as_deref()
            .map(|f| f.to_ascii_lowercase().ends_with(".pdf"))
            .unwrap_or(false);
        by_mime || by_name
    }
}

/// The main ingestion service.
pub struct IngestionService {
    config: IngestionConfig,
    chunker: TextChunker,
}

impl IngestionService {
    /// Creates a service with the given configuration.
    pub fn new(config: IngestionConfig) -> Self {
        let chunker = TextChunker::from_config(&config);
        Self { config, chunker }
    }

    /// Creates a service with default configuration.
    pub fn with_defaults() -> Self {
        Self::new(IngestionConfig::default())
    }

    /// Gets the configuration.
    pub fn config(&self) -> &IngestionConfig {
        &self.config
    }

    /// Processes one request body into retrieval documents.
    ///
    /// Always returns at least one document on success.
    pub async fn process(&self, input: ProcessInput) -> Result<Vec<Document>> {
        let start = Instant::now();

        let documents = if input.is_pdf() {
            self.process_pdf(&input).await?
        } else {
            self.process_basic_text(&input)
        };

        info!(
            "processed {:?}: {} document(s) in {}ms",
            input.source(),
            documents.len(),
            start.elapsed().as_millis()
        );
        Ok(documents)
    }

    /// PDF route: table pipeline with text fallback.
    async fn process_pdf(&self, input: &ProcessInput) -> Result<Vec<Document>> {
        let tables = extractors::extract_tables(&input.data, &self.config).await?;

        if tables.is_empty() {
            debug!("no tables survived, falling back to page text");
            return Ok(self.fallback_text_documents(input));
        }

        // 1-based ordinal per page, assigned in final merge order.
        let mut page_ordinals: BTreeMap<u32, usize> = BTreeMap::new();
        let mut documents = Vec::new();
        for table in &tables {
            let ordinal = page_ordinals
                .entry(table.page)
                .and_modify(|n| *n += 1)
                .or_insert(1);
            for doc in emit::emit_table(table, input.source(), *ordinal) {
                documents.extend(self.chunker.chunk_document(doc));
            }
        }
        Ok(documents)
    }

    /// Per-page text fallback for PDFs without usable tables.
    fn fallback_text_documents(&self, input: &ProcessInput) -> Vec<Document> {
        let mut text =
            extractors::text::extract_pdf_text(&input.data, self.config.max_text_pages);
        if text.is_empty() {
            text = extractors::text::ocr_needed_message(input.source());
        }

        let doc = Document::new(
            text,
            self.metadata(input, "fallback_text", DocFormat::FallbackText),
        );
        self.chunker.chunk_document(doc)
    }

    /// Non-PDF route: best-effort UTF-8 text.
    fn process_basic_text(&self, input: &ProcessInput) -> Vec<Document> {
        let mut text = extractors::text::decode_basic_text(&input.data);
        if text.is_empty() {
            text = extractors::text::unhandled_format_message(input.source());
        }

        let doc = Document::new(
            text,
            self.metadata(input, "basic_text", DocFormat::BasicText),
        );
        self.chunker.chunk_document(doc)
    }

    fn metadata(&self, input: &ProcessInput, extractor: &str, format: DocFormat) -> DocumentMetadata {
        DocumentMetadata {
            source: input.source().to_string(),
            page: 1,
            extractor: extractor.to_string(),
            table_id: None,
            format,
            chunk: None,
            chunks_total: None,
        }
    }
}
