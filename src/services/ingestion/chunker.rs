//! Document chunking.
//!
//! Splits oversized documents into overlapping fixed-size character
//! windows. The split is by raw character count with no tokenization:
//! the downstream indexer owns tokenization, and this layer must stay
//! deterministic.

#![allow(dead_code)]

use crate::models::{Document, DocumentMetadata};

use super::config::IngestionConfig;

/// A window of a larger text.
#[derive(Debug, Clone)]
pub struct TextChunk {
    /// The chunk text.
    pub content: String,

    /// 1-based chunk index.
    pub index: usize,

    /// Total number of chunks.
    pub total: usize,
}

/// Fixed-window text chunker with overlap.
pub struct TextChunker {
    max_chars: usize,
    overlap: usize,
}

impl TextChunker {
    /// Creates a chunker. The overlap is clamped below the window so the
    /// cursor always advances.
    pub fn new(max_chars: usize, overlap: usize) -> Self {
        let max_chars = max_chars.max(1);
        Self {
            max_chars,
            overlap: overlap.min(max_chars - 1),
        }
    }

    /// Creates a chunker from the pipeline configuration.
    pub fn from_config(config: &IngestionConfig) -> Self {
        Self::new(config.max_doc_chars, config.overlap_chars)
    }

    /// Splits text into successive windows of `max_chars` characters
    /// advancing by `max_chars - overlap`. Text at or under the budget
    /// comes back as a single chunk. The final window may be shorter and
    /// is never fully contained in its predecessor.
    pub fn chunk(&self, text: &str) -> Vec<TextChunk> {
        // Byte offset of every char boundary, plus the end.
        let bounds: Vec<usize> = text
            .char_indices()
            .map(|(i, _)| i)
            .chain(std::iter::once(text.len()))
            .collect();
        let char_len = bounds.len() - 1;

        if char_len <= self.max_chars {
            return vec![TextChunk {
                content: text.to_string(),
                index: 1,
                total: 1,
            }];
        }

        let mut pieces = Vec::new();
        let mut start = 0;
        loop {
            let end = (start + self.max_chars).min(char_len);
            pieces.push(text[bounds[start]..bounds[end]].to_string());
            if end == char_len {
                break;
            }
            start = end - self.overlap;
        }

        let total = pieces.len();
        pieces
            .into_iter()
            .enumerate()
            .map(|(i, content)| TextChunk {
                content,
                index: i + 1,
                total,
            })
            .collect()
    }

    /// Applies chunking to a finished document. Sub-budget documents pass
    /// through untouched (no chunk metadata); oversized ones fan out into
    /// one document per window carrying `chunk` and `chunks_total`.
    pub fn chunk_document(&self, doc: Document) -> Vec<Document> {
        let chunks = self.chunk(&doc.page_content);
        if chunks.len() == 1 {
            return vec![doc];
        }

        chunks
            .into_iter()
            .map(|chunk| {
                let metadata = DocumentMetadata {
                    chunk: Some(chunk.index as u32),
                    chunks_total: Some(chunk.total as u32),
                    ..doc.metadata.clone()
                };
                Document::new(chunk.content, metadata)
            })
            .collect()
    }

    /// Configured window size.
    pub fn max_chars(&self) -> usize {
        self.max_chars
    }

    /// Configured overlap.
    pub fn overlap(&self) -> usize {
        self.overlap
    }
}
