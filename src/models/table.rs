//! Candidate table model shared by all extraction strategies.

#![allow(dead_code)]

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Unit separator between cells in the canonical serialization.
const CELL_SEP: &str = "\u{1f}";
/// Record separator between rows in the canonical serialization.
const ROW_SEP: &str = "\u{1e}";

/// Extraction strategy that produced a candidate table.
///
/// The ordering of the variants is significant: it is the tie-break rank
/// used when deduplicating tables detected by more than one strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    /// Ruled-line grid detection.
    Lattice,
    /// Whitespace-alignment column inference.
    Stream,
    /// Text-box grouping fallback.
    Plumber,
}

impl Strategy {
    /// Merge rank: lower wins ties during deduplication.
    pub fn rank(&self) -> u8 {
        match self {
            Self::Lattice => 0,
            Self::Stream => 1,
            Self::Plumber => 2,
        }
    }

    /// Wire name used in document metadata.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Lattice => "lattice",
            Self::Stream => "stream",
            Self::Plumber => "plumber",
        }
    }

    /// All strategies in merge-rank order.
    pub fn all() -> [Strategy; 3] {
        [Self::Lattice, Self::Stream, Self::Plumber]
    }
}

impl std::fmt::Display for Strategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A candidate table: an ordered grid of cells plus a header row.
///
/// Extractors produce tables whose rows are all data (headers are
/// reconstructed later by the normalizer) and whose `content_hash` is
/// unset. The normalizer is the only mutator; after deduplication the
/// table is frozen.
#[derive(Debug, Clone)]
pub struct Table {
    /// 1-based page the table was detected on.
    pub page: u32,

    /// Strategy that produced this candidate.
    pub strategy: Strategy,

    /// Header cells, one per column. Empty until reconstruction.
    pub columns: Vec<String>,

    /// Data rows. Every row has `columns.len()` cells.
    pub rows: Vec<Vec<String>>,

    /// Stable content hash, assigned by the normalizer.
    pub content_hash: Option<String>,
}

impl Table {
    /// Builds a table from raw extractor rows, padding ragged rows so the
    /// grid is rectangular. Headers start empty; the normalizer fills them.
    pub fn from_rows(page: u32, strategy: Strategy, rows: Vec<Vec<String>>) -> Self {
        let width = rows.iter().map(|r| r.len()).max().unwrap_or(0);
        let rows = rows
            .into_iter()
            .map(|mut r| {
                r.resize(width, String::new());
                r
            })
            .collect();

        Self {
            page,
            strategy,
            columns: vec![String::new(); width],
            rows,
            content_hash: None,
        }
    }

    /// Number of columns.
    pub fn width(&self) -> usize {
        self.columns.len()
    }

    /// Number of data rows.
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Checks the rectangularity invariant.
    pub fn is_rectangular(&self) -> bool {
        self.rows.iter().all(|r| r.len() == self.columns.len())
    }

    /// Canonical textual serialization: headers joined with U+001F, each
    /// data row joined with U+001F, lines joined with U+001E. Two tables
    /// with identical normalized content serialize identically regardless
    /// of page, strategy, or cosmetic whitespace.
    pub fn canonical_text(&self) -> String {
        let mut lines = Vec::with_capacity(self.rows.len() + 1);
        lines.push(self.columns.join(CELL_SEP));
        for row in &self.rows {
            lines.push(row.join(CELL_SEP));
        }
        lines.join(ROW_SEP)
    }

    /// Computes the SHA-256 content hash over the canonical serialization.
    pub fn compute_hash(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.canonical_text().as_bytes());
        let digest = hasher.finalize();
        digest.iter().map(|b| format!("{:02x}", b)).collect()
    }

    /// Stable document identifier: `p{page:03}_t{ordinal:03}_{hash8}`.
    ///
    /// `ordinal` is the 1-based position of the table within its page in
    /// final merge order. Returns `None` until the hash is assigned.
    pub fn table_id(&self, ordinal: usize) -> Option<String> {
        let hash = self.content_hash.as_deref()?;
        let hash8 = &hash[..hash.len().min(8)];
        Some(format!("p{:03}_t{:03}_{}", self.page, ordinal, hash8))
    }
}
