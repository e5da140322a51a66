//! Ingestion pipeline configuration.

#![allow(dead_code)]

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// Pages to hand to the table extractors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageSelector {
    /// Every page of the document.
    All,
    /// An explicit 1-based page set. Pages absent from the document are
    /// silently ignored.
    Pages(BTreeSet<u32>),
}

impl PageSelector {
    /// Parses `"all"` or a comma/range list such as `"1-5,8"`.
    pub fn parse(spec: &str) -> Result<Self, ConfigError> {
        let spec = spec.trim();
        if spec.is_empty() || spec.eq_ignore_ascii_case("all") {
            return Ok(Self::All);
        }

        let mut pages = BTreeSet::new();
        for part in spec.split(',') {
            let part = part.trim();
            if part.is_empty() {
                continue;
            }
            match part.split_once('-') {
                Some((lo, hi)) => {
                    let lo: u32 = lo
                        .trim()
                        .parse()
                        .map_err(|_| ConfigError::InvalidPageSelector(spec.to_string()))?;
                    let hi: u32 = hi
                        .trim()
                        .parse()
                        .map_err(|_| ConfigError::InvalidPageSelector(spec.to_string()))?;
                    if lo == 0 || hi < lo {
                        return Err(ConfigError::InvalidPageSelector(spec.to_string()));
                    }
                    pages.extend(lo..=hi);
                }
                None => {
                    let p: u32 = part
                        .parse()
                        .map_err(|_| ConfigError::InvalidPageSelector(spec.to_string()))?;
                    if p == 0 {
                        return Err(ConfigError::InvalidPageSelector(spec.to_string()));
                    }
                    pages.insert(p);
                }
            }
        }

        if pages.is_empty() {
            return Err(ConfigError::InvalidPageSelector(spec.to_string()));
        }
        Ok(Self::Pages(pages))
    }

    /// Whether a 1-based page number is selected.
    pub fn contains(&self, page: u32) -> bool {
        match self {
            Self::All => true,
            Self::Pages(set) => set.contains(&page),
        }
    }
}

/// Configuration for the ingestion pipeline.
///
/// All values are environment-driven with defaults; see `from_env`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestionConfig {
    /// Page selector string handed to the extractors (`PDF_PAGES`).
    pub pages: String,

    /// Chunker window size in characters (`MAX_DOC_CHARS`).
    pub max_doc_chars: usize,

    /// Chunker overlap in characters (`OVERLAP_CHARS`).
    pub overlap_chars: usize,

    /// Page cap for the text fallback (`MAX_TEXT_PAGES`).
    pub max_text_pages: usize,

    /// Header reconstruction depth (`MAX_HEADER_ROWS`).
    pub max_header_rows: usize,

    /// Quality gate: minimum data rows (`MIN_ROWS_FOR_TABLE`).
    pub min_rows: usize,

    /// Quality gate: minimum columns (`MIN_COLS_FOR_TABLE`).
    pub min_cols: usize,

    /// Concurrent extractor strategies (`EXTRACTOR_WORKERS`).
    pub extractor_workers: usize,

    /// Lattice tuning: rule length divisor (`CAMELOT_LATTICE_LINE_SCALE`).
    pub lattice_line_scale: u32,

    /// Stream tuning: block split gap in points (`CAMELOT_STREAM_EDGE_TOL`).
    pub stream_edge_tol: f64,

    /// Stream tuning: row grouping tolerance in points (`CAMELOT_STREAM_ROW_TOL`).
    pub stream_row_tol: f64,
}

impl Default for IngestionConfig {
    fn default() -> Self {
        Self {
            pages: "all".to_string(),
            max_doc_chars: 6000,
            overlap_chars: 800,
            max_text_pages: 200,
            max_header_rows: 4,
            min_rows: 2,
            min_cols: 2,
            extractor_workers: 3,
            lattice_line_scale: 40,
            stream_edge_tol: 200.0,
            stream_row_tol: 10.0,
        }
    }
}

impl IngestionConfig {
    /// Creates a configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder: set the page selector string.
    pub fn with_pages(mut self, pages: &str) -> Self {
        self.pages = pages.to_string();
        self
    }

    /// Builder: set the chunker window.
    pub fn with_max_doc_chars(mut self, chars: usize) -> Self {
        self.max_doc_chars = chars.max(1);
        self
    }

    /// Builder: set the chunker overlap.
    pub fn with_overlap_chars(mut self, chars: usize) -> Self {
        self.overlap_chars = chars;
        self
    }

    /// Builder: set the header reconstruction depth.
    pub fn with_max_header_rows(mut self, rows: usize) -> Self {
        self.max_header_rows = rows.max(1);
        self
    }

    /// Builder: set the quality gate minimums.
    pub fn with_min_table_shape(mut self, rows: usize, cols: usize) -> Self {
        self.min_rows = rows;
        self.min_cols = cols;
        self
    }

    /// Builder: set the extractor worker count.
    pub fn with_extractor_workers(mut self, workers: usize) -> Self {
        self.extractor_workers = workers.max(1);
        self
    }

    /// Creates configuration from environment variables. Unset or
    /// unparsable values keep their defaults.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(val) = std::env::var("PDF_PAGES") {
            if PageSelector::parse(&val).is_ok() {
                config.pages = val;
            }
        }
        if let Some(val) = env_parse("MAX_DOC_CHARS") {
            config.max_doc_chars = val;
        }
        if let Some(val) = env_parse("OVERLAP_CHARS") {
            config.overlap_chars = val;
        }
        if let Some(val) = env_parse("MAX_TEXT_PAGES") {
            config.max_text_pages = val;
        }
        if let Some(val) = env_parse("MAX_HEADER_ROWS") {
            config.max_header_rows = val;
        }
        if let Some(val) = env_parse("MIN_ROWS_FOR_TABLE") {
            config.min_rows = val;
        }
        if let Some(val) = env_parse("MIN_COLS_FOR_TABLE") {
            config.min_cols = val;
        }
        if let Some(val) = env_parse("EXTRACTOR_WORKERS") {
            config.extractor_workers = val;
        }
        if let Some(val) = env_parse::<u32>("CAMELOT_LATTICE_LINE_SCALE") {
            config.lattice_line_scale = val;
        }
        if let Some(val) = env_parse::<u32>("CAMELOT_STREAM_EDGE_TOL") {
            config.stream_edge_tol = val as f64;
        }
        if let Some(val) = env_parse::<u32>("CAMELOT_STREAM_ROW_TOL") {
            config.stream_row_tol = val as f64;
        }

        config
    }

    /// Parses the configured page selector.
    pub fn page_selector(&self) -> Result<PageSelector, ConfigError> {
        PageSelector::parse(&self.pages)
    }

    /// Validates cross-field constraints.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_doc_chars == 0 {
            return Err(ConfigError::ZeroWindow);
        }
        if self.overlap_chars >= self.max_doc_chars {
            return Err(ConfigError::OverlapTooLarge);
        }
        if self.extractor_workers == 0 {
            return Err(ConfigError::ZeroWorkers);
        }
        self.page_selector()?;
        Ok(())
    }
}

fn env_parse<T: std::str::FromStr>(name: &str) -> Option<T> {
    std::env::var(name).ok().and_then(|v| v.parse().ok())
}

/// Configuration errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    ZeroWindow,
    OverlapTooLarge,
    ZeroWorkers,
    InvalidPageSelector(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ZeroWindow => write!(f, "Chunk window must be at least 1 character"),
            Self::OverlapTooLarge => write!(f, "Chunk overlap must be less than the window size"),
            Self::ZeroWorkers => write!(f, "Extractor worker count must be at least 1"),
            Self::InvalidPageSelector(s) => write!(f, "Invalid page selector: {:?}", s),
        }
    }
}

impl std::error::Error for ConfigError {}
