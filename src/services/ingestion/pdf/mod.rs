//! Low-level PDF page geometry.
//!
//! Walks each page's content stream once and exposes the two primitives
//! the table strategies consume: positioned text spans and axis-aligned
//! ruled lines. Coordinates are PDF user space (origin bottom-left, y
//! grows upward).

#![allow(dead_code)]

pub mod content;

use anyhow::{Context, Result};
use lopdf::Document;

use super::config::PageSelector;

/// A run of text shown at a known position.
#[derive(Debug, Clone)]
pub struct TextSpan {
    /// Decoded text.
    pub text: String,

    /// Left edge of the run.
    pub x: f64,

    /// Baseline of the run.
    pub y: f64,

    /// Estimated width of the run.
    pub width: f64,
}

impl TextSpan {
    /// Horizontal centre of the run.
    pub fn center_x(&self) -> f64 {
        self.x + self.width / 2.0
    }
}

/// An axis-aligned painted line segment, candidate table rule.
#[derive(Debug, Clone, Copy)]
pub struct RuleLine {
    pub x0: f64,
    pub y0: f64,
    pub x1: f64,
    pub y1: f64,
}

impl RuleLine {
    /// Horizontal within half a point.
    pub fn is_horizontal(&self) -> bool {
        (self.y1 - self.y0).abs() < 0.5
    }

    /// Vertical within half a point.
    pub fn is_vertical(&self) -> bool {
        (self.x1 - self.x0).abs() < 0.5
    }

    /// Euclidean length.
    pub fn length(&self) -> f64 {
        let dx = self.x1 - self.x0;
        let dy = self.y1 - self.y0;
        (dx * dx + dy * dy).sqrt()
    }
}

/// Everything the strategies need from one page.
#[derive(Debug, Clone)]
pub struct PageContent {
    /// 1-based page number.
    pub number: u32,

    /// Page width in points.
    pub width: f64,

    /// Page height in points.
    pub height: f64,

    /// Text runs in content-stream order.
    pub spans: Vec<TextSpan>,

    /// Axis-aligned painted segments.
    pub rules: Vec<RuleLine>,
}

/// Parses the selected pages of a PDF into geometry.
///
/// Pages named by the selector but absent from the document are ignored.
/// A page whose content stream fails to decode contributes an empty page
/// rather than failing the whole document.
pub fn parse_pages(data: &[u8], selector: &PageSelector) -> Result<Vec<PageContent>> {
    let doc = Document::load_mem(data).context("failed to parse PDF structure")?;

    let mut pages = Vec::new();
    for (number, page_id) in doc.get_pages() {
        if !selector.contains(number) {
            continue;
        }
        pages.push(content::interpret_page(&doc, number, page_id));
    }
    Ok(pages)
}
