//! Text-box grouping (plumber) table detection.
//!
//! The fallback strategy for pages with neither ruled lines nor clean
//! column alignment: spans on a line are split into cells wherever the
//! horizontal gap is wide relative to the glyph size. Noisier than the
//! other strategies, which is why it ranks last in the merge order.

#![allow(dead_code)]

use anyhow::Result;

use crate::models::{Strategy, Table};

use super::super::config::IngestionConfig;
use super::super::pdf::{PageContent, TextSpan};
use super::TableStrategy;

/// Baseline proximity for grouping spans into lines.
const LINE_TOL: f64 = 3.0;

/// Gap wider than this many average glyph widths starts a new cell.
const GAP_FACTOR: f64 = 2.5;

/// Detects tables by grouping text boxes.
pub struct PlumberStrategy;

impl PlumberStrategy {
    pub fn new(_config: &IngestionConfig) -> Self {
        Self
    }

    fn detect(&self, page: &PageContent) -> Vec<Table> {
        let mut spans: Vec<&TextSpan> = page.spans.iter().collect();
        spans.sort_by(|a, b| b.y.total_cmp(&a.y).then(a.x.total_cmp(&b.x)));

        // Group into lines.
        let mut lines: Vec<Vec<&TextSpan>> = Vec::new();
        let mut line_y = f64::MAX;
        for span in spans {
            if let Some(line) = lines.last_mut() {
                if (line_y - span.y).abs() <= LINE_TOL {
                    line.push(span);
                    continue;
                }
            }
            line_y = span.y;
            lines.push(vec![span]);
        }

        // Split each line into cells on wide gaps.
        let rows: Vec<Vec<String>> = lines.iter().map(|line| split_cells(line)).collect();

        // Contiguous runs of multi-cell rows form candidate tables.
        let mut tables = Vec::new();
        let mut block: Vec<Vec<String>> = Vec::new();
        for row in rows {
            if row.len() >= 2 {
                block.push(row);
            } else if !block.is_empty() {
                tables.push(Table::from_rows(page.number, Strategy::Plumber, std::mem::take(&mut block)));
            }
        }
        if !block.is_empty() {
            tables.push(Table::from_rows(page.number, Strategy::Plumber, block));
        }
        tables
    }
}

impl TableStrategy for PlumberStrategy {
    fn strategy(&self) -> Strategy {
        Strategy::Plumber
    }

    fn extract(&self, pages: &[PageContent]) -> Result<Vec<Table>> {
        Ok(pages.iter().flat_map(|p| self.detect(p)).collect())
    }
}

/// Splits one line of spans into cell strings on wide horizontal gaps.
fn split_cells(line: &[&TextSpan]) -> Vec<String> {
    let glyphs: usize = line.iter().map(|s| s.text.chars().count()).sum();
    let total_width: f64 = line.iter().map(|s| s.width).sum();
    let avg_glyph = if glyphs > 0 {
        total_width / glyphs as f64
    } else {
        1.0
    };
    let gap_threshold = GAP_FACTOR * avg_glyph.max(1.0);

    let mut cells: Vec<String> = Vec::new();
    let mut current = String::new();
    let mut prev_end: Option<f64> = None;
    for span in line {
        let starts_new_cell = match prev_end {
            Some(end) => span.x - end > gap_threshold,
            None => false,
        };
        if starts_new_cell {
            cells.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(&span.text);
        prev_end = Some(span.x + span.width);
    }
    if !current.is_empty() {
        cells.push(current);
    }
    cells
}
