//! Whitespace-alignment (stream) table detection.
//!
//! Infers column seams from the alignment of span left edges across
//! lines. No ruled lines required; works on tables laid out with
//! consistent tab stops.

#![allow(dead_code)]

use anyhow::Result;

use crate::models::{Strategy, Table};

use super::super::config::IngestionConfig;
use super::super::pdf::{PageContent, TextSpan};
use super::{cluster_positions, TableStrategy};

/// Tolerance when clustering span left edges into column seams.
const SEAM_TOL: f64 = 5.0;

/// Detects tables from whitespace alignment.
pub struct StreamStrategy {
    /// Row grouping tolerance in points.
    row_tol: f64,
    /// Maximum vertical gap between rows of the same table block.
    edge_tol: f64,
}

impl StreamStrategy {
    pub fn new(config: &IngestionConfig) -> Self {
        Self {
            row_tol: config.stream_row_tol.max(0.1),
            edge_tol: config.stream_edge_tol.max(1.0),
        }
    }

    /// Groups spans into text lines by baseline proximity, top to bottom.
    fn group_lines<'a>(&self, page: &'a PageContent) -> Vec<Line<'a>> {
        let mut spans: Vec<&TextSpan> = page.spans.iter().collect();
        spans.sort_by(|a, b| b.y.total_cmp(&a.y).then(a.x.total_cmp(&b.x)));

        let mut lines: Vec<Line> = Vec::new();
        for span in spans {
            if let Some(line) = lines.last_mut() {
                if (line.y - span.y).abs() <= self.row_tol {
                    line.spans.push(span);
                    continue;
                }
            }
            lines.push(Line {
                y: span.y,
                spans: vec![span],
            });
        }
        lines
    }

    /// Splits lines into blocks separated by more than `edge_tol`.
    fn split_blocks<'a>(&self, lines: Vec<Line<'a>>) -> Vec<Vec<Line<'a>>> {
        let mut blocks: Vec<Vec<Line>> = Vec::new();
        for line in lines {
            if let Some(block) = blocks.last_mut() {
                let contiguous = block
                    .last()
                    .map_or(false, |prev| prev.y - line.y <= self.edge_tol);
                if contiguous {
                    block.push(line);
                    continue;
                }
            }
            blocks.push(vec![line]);
        }
        blocks
    }

    fn block_to_table(&self, page: u32, block: &[Line]) -> Option<Table> {
        // Column seams: left edges that repeat across lines.
        let lefts: Vec<f64> = block
            .iter()
            .flat_map(|l| l.spans.iter().map(|s| s.x))
            .collect();
        let seams: Vec<f64> = cluster_positions(lefts, SEAM_TOL)
            .into_iter()
            .filter(|&seam| {
                let members = block
                    .iter()
                    .flat_map(|l| l.spans.iter())
                    .filter(|s| (s.x - seam).abs() <= SEAM_TOL)
                    .count();
                members >= 2
            })
            .collect();
        if seams.len() < 2 {
            return None;
        }

        let rows: Vec<Vec<String>> = block
            .iter()
            .map(|line| {
                let mut cells = vec![Vec::new(); seams.len()];
                for span in &line.spans {
                    let col = nearest_seam(&seams, span.x);
                    cells[col].push(span.text.as_str());
                }
                cells.into_iter().map(|parts| parts.join(" ")).collect()
            })
            .collect();

        Some(Table::from_rows(page, Strategy::Stream, rows))
    }
}

impl TableStrategy for StreamStrategy {
    fn strategy(&self) -> Strategy {
        Strategy::Stream
    }

    fn extract(&self, pages: &[PageContent]) -> Result<Vec<Table>> {
        let mut tables = Vec::new();
        for page in pages {
            let lines = self.group_lines(page);
            for block in self.split_blocks(lines) {
                if let Some(table) = self.block_to_table(page.number, &block) {
                    tables.push(table);
                }
            }
        }
        Ok(tables)
    }
}

/// One text line: spans sharing a baseline.
struct Line<'a> {
    y: f64,
    spans: Vec<&'a TextSpan>,
}

fn nearest_seam(seams: &[f64], x: f64) -> usize {
    let mut best = 0;
    let mut best_dist = f64::MAX;
    for (i, &seam) in seams.iter().enumerate() {
        let dist = (x - seam).abs();
        if dist < best_dist {
            best = i;
            best_dist = dist;
        }
    }
    best
}
