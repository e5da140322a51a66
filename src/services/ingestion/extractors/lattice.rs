//! Ruled-line (lattice) table detection.
//!
//! Works on tables delimited by explicit ruled lines: clustered
//! horizontal and vertical rules form a grid, and text spans are binned
//! into the grid cells by their position.

#![allow(dead_code)]

use anyhow::Result;

use crate::models::{Strategy, Table};

use super::super::config::IngestionConfig;
use super::super::pdf::PageContent;
use super::{cluster_positions, TableStrategy};

/// Tolerance when clustering rule coordinates into grid boundaries.
const BOUNDARY_TOL: f64 = 2.0;

/// Detects tables from ruled-line grids.
pub struct LatticeStrategy {
    /// Page-dimension divisor giving the minimum rule length; larger
    /// values detect finer lines.
    line_scale: u32,
}

impl LatticeStrategy {
    pub fn new(config: &IngestionConfig) -> Self {
        Self {
            line_scale: config.lattice_line_scale.max(1),
        }
    }

    fn detect(&self, page: &PageContent) -> Option<Table> {
        let min_h = page.width / self.line_scale as f64;
        let min_v = page.height / self.line_scale as f64;

        let h_ys: Vec<f64> = page
            .rules
            .iter()
            .filter(|r| r.is_horizontal() && r.length() >= min_h)
            .map(|r| (r.y0 + r.y1) / 2.0)
            .collect();
        let v_xs: Vec<f64> = page
            .rules
            .iter()
            .filter(|r| r.is_vertical() && r.length() >= min_v)
            .map(|r| (r.x0 + r.x1) / 2.0)
            .collect();

        let mut ys = cluster_positions(h_ys, BOUNDARY_TOL);
        let xs = cluster_positions(v_xs, BOUNDARY_TOL);

        // A grid of at least 2x2 cells needs 3 boundaries per axis.
        if ys.len() < 3 || xs.len() < 3 {
            return None;
        }
        // Rows read top to bottom: descending y.
        ys.reverse();

        let n_rows = ys.len() - 1;
        let n_cols = xs.len() - 1;
        let mut cells: Vec<Vec<Vec<&str>>> = vec![vec![Vec::new(); n_cols]; n_rows];

        let mut spans: Vec<_> = page.spans.iter().collect();
        spans.sort_by(|a, b| b.y.total_cmp(&a.y).then(a.x.total_cmp(&b.x)));

        for span in spans {
            let row = ys.windows(2).position(|w| span.y <= w[0] && span.y > w[1]);
            let col = xs
                .windows(2)
                .position(|w| span.center_x() >= w[0] && span.center_x() < w[1]);
            if let (Some(row), Some(col)) = (row, col) {
                cells[row][col].push(span.text.as_str());
            }
        }

        let rows: Vec<Vec<String>> = cells
            .into_iter()
            .map(|row| row.into_iter().map(|parts| parts.join(" ")).collect())
            .collect();

        Some(Table::from_rows(page.number, Strategy::Lattice, rows))
    }
}

impl TableStrategy for LatticeStrategy {
    fn strategy(&self) -> Strategy {
        Strategy::Lattice
    }

    fn extract(&self, pages: &[PageContent]) -> Result<Vec<Table>> {
        Ok(pages.iter().filter_map(|p| self.detect(p)).collect())
    }
}
