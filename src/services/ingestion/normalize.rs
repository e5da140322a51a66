//! Table normalization: cell cleanup, multi-row header reconstruction,
//! quality gating, content hashing.
//!
//! The normalizer is deterministic and pure with respect to its input,
//! and idempotent: feeding a normalized table back through produces the
//! same table.

#![allow(dead_code)]

use crate::models::Table;

use super::config::IngestionConfig;

/// Joins stacked header cells vertically.
const HEADER_JOIN: &str = " | ";

/// Normalizes one cell: NBSP folded, tabs and newlines become single
/// spaces, whitespace runs collapse, ends trimmed. All other characters
/// (currency symbols, decimal commas) pass through.
pub fn clean_cell(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut pending_space = false;
    for c in raw.chars() {
        let c = if c == '\u{a0}' { ' ' } else { c };
        if c.is_whitespace() {
            pending_space = !out.is_empty();
        } else {
            if pending_space {
                out.push(' ');
                pending_space = false;
            }
            out.push(c);
        }
    }
    out
}

/// Whether a cell carries only numeric content: digits, spaces, decimal
/// separators, signs, currency/percent marks. Empty cells are not
/// numericish (they carry nothing at all).
pub fn is_numericish(cell: &str) -> bool {
    let cell = cell.trim();
    if cell.is_empty() {
        return false;
    }
    cell.chars().all(|c| {
        c.is_ascii_digit()
            || c == ' '
            || c == '.'
            || c == ','
            || c == '+'
            || c == '-'
            || matches!(c, '€' | '$' | '£' | '¥' | '%')
    })
}

/// Table normalizer configured with the pipeline thresholds.
pub struct Normalizer {
    max_header_rows: usize,
    min_rows: usize,
    min_cols: usize,
}

impl Normalizer {
    /// Creates a normalizer from the pipeline configuration.
    pub fn new(config: &IngestionConfig) -> Self {
        Self {
            max_header_rows: config.max_header_rows,
            min_rows: config.min_rows,
            min_cols: config.min_cols,
        }
    }

    /// Runs the full normalization pipeline on a raw candidate.
    ///
    /// Returns `None` when the table fails the quality gate: too few data
    /// rows or columns, or no cell with semantic (non-numeric) content.
    pub fn normalize(&self, mut table: Table) -> Option<Table> {
        for row in &mut table.rows {
            for cell in row.iter_mut() {
                *cell = clean_cell(cell);
            }
        }
        for col in &mut table.columns {
            *col = clean_cell(col);
        }

        drop_empty_columns(&mut table);
        table.rows.retain(|row| row.iter().any(|c| !c.is_empty()));

        // A table arriving with reconstructed headers is already past this
        // stage; re-running must not eat data rows.
        if table.columns.iter().all(|c| c.is_empty()) {
            self.rebuild_headers(&mut table);
        }

        for row in &mut table.rows {
            for cell in row.iter_mut() {
                *cell = clean_cell(cell);
            }
        }
        table.rows.retain(|row| row.iter().any(|c| !c.is_empty()));

        if table.row_count() < self.min_rows || table.width() < self.min_cols {
            return None;
        }
        let has_semantic_cell = table
            .rows
            .iter()
            .flatten()
            .any(|c| !c.is_empty() && !is_numericish(c));
        if !has_semantic_cell {
            return None;
        }

        table.content_hash = Some(table.compute_hash());
        Some(table)
    }

    /// Generic multi-row header reconstruction.
    ///
    /// Consumes the longest prefix of spanning rows (fewer distinct
    /// non-empty values than columns, or any empty cell) plus one terminal
    /// header row, bounded by the configured depth. Each consumed row is
    /// forward-filled so group headings cover their spanned columns, then
    /// the per-column cells are joined vertically.
    fn rebuild_headers(&self, table: &mut Table) {
        let width = table.width();
        if width == 0 || table.rows.is_empty() {
            return;
        }

        let limit = self.max_header_rows.min(table.rows.len());
        let mut depth = 0;
        while depth < limit && is_spanning_row(&table.rows[depth], width) {
            depth += 1;
        }
        if depth < limit {
            depth += 1;
        }

        let header_rows: Vec<Vec<String>> = table
            .rows
            .drain(..depth)
            .map(|row| forward_fill(&row))
            .collect();

        table.columns = (0..width)
            .map(|col| {
                let parts: Vec<&str> = header_rows
                    .iter()
                    .map(|row| row[col].as_str())
                    .filter(|v| !v.is_empty())
                    .collect();
                if parts.is_empty() {
                    format!("col_{}", col)
                } else {
                    parts.join(HEADER_JOIN)
                }
            })
            .collect();
    }
}

/// A spanning header row has merged-cell artifacts: blank cells, or the
/// same heading repeated across a column group.
fn is_spanning_row(row: &[String], width: usize) -> bool {
    if row.iter().any(|c| c.is_empty()) {
        return true;
    }
    let mut distinct: Vec<&str> = row.iter().map(|c| c.as_str()).collect();
    distinct.sort_unstable();
    distinct.dedup();
    distinct.len() < width
}

/// Carries the last non-empty cell rightward over blanks.
fn forward_fill(row: &[String]) -> Vec<String> {
    let mut filled = Vec::with_capacity(row.len());
    let mut last = String::new();
    for cell in row {
        if !cell.is_empty() {
            last = cell.clone();
        }
        filled.push(last.clone());
    }
    filled
}

/// Removes columns that are empty in the header and every row.
fn drop_empty_columns(table: &mut Table) {
    let width = table.width();
    let keep: Vec<bool> = (0..width)
        .map(|col| {
            !table.columns[col].is_empty() || table.rows.iter().any(|row| !row[col].is_empty())
        })
        .collect();

    if keep.iter().all(|k| *k) {
        return;
    }

    table.columns = filter_by(&table.columns, &keep);
    table.rows = table.rows.iter().map(|row| filter_by(row, &keep)).collect();
}

fn filter_by(cells: &[String], keep: &[bool]) -> Vec<String> {
    cells
        .iter()
        .zip(keep)
        .filter(|(_, k)| **k)
        .map(|(c, _)| c.clone())
        .collect()
}
