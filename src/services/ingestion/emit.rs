//! Document emission for surviving tables.
//!
//! Every table yields a markdown snapshot (recall safety net). Tables
//! whose first column holds entity-like values additionally yield one
//! key-value document per data row, which is what makes row-precise
//! retrieval work.

#![allow(dead_code)]

use crate::models::{DocFormat, Document, DocumentMetadata, Table};

use super::normalize::is_numericish;

/// Fraction of first-column cells that must be non-empty, non-numeric
/// text for the column to count as an entity column.
const ENTITY_THRESHOLD: f64 = 0.7;

/// Emits documents for one table: snapshot first, then row documents in
/// row order. `ordinal` is the table's 1-based position within its page.
pub fn emit_table(table: &Table, source: &str, ordinal: usize) -> Vec<Document> {
    let table_id = table
        .table_id(ordinal)
        .unwrap_or_else(|| format!("p{:03}_t{:03}_00000000", table.page, ordinal));

    let meta = |format: DocFormat| DocumentMetadata {
        source: source.to_string(),
        page: table.page,
        extractor: table.strategy.as_str().to_string(),
        table_id: Some(table_id.clone()),
        format,
        chunk: None,
        chunks_total: None,
    };

    let mut docs = vec![Document::new(
        render_markdown(table),
        meta(DocFormat::TableMd),
    )];

    if has_entity_column(table) {
        for row in &table.rows {
            let text = render_row_kv(&table.columns, row);
            if !text.is_empty() {
                docs.push(Document::new(text, meta(DocFormat::RowKv)));
            }
        }
    }

    docs
}

/// GitHub-style pipe table with the reconstructed headers.
pub fn render_markdown(table: &Table) -> String {
    let mut out = String::new();
    push_md_row(&mut out, &table.columns);
    out.push_str(&"| --- ".repeat(table.width()));
    out.push_str("|\n");
    for row in &table.rows {
        push_md_row(&mut out, row);
    }
    out
}

fn push_md_row(out: &mut String, cells: &[String]) {
    for cell in cells {
        out.push_str("| ");
        out.push_str(&cell.replace('|', "\\|"));
        out.push(' ');
    }
    out.push_str("|\n");
}

/// One `header: value` line per column, skipping pairs where either side
/// is empty.
pub fn render_row_kv(columns: &[String], row: &[String]) -> String {
    columns
        .iter()
        .zip(row)
        .filter(|(header, value)| !header.is_empty() && !value.is_empty())
        .map(|(header, value)| format!("{}: {}", header, value))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Entity-likeness gate: at least 70% of first-column data cells are
/// non-empty, non-numeric text. Fully numeric first columns would yield
/// useless key-value pairs with numeric keys.
pub fn has_entity_column(table: &Table) -> bool {
    if table.width() == 0 || table.rows.is_empty() {
        return false;
    }
    let textlike = table
        .rows
        .iter()
        .filter(|row| !row[0].is_empty() && !is_numericish(&row[0]))
        .count();
    textlike as f64 >= ENTITY_THRESHOLD * table.rows.len() as f64
}
