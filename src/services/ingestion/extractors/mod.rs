//! Table extraction strategies and their orchestration.
//!
//! Three independent strategies with complementary failure modes run
//! over the same parsed page geometry: `lattice` needs ruled lines,
//! `stream` needs whitespace alignment, `plumber` needs neither but is
//! noisier. None depends on another's output; a failing strategy just
//! contributes zero candidates. The merged candidate list is normalized,
//! sorted by `(page, strategy rank, content hash)` and deduplicated by
//! hash, so the higher-structure strategy wins ties.

#![allow(dead_code)]

pub mod lattice;
pub mod plumber;
pub mod stream;
pub mod text;

use std::collections::HashSet;
use std::sync::Arc;

use anyhow::Result;
use tokio::sync::Semaphore;
use tracing::{debug, warn};

use crate::models::{Strategy, Table};

use super::config::IngestionConfig;
use super::normalize::Normalizer;
use super::pdf::{self, PageContent};

/// A table extraction strategy. Implementations are synchronous and
/// CPU-bound; the orchestrator dispatches them onto the blocking pool.
pub trait TableStrategy: Send + Sync {
    /// Which strategy this is, for tagging and merge ranking.
    fn strategy(&self) -> Strategy;

    /// Detects candidate tables on the given pages. Returned tables are
    /// rectangular, page-tagged, strategy-tagged, hash unset.
    fn extract(&self, pages: &[PageContent]) -> Result<Vec<Table>>;
}

/// Builds the full strategy set in merge-rank order.
pub fn all_strategies(config: &IngestionConfig) -> Vec<Box<dyn TableStrategy>> {
    vec![
        Box::new(lattice::LatticeStrategy::new(config)),
        Box::new(stream::StreamStrategy::new(config)),
        Box::new(plumber::PlumberStrategy::new(config)),
    ]
}

/// Runs every strategy concurrently over the PDF and returns the merged,
/// normalized, deduplicated candidate list.
///
/// Returns an empty list (not an error) when the document cannot be
/// parsed, every strategy fails, or nothing survives the quality gate.
pub async fn extract_tables(data: &[u8], config: &IngestionConfig) -> Result<Vec<Table>> {
    let selector = config.page_selector()?;

    let pages = match pdf::parse_pages(data, &selector) {
        Ok(pages) => Arc::new(pages),
        Err(err) => {
            warn!("PDF parse failed, no table candidates: {:#}", err);
            return Ok(Vec::new());
        }
    };

    let semaphore = Arc::new(Semaphore::new(config.extractor_workers));
    let mut handles = Vec::new();
    for strategy in all_strategies(config) {
        let pages = Arc::clone(&pages);
        let semaphore = Arc::clone(&semaphore);
        handles.push(tokio::spawn(async move {
            let _permit = semaphore.acquire_owned().await;
            tokio::task::spawn_blocking(move || {
                let name = strategy.strategy();
                (name, strategy.extract(&pages))
            })
            .await
        }));
    }

    let mut candidates = Vec::new();
    for handle in handles {
        match handle.await {
            Ok(Ok((name, Ok(tables)))) => {
                debug!("{} produced {} candidate(s)", name, tables.len());
                candidates.extend(tables);
            }
            Ok(Ok((name, Err(err)))) => {
                warn!("{} strategy failed: {:#}", name, err);
            }
            Ok(Err(join_err)) | Err(join_err) => {
                warn!("extractor task aborted: {}", join_err);
            }
        }
    }

    let normalizer = Normalizer::new(config);
    Ok(finalize_candidates(candidates, &normalizer))
}

/// Normalizes raw candidates, sorts them into the canonical merge order,
/// and keeps the first occurrence of each content hash.
pub fn finalize_candidates(candidates: Vec<Table>, normalizer: &Normalizer) -> Vec<Table> {
    let mut tables: Vec<Table> = candidates
        .into_iter()
        .filter_map(|t| normalizer.normalize(t))
        .collect();

    tables.sort_by(|a, b| {
        (a.page, a.strategy.rank(), a.content_hash.as_deref())
            .cmp(&(b.page, b.strategy.rank(), b.content_hash.as_deref()))
    });

    let mut seen = HashSet::new();
    tables.retain(|t| match &t.content_hash {
        Some(hash) => seen.insert(hash.clone()),
        None => false,
    });
    tables
}

/// Clusters sorted 1-D positions: values within `tol` of the running
/// cluster mean collapse together. Returns cluster means in ascending
/// order.
pub(crate) fn cluster_positions(mut values: Vec<f64>, tol: f64) -> Vec<f64> {
    if values.is_empty() {
        return Vec::new();
    }
    values.sort_by(|a, b| a.total_cmp(b));

    let mut clusters = Vec::new();
    let mut sum = values[0];
    let mut count = 1usize;
    for &v in &values[1..] {
        let mean = sum / count as f64;
        if (v - mean).abs() <= tol {
            sum += v;
            count += 1;
        } else {
            clusters.push(mean);
            sum = v;
            count = 1;
        }
    }
    clusters.push(sum / count as f64);
    clusters
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate(page: u32, strategy: Strategy, rows: &[&[&str]]) -> Table {
        Table::from_rows(
            page,
            strategy,
            rows.iter()
                .map(|r| r.iter().map(|c| c.to_string()).collect())
                .collect(),
        )
    }

    fn country_rows() -> Vec<Vec<String>> {
        vec![
            vec!["Country".into(), "Price".into()],
            vec!["Argentine".into(), "0,27 €".into()],
            vec!["Brazil".into(), "0,19 €".into()],
        ]
    }

    #[test]
    fn test_cluster_positions() {
        let clusters = cluster_positions(vec![100.2, 99.8, 100.0, 250.0, 249.5], 2.0);
        assert_eq!(clusters.len(), 2);
        assert!((clusters[0] - 100.0).abs() < 0.5);
        assert!((clusters[1] - 249.75).abs() < 0.5);
    }

    #[test]
    fn test_cluster_positions_empty() {
        assert!(cluster_positions(vec![], 2.0).is_empty());
    }

    #[test]
    fn test_finalize_dedupes_across_strategies() {
        let normalizer = Normalizer::new(&IngestionConfig::default());

        let a = Table::from_rows(1, Strategy::Stream, country_rows());
        let b = Table::from_rows(1, Strategy::Lattice, country_rows());
        let out = finalize_candidates(vec![a, b], &normalizer);

        // Identical content: one survivor, and lattice outranks stream.
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].strategy, Strategy::Lattice);
    }

    #[test]
    fn test_finalize_sorts_by_page_then_rank() {
        let normalizer = Normalizer::new(&IngestionConfig::default());

        let p2 = candidate(
            2,
            Strategy::Lattice,
            &[&["Name", "Qty"], &["alpha", "1"], &["beta", "2"]],
        );
        let p1 = candidate(
            1,
            Strategy::Plumber,
            &[&["City", "Code"], &["Lyon", "69"], &["Nice", "06"]],
        );
        let out = finalize_candidates(vec![p2, p1], &normalizer);

        assert_eq!(out.len(), 2);
        assert_eq!(out[0].page, 1);
        assert_eq!(out[1].page, 2);
    }

    #[test]
    fn test_finalize_drops_gate_failures() {
        let normalizer = Normalizer::new(&IngestionConfig::default());
        let tiny = candidate(1, Strategy::Lattice, &[&["a", "b"]]);
        assert!(finalize_candidates(vec![tiny], &normalizer).is_empty());
    }

    #[tokio::test]
    async fn test_extract_tables_tolerates_garbage_bytes() {
        let config = IngestionConfig::default();
        let out = extract_tables(b"not a pdf at all", &config).await.unwrap();
        assert!(out.is_empty());
    }
}
