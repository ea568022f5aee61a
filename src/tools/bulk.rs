//! Bulk search over many queries at once

use super::util::with_store;
use crate::error::AppError;
use crate::model::{MatchResult, NewSearchHistory, SearchKind};
use crate::search::SearchEngine;
use crate::store::SharedStore;
use serde::Serialize;
use tracing::info;

/// Results kept per query in a bulk report
pub const BULK_RESULTS_PER_QUERY: usize = 5;

#[derive(Debug, Clone, Serialize)]
pub struct BulkQueryResult {
    pub query: String,
    /// Best matches, at most [`BULK_RESULTS_PER_QUERY`]
    pub results: Vec<MatchResult>,
    /// Total number of matches before truncation
    pub count: usize,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkSearchReport {
    pub searches: Vec<BulkQueryResult>,
    pub total_queries: usize,
    pub total_results: usize,
}

/// Rank every query against the whole catalog, in submission order
pub async fn execute_bulk_search(
    store: &SharedStore,
    queries: Vec<String>,
) -> Result<BulkSearchReport, AppError> {
    let queries: Vec<String> = queries
        .into_iter()
        .map(|q| q.trim().to_string())
        .filter(|q| !q.is_empty())
        .collect();
    if queries.is_empty() {
        return Err(AppError::InvalidInput(
            "No valid queries found in CSV file".to_string(),
        ));
    }

    let candidates = with_store(store, |s| s.get_all_codes()).await?;

    let searches = tokio::task::spawn_blocking(move || {
        let engine = SearchEngine::new();
        queries
            .into_iter()
            .map(|query| {
                let mut results = engine.rank(&query, &candidates, None);
                let count = results.len();
                results.truncate(BULK_RESULTS_PER_QUERY);
                BulkQueryResult {
                    query,
                    results,
                    count,
                }
            })
            .collect::<Vec<_>>()
    })
    .await?;

    let total_queries = searches.len();
    let total_results: usize = searches.iter().map(|s| s.count).sum();
    info!(
        "Bulk search: {} queries, {} total matches",
        total_queries, total_results
    );

    with_store(store, move |s| {
        s.create_search_history(NewSearchHistory {
            query: format!("Bulk search: {} queries", total_queries),
            results_count: total_results,
            search_type: SearchKind::Bulk,
        })
    })
    .await?;

    Ok(BulkSearchReport {
        searches,
        total_queries,
        total_results,
    })
}
