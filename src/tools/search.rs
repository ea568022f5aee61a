//! Single-query code search
//!
//! Validates the query, ranks the catalog, and logs the search to history.

use super::util::with_store;
use crate::error::{validate_query, AppError};
use crate::model::{CodeRecord, CodeType, MatchResult, NewSearchHistory, SearchKind};
use crate::search::similarity::{looks_like_code, similarity, tokenize};
use crate::store::SharedStore;
use serde::Serialize;
use tracing::debug;

/// Ranked results for one query
#[derive(Debug, Clone, Serialize)]
pub struct SearchOutcome {
    pub results: Vec<MatchResult>,
    pub total: usize,
}

/// History kind for a query: code-shaped input is logged as a code lookup
pub fn search_kind(query: &str) -> SearchKind {
    if looks_like_code(query) {
        SearchKind::Code
    } else {
        SearchKind::Description
    }
}

pub async fn execute_search(
    store: &SharedStore,
    query: &str,
    code_type: Option<CodeType>,
) -> Result<SearchOutcome, AppError> {
    let query = validate_query(query)?.to_string();
    let kind = search_kind(&query);

    let ranked_query = query.clone();
    let results = with_store(store, move |s| s.search_codes(&ranked_query, code_type)).await?;
    let total = results.len();
    debug!(
        "Search {:?} (type {:?}) matched {} codes",
        query, code_type, total
    );

    with_store(store, move |s| {
        s.create_search_history(NewSearchHistory {
            query,
            results_count: total,
            search_type: kind,
        })
    })
    .await?;

    Ok(SearchOutcome { results, total })
}

/// Minimum edit-distance similarity for a "did you mean" suggestion
pub const SUGGESTION_THRESHOLD: f64 = 0.75;

/// How close a record is to a mistyped query: the better of the code's
/// similarity and the mean best-token similarity of the description
fn closeness(query: &str, query_tokens: &[String], record: &CodeRecord) -> f64 {
    let code = similarity(query, &record.code.to_lowercase());
    if query_tokens.is_empty() {
        return code;
    }

    let description_tokens = tokenize(&record.description);
    let words = query_tokens
        .iter()
        .map(|q| {
            description_tokens
                .iter()
                .map(|d| similarity(q, d))
                .fold(0.0, f64::max)
        })
        .sum::<f64>()
        / query_tokens.len() as f64;

    code.max(words)
}

/// Catalog records spelled close to `query`, best first
///
/// Only consulted when a search comes back empty; it never changes ranking.
pub async fn suggest_codes(
    store: &SharedStore,
    query: &str,
    code_type: Option<CodeType>,
    limit: usize,
) -> Result<Vec<CodeRecord>, AppError> {
    let query = query.trim().to_lowercase();
    let candidates = with_store(store, move |s| match code_type {
        Some(t) => s.get_codes_by_type(t),
        None => s.get_all_codes(),
    })
    .await?;

    let query_tokens = tokenize(&query);
    let mut scored: Vec<(f64, CodeRecord)> = candidates
        .into_iter()
        .map(|record| (closeness(&query, &query_tokens, &record), record))
        .filter(|(score, _)| *score >= SUGGESTION_THRESHOLD)
        .collect();
    scored.sort_by(|a, b| b.0.total_cmp(&a.0));

    Ok(scored.into_iter().take(limit).map(|(_, r)| r).collect())
}
