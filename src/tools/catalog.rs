//! Catalog browsing: listing, lookup, statistics and search history

use super::util::with_store;
use crate::error::AppError;
use crate::model::{CodeRecord, CodeType, SearchHistoryEntry};
use crate::store::{SharedStore, DEFAULT_HISTORY_LIMIT};
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsReport {
    pub code_type_stats: BTreeMap<CodeType, usize>,
    pub total_codes: usize,
}

pub async fn list_codes(
    store: &SharedStore,
    code_type: Option<CodeType>,
) -> Result<Vec<CodeRecord>, AppError> {
    with_store(store, move |s| match code_type {
        Some(t) => s.get_codes_by_type(t),
        None => s.get_all_codes(),
    })
    .await
}

pub async fn get_code(store: &SharedStore, id: &str) -> Result<CodeRecord, AppError> {
    let id = id.to_string();
    with_store(store, move |s| s.get_code(&id))
        .await?
        .ok_or_else(|| AppError::NotFound("Code not found".to_string()))
}

pub async fn stats(store: &SharedStore) -> Result<StatsReport, AppError> {
    let code_type_stats = with_store(store, |s| s.code_type_stats()).await?;
    let total_codes = code_type_stats.values().sum();
    Ok(StatsReport {
        code_type_stats,
        total_codes,
    })
}

pub async fn recent_history(
    store: &SharedStore,
    limit: Option<usize>,
) -> Result<Vec<SearchHistoryEntry>, AppError> {
    let limit = limit.unwrap_or(DEFAULT_HISTORY_LIMIT);
    with_store(store, move |s| s.recent_search_history(limit)).await
}
