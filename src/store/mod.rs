//! Catalog store: code records and the search history log
//!
//! Two interchangeable backends implement [`CatalogStore`]: an in-process
//! [`MemoryStore`] and a SQLite-backed [`SqliteStore`]. Both hand their
//! candidates to the same [`SearchEngine`](crate::search::SearchEngine) so scoring never diverges between
//! them.

pub mod memory;
pub mod seed;
pub mod sqlite;

pub use memory::MemoryStore;
pub use seed::seed_if_empty;
pub use sqlite::SqliteStore;

use crate::model::{
    CodeRecord, CodeType, MatchResult, NewCodeRecord, NewSearchHistory, SearchHistoryEntry,
};
use std::collections::BTreeMap;
use std::sync::Arc;
use thiserror::Error;

/// Number of history entries returned when no limit is given
pub const DEFAULT_HISTORY_LIMIT: usize = 10;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Store lock poisoned")]
    Poisoned,
    #[error("Corrupt row: {0}")]
    Corrupt(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Store handle shared between request handlers
pub type SharedStore = Arc<dyn CatalogStore>;

/// Read/write access to the code catalog and search history
///
/// Reads return records in insertion order; ranking ties depend on it.
pub trait CatalogStore: Send + Sync {
    fn get_code(&self, id: &str) -> StoreResult<Option<CodeRecord>>;

    fn get_all_codes(&self) -> StoreResult<Vec<CodeRecord>>;

    fn get_codes_by_type(&self, code_type: CodeType) -> StoreResult<Vec<CodeRecord>>;

    fn create_code(&self, code: NewCodeRecord) -> StoreResult<CodeRecord>;

    fn create_codes(&self, codes: Vec<NewCodeRecord>) -> StoreResult<Vec<CodeRecord>>;

    fn create_search_history(&self, entry: NewSearchHistory) -> StoreResult<SearchHistoryEntry>;

    /// Most recent entries first
    fn recent_search_history(&self, limit: usize) -> StoreResult<Vec<SearchHistoryEntry>>;

    /// Record count per code type; types with no records are absent
    fn code_type_stats(&self) -> StoreResult<BTreeMap<CodeType, usize>>;

    /// Fetch candidates and rank them against `query`
    fn search_codes(
        &self,
        query: &str,
        code_type: Option<CodeType>,
    ) -> StoreResult<Vec<MatchResult>> {
        let candidates = match code_type {
            Some(t) => self.get_codes_by_type(t)?,
            None => self.get_all_codes()?,
        };
        Ok(crate::search::rank(query, &candidates, code_type))
    }
}

/// Shared behaviour checks run against every backend
#[cfg(test)]
pub(crate) mod contract {
    use super::*;
    use crate::model::{MatchType, SearchKind};

    pub fn sample() -> Vec<NewCodeRecord> {
        vec![
            NewCodeRecord::new(
                CodeType::Icd10,
                "E11.9",
                "Type 2 diabetes mellitus without complications",
            )
            .with_synonyms(["T2DM", "NIDDM"])
            .with_category("Endocrine Disorders"),
            NewCodeRecord::new(CodeType::Icd9, "250.00", "Diabetes mellitus without mention of complication")
                .with_synonyms(["DM", "Diabetes"]),
            NewCodeRecord::new(CodeType::Icd10, "I10", "Essential hypertension")
                .with_synonyms(["High blood pressure", "HTN"]),
        ]
    }

    pub fn check_insert_and_read(store: &dyn CatalogStore) {
        let created = store.create_codes(sample()).unwrap();
        assert_eq!(created.len(), 3);
        assert_eq!(created[0].created_at, created[0].updated_at);

        let all = store.get_all_codes().unwrap();
        let codes: Vec<&str> = all.iter().map(|c| c.code.as_str()).collect();
        assert_eq!(codes, vec!["E11.9", "250.00", "I10"]);
        assert_eq!(all[0].synonyms, vec!["T2DM", "NIDDM"]);
        assert_eq!(all[0].category.as_deref(), Some("Endocrine Disorders"));
        assert_eq!(all[1].category, None);

        let icd10 = store.get_codes_by_type(CodeType::Icd10).unwrap();
        let codes: Vec<&str> = icd10.iter().map(|c| c.code.as_str()).collect();
        assert_eq!(codes, vec!["E11.9", "I10"]);

        let found = store.get_code(&created[1].id).unwrap().unwrap();
        assert_eq!(found, created[1]);
        assert!(store.get_code("missing").unwrap().is_none());
    }

    pub fn check_search(store: &dyn CatalogStore) {
        store.create_codes(sample()).unwrap();

        let results = store.search_codes("e11.9", None).unwrap();
        assert_eq!(results[0].record.code, "E11.9");
        assert_eq!(results[0].match_score, 100);

        let results = store.search_codes("diabetes", None).unwrap();
        assert_eq!(results[0].record.code, "250.00");
        assert_eq!(results[0].match_type, MatchType::Synonym);
        assert_eq!(results[1].record.code, "E11.9");

        let results = store.search_codes("diabetes", Some(CodeType::Icd10)).unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].record.code, "E11.9");

        assert!(store.search_codes("zzz", None).unwrap().is_empty());
    }

    pub fn check_history_and_stats(store: &dyn CatalogStore) {
        store.create_codes(sample()).unwrap();
        for (i, query) in ["first", "second", "third"].into_iter().enumerate() {
            store
                .create_search_history(NewSearchHistory {
                    query: query.to_string(),
                    results_count: i,
                    search_type: SearchKind::Description,
                })
                .unwrap();
        }

        let recent = store.recent_search_history(2).unwrap();
        let queries: Vec<&str> = recent.iter().map(|h| h.query.as_str()).collect();
        assert_eq!(queries, vec!["third", "second"]);
        assert_eq!(recent[0].results_count, 2);

        let stats = store.code_type_stats().unwrap();
        assert_eq!(stats.get(&CodeType::Icd10), Some(&2));
        assert_eq!(stats.get(&CodeType::Icd9), Some(&1));
        assert_eq!(stats.get(&CodeType::Cpt), None);
    }
}
