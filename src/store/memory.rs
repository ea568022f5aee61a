//! In-process catalog backend

use super::{CatalogStore, StoreError, StoreResult};
use crate::model::{
    CodeRecord, CodeType, NewCodeRecord, NewSearchHistory, SearchHistoryEntry,
};
use chrono::Utc;
use std::collections::{BTreeMap, HashMap};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::debug;

#[derive(Default)]
struct Inner {
    /// Records in insertion order
    codes: Vec<CodeRecord>,
    /// id -> position in `codes`
    by_id: HashMap<String, usize>,
    history: Vec<SearchHistoryEntry>,
}

/// Catalog held entirely in memory; contents are lost on exit
#[derive(Default)]
pub struct MemoryStore {
    inner: RwLock<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> StoreResult<RwLockReadGuard<'_, Inner>> {
        self.inner.read().map_err(|_| StoreError::Poisoned)
    }

    fn write(&self) -> StoreResult<RwLockWriteGuard<'_, Inner>> {
        self.inner.write().map_err(|_| StoreError::Poisoned)
    }
}

impl Inner {
    fn insert(&mut self, code: NewCodeRecord) -> CodeRecord {
        let record = CodeRecord::from_new(code, Utc::now());
        self.by_id.insert(record.id.clone(), self.codes.len());
        self.codes.push(record.clone());
        record
    }
}

impl CatalogStore for MemoryStore {
    fn get_code(&self, id: &str) -> StoreResult<Option<CodeRecord>> {
        let inner = self.read()?;
        Ok(inner.by_id.get(id).map(|&idx| inner.codes[idx].clone()))
    }

    fn get_all_codes(&self) -> StoreResult<Vec<CodeRecord>> {
        Ok(self.read()?.codes.clone())
    }

    fn get_codes_by_type(&self, code_type: CodeType) -> StoreResult<Vec<CodeRecord>> {
        Ok(self
            .read()?
            .codes
            .iter()
            .filter(|c| c.code_type == code_type)
            .cloned()
            .collect())
    }

    fn create_code(&self, code: NewCodeRecord) -> StoreResult<CodeRecord> {
        Ok(self.write()?.insert(code))
    }

    fn create_codes(&self, codes: Vec<NewCodeRecord>) -> StoreResult<Vec<CodeRecord>> {
        let mut inner = self.write()?;
        let created: Vec<CodeRecord> = codes.into_iter().map(|c| inner.insert(c)).collect();
        debug!("Inserted {} codes into memory store", created.len());
        Ok(created)
    }

    fn create_search_history(&self, entry: NewSearchHistory) -> StoreResult<SearchHistoryEntry> {
        let entry = SearchHistoryEntry::from_new(entry, Utc::now());
        self.write()?.history.push(entry.clone());
        Ok(entry)
    }

    fn recent_search_history(&self, limit: usize) -> StoreResult<Vec<SearchHistoryEntry>> {
        let inner = self.read()?;
        let mut recent: Vec<SearchHistoryEntry> = inner.history.iter().rev().cloned().collect();
        recent.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        recent.truncate(limit);
        Ok(recent)
    }

    fn code_type_stats(&self) -> StoreResult<BTreeMap<CodeType, usize>> {
        let mut stats = BTreeMap::new();
        for code in &self.read()?.codes {
            *stats.entry(code.code_type).or_insert(0) += 1;
        }
        Ok(stats)
    }
}
