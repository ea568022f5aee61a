//! SQLite catalog backend

use super::{CatalogStore, StoreError, StoreResult};
use crate::model::{
    CodeRecord, CodeType, NewCodeRecord, NewSearchHistory, SearchHistoryEntry, SearchKind,
};
use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;
use tracing::{debug, info};

const CODE_COLUMNS: &str =
    "id, code_type, code, description, synonyms, category, created_at, updated_at";

/// Catalog persisted in a SQLite database
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Open (or create) a database file and apply the schema
    pub fn open(path: &Path) -> StoreResult<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let conn = Connection::open(path)?;
        conn.busy_timeout(Duration::from_secs(5))?;
        info!("Opened catalog database: {}", path.display());
        Self::with_connection(conn)
    }

    /// Open a private in-memory database
    pub fn open_in_memory() -> StoreResult<Self> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> StoreResult<Self> {
        migrate(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn lock(&self) -> StoreResult<MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|_| StoreError::Poisoned)
    }
}

fn migrate(conn: &Connection) -> StoreResult<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS clinical_codes (
            id          TEXT PRIMARY KEY,
            code_type   TEXT NOT NULL,
            code        TEXT NOT NULL,
            description TEXT NOT NULL,
            synonyms    TEXT NOT NULL DEFAULT '[]',
            category    TEXT,
            created_at  TEXT NOT NULL,
            updated_at  TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_codes_type ON clinical_codes(code_type);

        CREATE TABLE IF NOT EXISTS search_history (
            id            TEXT PRIMARY KEY,
            query         TEXT NOT NULL,
            results_count INTEGER NOT NULL,
            search_type   TEXT NOT NULL,
            timestamp     TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_history_timestamp ON search_history(timestamp);
        ",
    )?;
    Ok(())
}

fn format_time(t: &DateTime<Utc>) -> String {
    // Fixed-width so text order matches time order
    t.to_rfc3339_opts(SecondsFormat::Nanos, true)
}

fn parse_time(s: &str) -> StoreResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| StoreError::Corrupt(format!("bad timestamp {:?}: {}", s, e)))
}

/// Column values as stored, before conversion to model types
struct CodeRow {
    id: String,
    code_type: String,
    code: String,
    description: String,
    synonyms: String,
    category: Option<String>,
    created_at: String,
    updated_at: String,
}

impl CodeRow {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            code_type: row.get(1)?,
            code: row.get(2)?,
            description: row.get(3)?,
            synonyms: row.get(4)?,
            category: row.get(5)?,
            created_at: row.get(6)?,
            updated_at: row.get(7)?,
        })
    }

    fn into_record(self) -> StoreResult<CodeRecord> {
        let code_type = self
            .code_type
            .parse::<CodeType>()
            .map_err(|e| StoreError::Corrupt(e.to_string()))?;
        Ok(CodeRecord {
            id: self.id,
            code_type,
            code: self.code,
            description: self.description,
            synonyms: serde_json::from_str(&self.synonyms)?,
            category: self.category,
            created_at: parse_time(&self.created_at)?,
            updated_at: parse_time(&self.updated_at)?,
        })
    }
}

fn insert_code(conn: &Connection, code: NewCodeRecord) -> StoreResult<CodeRecord> {
    let record = CodeRecord::from_new(code, Utc::now());
    conn.execute(
        "INSERT INTO clinical_codes (
            id, code_type, code, description, synonyms, category, created_at, updated_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        params![
            record.id,
            record.code_type.as_str(),
            record.code,
            record.description,
            serde_json::to_string(&record.synonyms)?,
            record.category,
            format_time(&record.created_at),
            format_time(&record.updated_at),
        ],
    )?;
    Ok(record)
}

fn query_codes(
    conn: &Connection,
    sql: &str,
    params: impl rusqlite::Params,
) -> StoreResult<Vec<CodeRecord>> {
    let mut stmt = conn.prepare(sql)?;
    let rows = stmt.query_map(params, CodeRow::from_row)?;
    let mut records = Vec::new();
    for row in rows {
        records.push(row?.into_record()?);
    }
    Ok(records)
}

impl CatalogStore for SqliteStore {
    fn get_code(&self, id: &str) -> StoreResult<Option<CodeRecord>> {
        let conn = self.lock()?;
        let row = conn
            .query_row(
                &format!("SELECT {} FROM clinical_codes WHERE id = ?1", CODE_COLUMNS),
                params![id],
                CodeRow::from_row,
            )
            .optional()?;
        row.map(CodeRow::into_record).transpose()
    }

    fn get_all_codes(&self) -> StoreResult<Vec<CodeRecord>> {
        let conn = self.lock()?;
        query_codes(
            &conn,
            &format!("SELECT {} FROM clinical_codes ORDER BY rowid", CODE_COLUMNS),
            params![],
        )
    }

    fn get_codes_by_type(&self, code_type: CodeType) -> StoreResult<Vec<CodeRecord>> {
        let conn = self.lock()?;
        query_codes(
            &conn,
            &format!(
                "SELECT {} FROM clinical_codes WHERE code_type = ?1 ORDER BY rowid",
                CODE_COLUMNS
            ),
            params![code_type.as_str()],
        )
    }

    fn create_code(&self, code: NewCodeRecord) -> StoreResult<CodeRecord> {
        let conn = self.lock()?;
        insert_code(&conn, code)
    }

    fn create_codes(&self, codes: Vec<NewCodeRecord>) -> StoreResult<Vec<CodeRecord>> {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;
        let mut created = Vec::with_capacity(codes.len());
        for code in codes {
            created.push(insert_code(&tx, code)?);
        }
        tx.commit()?;
        debug!("Inserted {} codes into SQLite store", created.len());
        Ok(created)
    }

    fn create_search_history(&self, entry: NewSearchHistory) -> StoreResult<SearchHistoryEntry> {
        let entry = SearchHistoryEntry::from_new(entry, Utc::now());
        let conn = self.lock()?;
        conn.execute(
            "INSERT INTO search_history (id, query, results_count, search_type, timestamp)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                entry.id,
                entry.query,
                entry.results_count as i64,
                entry.search_type.as_str(),
                format_time(&entry.timestamp),
            ],
        )?;
        Ok(entry)
    }

    fn recent_search_history(&self, limit: usize) -> StoreResult<Vec<SearchHistoryEntry>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(
            "SELECT id, query, results_count, search_type, timestamp
             FROM search_history
             ORDER BY timestamp DESC, rowid DESC
             LIMIT ?1",
        )?;
        let rows = stmt.query_map(params![limit as i64], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, i64>(2)?,
                row.get::<_, String>(3)?,
                row.get::<_, String>(4)?,
            ))
        })?;

        let mut entries = Vec::new();
        for row in rows {
            let (id, query, results_count, search_type, timestamp) = row?;
            entries.push(SearchHistoryEntry {
                id,
                query,
                results_count: results_count.max(0) as usize,
                search_type: search_type
                    .parse::<SearchKind>()
                    .map_err(|e| StoreError::Corrupt(e.to_string()))?,
                timestamp: parse_time(&timestamp)?,
            });
        }
        Ok(entries)
    }

    fn code_type_stats(&self) -> StoreResult<BTreeMap<CodeType, usize>> {
        let conn = self.lock()?;
        let mut stmt =
            conn.prepare("SELECT code_type, COUNT(*) FROM clinical_codes GROUP BY code_type")?;
        let rows = stmt.query_map(params![], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?))
        })?;

        let mut stats = BTreeMap::new();
        for row in rows {
            let (code_type, count) = row?;
            let code_type = code_type
                .parse::<CodeType>()
                .map_err(|e| StoreError::Corrupt(e.to_string()))?;
            stats.insert(code_type, count.max(0) as usize);
        }
        Ok(stats)
    }
}
