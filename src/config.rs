//! Runtime configuration: which catalog backend to open and where

use crate::cli::StoreArgs;
use crate::store::{seed_if_empty, MemoryStore, SharedStore, SqliteStore};
use anyhow::{Context, Result};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

pub const DEFAULT_BIND: &str = "127.0.0.1:5000";

const APP_DIR: &str = "codefinder";
const DATABASE_FILE: &str = "catalog.db";

/// Storage backend type
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum Backend {
    /// Process-local catalog, lost on exit
    Memory,
    /// SQLite database file
    Sqlite,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub backend: Backend,
    pub database: PathBuf,
    /// Load the sample catalog when the store is empty
    pub seed: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            backend: Backend::Memory,
            database: default_database_path(),
            seed: true,
        }
    }
}

impl Config {
    pub fn from_args(args: &StoreArgs) -> Self {
        Self {
            backend: args.backend,
            database: args.database.clone().unwrap_or_else(default_database_path),
            seed: !args.no_seed,
        }
    }
}

/// `<data dir>/codefinder/catalog.db`, or the working directory when the
/// platform has no data dir
pub fn default_database_path() -> PathBuf {
    dirs::data_dir()
        .map(|d| d.join(APP_DIR))
        .unwrap_or_else(|| PathBuf::from("."))
        .join(DATABASE_FILE)
}

/// Open the configured backend, seeding it if requested
pub fn open_store(config: &Config) -> Result<SharedStore> {
    let store: SharedStore = match config.backend {
        Backend::Memory => {
            info!("Using in-memory catalog");
            Arc::new(MemoryStore::new())
        }
        Backend::Sqlite => {
            info!("Using SQLite catalog at {}", config.database.display());
            let store = SqliteStore::open(&config.database).with_context(|| {
                format!("Failed to open database {}", config.database.display())
            })?;
            Arc::new(store)
        }
    };

    if config.seed {
        seed_if_empty(store.as_ref()).context("Failed to seed catalog")?;
    }
    Ok(store)
}
