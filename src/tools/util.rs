//! Utility functions for tools

use crate::error::AppError;
use crate::store::{CatalogStore, SharedStore, StoreResult};

/// Run a store operation on the blocking thread pool
///
/// Both backends do synchronous work (lock waits, SQLite I/O), so async
/// callers never touch the store directly.
pub async fn with_store<T, F>(store: &SharedStore, op: F) -> Result<T, AppError>
where
    T: Send + 'static,
    F: FnOnce(&dyn CatalogStore) -> StoreResult<T> + Send + 'static,
{
    let store = store.clone();
    let result = tokio::task::spawn_blocking(move || op(store.as_ref())).await?;
    Ok(result?)
}
