//! Bulk code import from CSV

use super::util::with_store;
use crate::csv_io::parse_code_rows;
use crate::error::AppError;
use crate::store::SharedStore;
use serde::Serialize;
use tracing::info;

#[derive(Debug, Clone, Serialize)]
pub struct ImportReport {
    pub message: String,
    pub count: usize,
    pub skipped: usize,
}

/// Parse CSV bytes and insert every valid row
pub async fn execute_import(store: &SharedStore, csv: Vec<u8>) -> Result<ImportReport, AppError> {
    let import = tokio::task::spawn_blocking(move || parse_code_rows(csv.as_slice())).await??;
    if import.codes.is_empty() {
        return Err(AppError::InvalidInput(
            "No valid codes found in CSV file".to_string(),
        ));
    }

    let skipped = import.skipped;
    let created = with_store(store, move |s| s.create_codes(import.codes)).await?;
    let count = created.len();
    info!("Imported {} codes ({} rows skipped)", count, skipped);

    Ok(ImportReport {
        message: format!("Successfully uploaded {} codes", count),
        count,
        skipped,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::CodeType;
    use crate::store::MemoryStore;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_import_inserts_valid_rows() {
        let store: SharedStore = Arc::new(MemoryStore::new());
        let csv = b"codeType,code,description,synonyms\nLOINC,2345-7,Glucose in Serum,Blood sugar\nBAD,1,x,\n".to_vec();

        let report = execute_import(&store, csv).await.unwrap();
        assert_eq!(report.count, 1);
        assert_eq!(report.skipped, 1);
        assert_eq!(report.message, "Successfully uploaded 1 codes");

        let codes = store.get_codes_by_type(CodeType::Loinc).unwrap();
        assert_eq!(codes[0].synonyms, vec!["Blood sugar"]);
    }

    #[tokio::test]
    async fn test_import_without_valid_rows_fails() {
        let store: SharedStore = Arc::new(MemoryStore::new());
        let err = execute_import(&store, b"codeType,code,description\n".to_vec())
            .await
            .unwrap_err();
        assert_eq!(err.detail(), "No valid codes found in CSV file");
        assert!(store.get_all_codes().unwrap().is_empty());
    }
}
