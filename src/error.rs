//! Error types and handling for the code catalog

use crate::store::StoreError;
use serde::Serialize;
use std::fmt;

/// Application error types
#[derive(Debug, Serialize)]
pub enum AppError {
    InvalidInput(String),
    NotFound(String),
    Storage(String),
    CsvParse(String),
    Timeout(String),
    Internal(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::InvalidInput(msg) => write!(f, "Invalid input: {}", msg),
            AppError::NotFound(msg) => write!(f, "Not found: {}", msg),
            AppError::Storage(msg) => write!(f, "Storage error: {}", msg),
            AppError::CsvParse(msg) => write!(f, "CSV parse failed: {}", msg),
            AppError::Timeout(msg) => write!(f, "Timed out: {}", msg),
            AppError::Internal(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for AppError {}

impl AppError {
    /// Stable machine-readable code for API responses
    pub fn error_code(&self) -> &'static str {
        match self {
            AppError::InvalidInput(_) => "invalid_input",
            AppError::NotFound(_) => "not_found",
            AppError::Storage(_) => "storage_error",
            AppError::CsvParse(_) => "csv_parse_failed",
            AppError::Timeout(_) => "timeout",
            AppError::Internal(_) => "internal_error",
        }
    }

    /// Get the error message
    pub fn message(&self) -> String {
        self.to_string()
    }

    /// Message without the category prefix, as shown to API clients
    pub fn detail(&self) -> &str {
        match self {
            AppError::InvalidInput(msg)
            | AppError::NotFound(msg)
            | AppError::Storage(msg)
            | AppError::CsvParse(msg)
            | AppError::Timeout(msg)
            | AppError::Internal(msg) => msg,
        }
    }

    /// Process exit code for CLI mode
    pub fn exit_code(&self) -> i32 {
        match self {
            AppError::InvalidInput(_) | AppError::CsvParse(_) => 1,
            AppError::NotFound(_) => 3,
            AppError::Timeout(_) => 4,
            AppError::Storage(_) | AppError::Internal(_) => 5,
        }
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::Internal(err.to_string())
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        AppError::Storage(err.to_string())
    }
}

impl From<csv::Error> for AppError {
    fn from(err: csv::Error) -> Self {
        AppError::CsvParse(err.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Internal(err.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::Internal(err.to_string())
    }
}

impl From<tokio::task::JoinError> for AppError {
    fn from(err: tokio::task::JoinError) -> Self {
        AppError::Internal(format!("Background task failed: {}", err))
    }
}

/// Validate a search query, returning it trimmed
pub fn validate_query(query: &str) -> Result<&str, AppError> {
    let trimmed = query.trim();
    if trimmed.is_empty() {
        return Err(AppError::InvalidInput("Query is required".to_string()));
    }

    Ok(trimmed)
}
