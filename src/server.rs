//! HTTP API
//!
//! JSON endpoints over the shared catalog store. Every handler delegates to
//! the `tools` layer so the CLI and the API share validation and history
//! logging.

use crate::error::AppError;
use crate::model::{CodeRecord, CodeType, SearchHistoryEntry};
use crate::store::SharedStore;
use crate::tools::bulk::{execute_bulk_search, BulkSearchReport};
use crate::tools::catalog::{self, StatsReport};
use crate::tools::import::execute_import;
use crate::tools::search::{execute_search, SearchOutcome};
use axum::extract::rejection::JsonRejection;
use axum::extract::{DefaultBodyLimit, Multipart, Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::net::SocketAddr;
use tower_http::trace::TraceLayer;
use tracing::{debug, error, info};

/// Largest accepted request body (CSV uploads included)
pub const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        debug!(code = self.error_code(), "{}", self);
        let status = match &self {
            AppError::InvalidInput(_) | AppError::CsvParse(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
            AppError::Storage(_) | AppError::Internal(_) => {
                error!("Request failed: {}", self);
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        (status, Json(json!({ "message": self.detail() }))).into_response()
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchRequest {
    query: Option<String>,
    code_type: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CodesQuery {
    code_type: Option<String>,
}

#[derive(Debug, Deserialize)]
struct HistoryQuery {
    limit: Option<String>,
}

#[derive(Debug, Serialize)]
struct UploadResponse {
    message: String,
    count: usize,
}

/// Blank or absent means "all code types"
fn parse_code_type(raw: Option<&str>) -> Result<Option<CodeType>, AppError> {
    match raw.map(str::trim) {
        None | Some("") => Ok(None),
        Some(s) => s.parse().map(Some),
    }
}

pub fn router(store: SharedStore) -> Router {
    Router::new()
        .route("/api/search", post(search_handler))
        .route("/api/codes", get(codes_handler))
        .route("/api/codes/:id", get(code_handler))
        .route("/api/upload/data", post(upload_data_handler))
        .route("/api/upload/search", post(upload_search_handler))
        .route("/api/stats", get(stats_handler))
        .route("/api/history", get(history_handler))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .layer(TraceLayer::new_for_http())
        .with_state(store)
}

/// Bind and serve until Ctrl-C
pub async fn serve(store: SharedStore, addr: SocketAddr) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to bind {}: {}", addr, e))?;
    info!("codefinder API listening on http://{}", listener.local_addr()?);

    axum::serve(listener, router(store))
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("Shutting down");
        })
        .await?;
    Ok(())
}

async fn search_handler(
    State(store): State<SharedStore>,
    body: Result<Json<SearchRequest>, JsonRejection>,
) -> Result<Json<SearchOutcome>, AppError> {
    let Json(req) = body.map_err(|e| AppError::InvalidInput(e.body_text()))?;
    let query = req.query.unwrap_or_default();
    let code_type = parse_code_type(req.code_type.as_deref())?;
    Ok(Json(execute_search(&store, &query, code_type).await?))
}

async fn codes_handler(
    State(store): State<SharedStore>,
    Query(params): Query<CodesQuery>,
) -> Result<Json<Vec<CodeRecord>>, AppError> {
    let code_type = parse_code_type(params.code_type.as_deref())?;
    Ok(Json(catalog::list_codes(&store, code_type).await?))
}

async fn code_handler(
    State(store): State<SharedStore>,
    Path(id): Path<String>,
) -> Result<Json<CodeRecord>, AppError> {
    Ok(Json(catalog::get_code(&store, &id).await?))
}

/// Bytes of the multipart `file` field, which must be a `.csv`
async fn read_csv_upload(mut multipart: Multipart) -> Result<Vec<u8>, AppError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::InvalidInput(e.body_text()))?
    {
        if field.name() != Some("file") {
            continue;
        }

        let is_csv = field
            .file_name()
            .map(|name| name.to_ascii_lowercase().ends_with(".csv"))
            .unwrap_or(false);
        if !is_csv {
            return Err(AppError::InvalidInput(
                "Only CSV files are allowed".to_string(),
            ));
        }

        let bytes = field
            .bytes()
            .await
            .map_err(|e| AppError::InvalidInput(e.body_text()))?;
        return Ok(bytes.to_vec());
    }

    Err(AppError::InvalidInput("No file uploaded".to_string()))
}

async fn upload_data_handler(
    State(store): State<SharedStore>,
    multipart: Multipart,
) -> Result<Json<UploadResponse>, AppError> {
    let csv = read_csv_upload(multipart).await?;
    let report = execute_import(&store, csv).await?;
    Ok(Json(UploadResponse {
        message: report.message,
        count: report.count,
    }))
}

async fn upload_search_handler(
    State(store): State<SharedStore>,
    multipart: Multipart,
) -> Result<Json<BulkSearchReport>, AppError> {
    let csv = read_csv_upload(multipart).await?;
    let queries =
        tokio::task::spawn_blocking(move || crate::csv_io::parse_queries(csv.as_slice())).await??;
    Ok(Json(execute_bulk_search(&store, queries).await?))
}

async fn stats_handler(State(store): State<SharedStore>) -> Result<Json<StatsReport>, AppError> {
    Ok(Json(catalog::stats(&store).await?))
}

async fn history_handler(
    State(store): State<SharedStore>,
    Query(params): Query<HistoryQuery>,
) -> Result<Json<Vec<SearchHistoryEntry>>, AppError> {
    let limit = match params.limit.as_deref().map(str::trim) {
        None | Some("") => None,
        Some(raw) => Some(raw.parse::<usize>().map_err(|_| {
            AppError::InvalidInput(format!("Invalid limit: {}", raw))
        })?),
    };
    Ok(Json(catalog::recent_history(&store, limit).await?))
}
