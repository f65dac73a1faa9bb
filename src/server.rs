//! HTTP API for uploads and item editing.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `GET`    | `/health` | Health check (returns version) |
//! | `POST`   | `/api/extract` | Multipart upload (`file` field); replaces the collection |
//! | `GET`    | `/api/items` | Current collection |
//! | `DELETE` | `/api/items` | Delete all items |
//! | `GET`    | `/api/items/export?format=json\|txt` | Download the collection |
//! | `PUT`    | `/api/items/{id}` | Update an item's text: `{ "text": "..." }` |
//! | `DELETE` | `/api/items/{id}` | Delete one item |
//!
//! # Error Contract
//!
//! ```json
//! { "error": { "code": "not_found", "message": "item not found: 7" } }
//! ```
//!
//! Error codes: `bad_request` (400), `no_items_found` (400),
//! `not_found` (404), `payload_too_large` (413),
//! `unsupported_media_type` (415), `extraction_failed` (422),
//! `internal` (500).
//!
//! # CORS
//!
//! All origins, methods, and headers are permitted so a browser dashboard
//! on another origin can call the API.

use std::sync::Arc;

use anyhow::Context;
use axum::{
    extract::{
        multipart::MultipartError, rejection::JsonRejection, DefaultBodyLimit, Multipart, Path,
        Query, State,
    },
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tower_http::cors::{Any, CorsLayer};

use crate::config::{Config, UploadConfig};
use crate::error::ItemError;
use crate::export::{self, ExportFormat};
use crate::extract::{self, ExtractError};
use crate::ingest::{ingest_document, IngestError};
use crate::models::{Collection, Item};
use crate::store::ItemStore;

/// Shared application state passed to all route handlers via Axum's `State` extractor.
#[derive(Clone)]
pub struct AppState {
    store: ItemStore,
    upload: Arc<UploadConfig>,
}

impl AppState {
    pub fn new(store: ItemStore, upload: UploadConfig) -> Self {
        Self {
            store,
            upload: Arc::new(upload),
        }
    }
}

/// Builds the router with CORS and the upload body limit applied.
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);
    let body_limit = DefaultBodyLimit::max(state.upload.max_bytes);

    Router::new()
        .route("/health", get(handle_health))
        .route("/api/extract", post(handle_extract))
        .route("/api/items", get(handle_read).delete(handle_delete_all))
        .route("/api/items/export", get(handle_export))
        .route(
            "/api/items/{id}",
            put(handle_update).delete(handle_delete_one),
        )
        .layer(body_limit)
        .layer(cors)
        .with_state(state)
}

/// Starts the HTTP server on `[server].bind` using the file-backed store.
///
/// Runs until Ctrl-C is received.
pub async fn run_server(config: &Config) -> anyhow::Result<()> {
    let state = AppState::new(ItemStore::open(config), config.upload.clone());
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(&config.server.bind)
        .await
        .with_context(|| format!("Failed to bind {}", config.server.bind))?;
    tracing::info!(
        bind = %config.server.bind,
        data = %config.storage.collection_path().display(),
        "item server listening"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    tracing::info!("item server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}

// ============ Error response ============

#[derive(Serialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Serialize)]
struct ErrorDetail {
    /// Machine-readable error code (e.g., `"bad_request"`, `"not_found"`).
    code: &'static str,
    message: String,
}

/// Internal error type that converts into an Axum HTTP response.
#[derive(Debug)]
struct AppError {
    status: StatusCode,
    code: &'static str,
    message: String,
}

impl AppError {
    fn new(status: StatusCode, code: &'static str, message: impl Into<String>) -> Self {
        Self {
            status,
            code,
            message: message.into(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: ErrorDetail {
                code: self.code,
                message: self.message,
            },
        };
        (self.status, Json(body)).into_response()
    }
}

fn bad_request(message: impl Into<String>) -> AppError {
    AppError::new(StatusCode::BAD_REQUEST, "bad_request", message)
}

fn unsupported_media_type(message: impl Into<String>) -> AppError {
    AppError::new(
        StatusCode::UNSUPPORTED_MEDIA_TYPE,
        "unsupported_media_type",
        message,
    )
}

impl From<ItemError> for AppError {
    fn from(err: ItemError) -> Self {
        match err {
            ItemError::NoItemsFound => {
                AppError::new(StatusCode::BAD_REQUEST, "no_items_found", err.to_string())
            }
            ItemError::ItemNotFound(_) => {
                AppError::new(StatusCode::NOT_FOUND, "not_found", err.to_string())
            }
            ItemError::InvalidInput(_) => bad_request(err.to_string()),
            ItemError::StorageUnavailable(_) => {
                tracing::error!(error = %err, "item storage failure");
                AppError::new(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal",
                    "item storage is unavailable",
                )
            }
        }
    }
}

impl From<IngestError> for AppError {
    fn from(err: IngestError) -> Self {
        match err {
            IngestError::Items(e) => e.into(),
            IngestError::Extract(e @ ExtractError::UnsupportedContentType(_)) => {
                unsupported_media_type(e.to_string())
            }
            IngestError::Extract(e) => AppError::new(
                StatusCode::UNPROCESSABLE_ENTITY,
                "extraction_failed",
                e.to_string(),
            ),
        }
    }
}

fn multipart_error(err: MultipartError) -> AppError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::new(
            StatusCode::PAYLOAD_TOO_LARGE,
            "payload_too_large",
            err.body_text(),
        )
    } else {
        bad_request(err.body_text())
    }
}

fn parse_id(raw: &str) -> Result<u64, AppError> {
    raw.parse::<u64>()
        .map_err(|_| bad_request(format!("invalid item id: {}", raw)))
}

// ============ GET /health ============

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

async fn handle_health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

// ============ POST /api/extract ============

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ExtractResponse {
    success: bool,
    source_name: Option<String>,
    total_items: usize,
    items: Vec<Item>,
}

/// The uploaded `file` field, fully buffered.
struct Upload {
    file_name: Option<String>,
    content_type: Option<String>,
    bytes: axum::body::Bytes,
}

async fn read_upload(multipart: &mut Multipart) -> Result<Option<Upload>, AppError> {
    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        if field.name() != Some("file") {
            continue;
        }
        let file_name = field.file_name().map(str::to_string);
        let content_type = field.content_type().map(str::to_string);
        let bytes = field.bytes().await.map_err(multipart_error)?;
        return Ok(Some(Upload {
            file_name,
            content_type,
            bytes,
        }));
    }
    Ok(None)
}

/// Handler for `POST /api/extract`.
///
/// Decodes the uploaded document, extracts numbered items and replaces the
/// stored collection. Rejected uploads leave the collection untouched.
async fn handle_extract(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<ExtractResponse>, AppError> {
    let upload = read_upload(&mut multipart)
        .await?
        .ok_or_else(|| bad_request("No file provided"))?;

    let content_type =
        extract::resolve_content_type(upload.content_type.as_deref(), upload.file_name.as_deref())
            .ok_or_else(|| unsupported_media_type("cannot determine the file's content type"))?;
    if !state.upload.accepts(&content_type) {
        return Err(unsupported_media_type(format!(
            "file type {} is not accepted; expected one of: {}",
            content_type,
            state.upload.accepted_types.join(", ")
        )));
    }

    let collection =
        ingest_document(&state.store, upload.file_name, upload.bytes.to_vec(), &content_type).await?;

    Ok(Json(ExtractResponse {
        success: true,
        source_name: collection.source_name,
        total_items: collection.total_items,
        items: collection.items,
    }))
}

// ============ /api/items ============

async fn handle_read(State(state): State<AppState>) -> Result<Json<Collection>, AppError> {
    Ok(Json(state.store.read().await?))
}

async fn handle_delete_all(State(state): State<AppState>) -> Result<Json<Collection>, AppError> {
    Ok(Json(state.store.delete_all().await?))
}

#[derive(Deserialize)]
struct UpdateRequest {
    /// `None` when the field is absent or null; an empty string is valid.
    #[serde(default)]
    text: Option<String>,
}

/// Handler for `PUT /api/items/{id}`.
async fn handle_update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Result<Json<UpdateRequest>, JsonRejection>,
) -> Result<Json<Item>, AppError> {
    let id = parse_id(&id)?;
    let Json(req) = body.map_err(|e| bad_request(e.body_text()))?;
    Ok(Json(state.store.update_text(id, req.text).await?))
}

async fn handle_delete_one(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Collection>, AppError> {
    let id = parse_id(&id)?;
    Ok(Json(state.store.delete_one(id).await?))
}

#[derive(Deserialize)]
struct ExportQuery {
    format: Option<String>,
}

/// Handler for `GET /api/items/export`.
async fn handle_export(
    State(state): State<AppState>,
    Query(query): Query<ExportQuery>,
) -> Result<Response, AppError> {
    let format = match query.format.as_deref() {
        Some(f) => f.parse::<ExportFormat>().map_err(bad_request)?,
        None => ExportFormat::default(),
    };
    let collection = state.store.read().await?;
    let body = export::render(&collection, format).map_err(|e| {
        tracing::error!(error = %e, "export rendering failed");
        AppError::new(StatusCode::INTERNAL_SERVER_ERROR, "internal", "export failed")
    })?;
    let disposition = format!(
        "attachment; filename=\"{}\"",
        export::file_name(&collection, format)
    );

    Ok((
        [
            (header::CONTENT_TYPE, format.content_type().to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        body,
    )
        .into_response())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aborted_extraction_maps_to_unprocessable() {
        let err = AppError::from(IngestError::Extract(ExtractError::Aborted(
            "task panicked".to_string(),
        )));
        assert_eq!(err.status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(err.code, "extraction_failed");
    }

    #[test]
    fn unsupported_type_maps_to_415() {
        let err = AppError::from(IngestError::Extract(ExtractError::UnsupportedContentType(
            "image/png".to_string(),
        )));
        assert_eq!(err.status, StatusCode::UNSUPPORTED_MEDIA_TYPE);
    }
}
