//! HTTP handlers and wire types.
//!
//! Transport-level validation lives here; every user-facing fallback string
//! for the conversation itself comes from the core pipeline, so a failed
//! question still answers 200 with a friendly message.

use std::time::{SystemTime, UNIX_EPOCH};

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use ragkit_core::{DocumentSummary, StoreStats};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::server::AppState;

// ── Wire types ─────────────────────────────────────────────────────

/// Request body for document ingestion.
#[derive(Debug, Deserialize)]
pub struct UploadDocumentRequest {
    pub filename: String,
    /// Extracted document text. Extraction happens upstream of this API.
    pub text: String,
}

#[derive(Debug, Serialize)]
pub struct UploadDocumentResponse {
    pub message: String,
    pub filename: String,
    pub status: String,
}

/// Request body for a chat turn.
#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub message: String,
    /// Ground the answer in stored documents. Defaults to `true`.
    #[serde(default = "default_use_rag")]
    pub use_rag: bool,
}

fn default_use_rag() -> bool {
    true
}

#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct DocumentListResponse {
    pub documents: Vec<DocumentSummary>,
    pub total_documents: usize,
    pub total_chunks: usize,
}

#[derive(Debug, Serialize)]
pub struct DeleteDocumentResponse {
    pub success: bool,
    pub message: String,
    pub filename: String,
}

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    pub q: String,
    /// Number of results. Defaults to the configured `top_k`.
    pub k: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct SearchResultEntry {
    pub rank: usize,
    pub distance: f32,
    pub source_file: String,
    pub chunk_id: String,
    pub content_preview: String,
    pub content_length: usize,
}

#[derive(Debug, Serialize)]
pub struct SearchResponse {
    pub query: String,
    pub results_found: usize,
    pub results: Vec<SearchResultEntry>,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: u64,
    pub version: String,
}

// ── Validation helpers ─────────────────────────────────────────────

fn validate_filename(filename: &str) -> Result<(), (StatusCode, String)> {
    if filename.trim().is_empty() {
        return Err((StatusCode::BAD_REQUEST, "filename must not be empty".to_string()));
    }
    Ok(())
}

// ── Handlers ───────────────────────────────────────────────────────

/// GET /health
pub async fn health() -> Json<HealthResponse> {
    let timestamp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_secs())
        .unwrap_or(0);

    Json(HealthResponse {
        status: "healthy".to_string(),
        timestamp,
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// POST /api/v1/documents
pub async fn upload_document(
    State(state): State<AppState>,
    Json(request): Json<UploadDocumentRequest>,
) -> Result<Json<UploadDocumentResponse>, (StatusCode, String)> {
    validate_filename(&request.filename)?;
    if request.text.trim().is_empty() {
        return Err((StatusCode::BAD_REQUEST, "text must not be empty".to_string()));
    }

    info!(filename = %request.filename, text_bytes = request.text.len(), "uploading document");
    if !state.service.ingest(&request.filename, &request.text).await {
        return Err((
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("Failed to process document '{}'", request.filename),
        ));
    }

    Ok(Json(UploadDocumentResponse {
        message: format!("Document '{}' successfully uploaded and processed", request.filename),
        filename: request.filename,
        status: "success".to_string(),
    }))
}

/// POST /api/v1/chat
pub async fn chat(
    State(state): State<AppState>,
    Json(request): Json<ChatRequest>,
) -> Json<ChatResponse> {
    info!(
        message_chars = request.message.chars().count(),
        use_rag = request.use_rag,
        "chat request"
    );

    let outcome = state.service.ask(&request.message, request.use_rag).await;
    if outcome.success {
        info!(
            use_rag = outcome.use_rag,
            context_used = outcome.context_used,
            documents_found = outcome.documents_found,
            processing_time = outcome.processing_time,
            "chat request completed"
        );
    } else {
        warn!(
            error = outcome.error.as_deref().unwrap_or("unknown"),
            processing_time = outcome.processing_time,
            "chat request failed"
        );
    }

    // The outcome message is user-presentable even on failure.
    Json(ChatResponse { message: outcome.message })
}

/// GET /api/v1/documents
pub async fn list_documents(State(state): State<AppState>) -> Json<DocumentListResponse> {
    let documents = state.service.list_documents().await;
    let total_documents = documents.len();
    let total_chunks = documents.iter().map(|doc| doc.chunk_count).sum();

    info!(total_documents, total_chunks, "retrieved document listing");
    Json(DocumentListResponse { documents, total_documents, total_chunks })
}

/// DELETE /api/v1/documents/{filename}
pub async fn delete_document(
    Path(filename): Path<String>,
    State(state): State<AppState>,
) -> Json<DeleteDocumentResponse> {
    let exists =
        state.service.list_documents().await.iter().any(|doc| doc.filename == filename);
    if !exists {
        warn!(filename = %filename, "document not found");
        return Json(DeleteDocumentResponse {
            success: false,
            message: format!("Document '{filename}' not found in vector store"),
            filename,
        });
    }

    if state.service.delete_document(&filename).await {
        Json(DeleteDocumentResponse {
            success: true,
            message: format!("Document '{filename}' successfully deleted from vector store"),
            filename,
        })
    } else {
        Json(DeleteDocumentResponse {
            success: false,
            message: format!("Failed to delete document '{filename}' from vector store"),
            filename,
        })
    }
}

/// GET /api/v1/store/stats
pub async fn store_stats(State(state): State<AppState>) -> Json<StoreStats> {
    Json(state.service.store_stats().await)
}

/// GET /api/v1/search
pub async fn search(
    Query(params): Query<SearchParams>,
    State(state): State<AppState>,
) -> Result<Json<SearchResponse>, (StatusCode, String)> {
    if params.q.trim().is_empty() {
        return Err((StatusCode::BAD_REQUEST, "query must not be empty".to_string()));
    }
    let top_k = params.k.unwrap_or(state.service.config().top_k);

    info!(query = %params.q, top_k, "scored search");
    let results = state.service.search_scored(&params.q, top_k).await;

    let entries: Vec<SearchResultEntry> = results
        .into_iter()
        .enumerate()
        .map(|(i, result)| {
            let content_preview: String = result.chunk.content.chars().take(200).collect();
            SearchResultEntry {
                rank: i + 1,
                distance: result.distance,
                content_length: result.chunk.content.len(),
                content_preview,
                source_file: result.chunk.metadata.source_file,
                chunk_id: result.chunk.metadata.chunk_id,
            }
        })
        .collect();

    Ok(Json(SearchResponse {
        query: params.q,
        results_found: entries.len(),
        results: entries,
    }))
}
