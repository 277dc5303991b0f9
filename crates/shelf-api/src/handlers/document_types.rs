//! Document type handlers, including the idempotent ensure endpoint used by
//! past paper uploads.

use axum::extract::{Path, State};
use axum::Json;
use serde::Deserialize;
use uuid::Uuid;

use shelf_core::{CreateDocumentTypeRequest, DocumentType};

use super::CreatedResponse;
use crate::{ApiError, AppState};

pub async fn list_document_types(
    State(state): State<AppState>,
) -> Result<Json<Vec<DocumentType>>, ApiError> {
    Ok(Json(state.db.document_types.list().await?))
}

pub async fn create_document_type(
    State(state): State<AppState>,
    Json(req): Json<CreateDocumentTypeRequest>,
) -> Result<Json<CreatedResponse>, ApiError> {
    let id = state
        .db
        .document_types
        .create(&req.name, req.chapter_id)
        .await?;
    Ok(Json(CreatedResponse { id }))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnsureDocumentTypeRequest {
    pub name: String,
    pub chapter_id: Uuid,
}

/// Find or create a document type. Safe to call repeatedly; concurrent
/// callers for the same (name, chapter) all receive the same id.
pub async fn ensure_document_type(
    State(state): State<AppState>,
    Json(req): Json<EnsureDocumentTypeRequest>,
) -> Result<Json<CreatedResponse>, ApiError> {
    let id = state
        .db
        .document_types
        .ensure(&req.name, req.chapter_id)
        .await?;
    Ok(Json(CreatedResponse { id }))
}

pub async fn delete_document_type(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, ApiError> {
    state.db.document_types.delete(id).await?;
    Ok(Json(serde_json::json!({ "deleted": true })))
}
