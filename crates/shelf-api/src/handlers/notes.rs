//! Note upload and listing handlers.
//!
//! Uploads arrive as multipart/form-data with a `pdf` file field plus the
//! taxonomy identifiers. Past papers are regular notes carrying a document
//! type and an optional year label.

use axum::extract::{Multipart, Path, Query, State};
use axum::Json;
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use shelf_core::{new_v7, CreateNoteRecord, Note, NoteUpload};
use shelf_db::{file_url_for, generate_storage_path, StorageBackend};

use super::CreatedResponse;
use crate::{ApiError, AppState};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListNotesQuery {
    pub chapter_id: Option<Uuid>,
}

pub async fn list_notes(
    State(state): State<AppState>,
    Query(query): Query<ListNotesQuery>,
) -> Result<Json<Vec<Note>>, ApiError> {
    let notes = match query.chapter_id {
        Some(chapter_id) => state.db.notes.list_by_chapter(chapter_id).await?,
        None => state.db.notes.list().await?,
    };
    Ok(Json(notes))
}

/// Upload a note PDF.
///
/// # Multipart Fields
/// - `pdf` (required): the PDF file
/// - `chapterId` (required), `subjectId` (required)
/// - `documentTypeId`, `title`, `year` (optional)
pub async fn upload_note(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<CreatedResponse>, ApiError> {
    let mut upload = NoteUpload {
        file_name: String::new(),
        data: Vec::new(),
        chapter_id: None,
        subject_id: None,
        document_type_id: None,
        title: None,
        year: None,
    };

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(format!("Multipart error: {}", e)))?
    {
        let field_name = field.name().map(|n| n.to_string());
        match field_name.as_deref() {
            Some("pdf") => {
                upload.file_name = field
                    .file_name()
                    .unwrap_or("upload.pdf")
                    .to_string();
                upload.data = field
                    .bytes()
                    .await
                    .map_err(|e| ApiError::BadRequest(format!("Read error: {}", e)))?
                    .to_vec();
            }
            Some("title") => {
                upload.title = Some(text_field(field).await?);
            }
            Some("year") => {
                upload.year = Some(text_field(field).await?);
            }
            Some("chapterId") => {
                upload.chapter_id = Some(uuid_field(field, "chapterId").await?);
            }
            Some("subjectId") => {
                upload.subject_id = Some(uuid_field(field, "subjectId").await?);
            }
            Some("documentTypeId") => {
                upload.document_type_id = Some(uuid_field(field, "documentTypeId").await?);
            }
            _ => {} // ignore unknown fields
        }
    }

    if upload.data.is_empty() {
        return Err(ApiError::BadRequest(
            "Missing pdf file in multipart form".to_string(),
        ));
    }

    let (chapter_id, subject_id) = upload.validate()?;

    let blob_id = new_v7();
    let storage_path = generate_storage_path(blob_id);
    state.storage.write(&storage_path, &upload.data).await?;

    let record = CreateNoteRecord {
        title: upload.effective_title().to_string(),
        chapter_id,
        subject_id,
        document_type_id: upload.document_type_id,
        year: upload.effective_year().map(str::to_string),
        file_url: file_url_for(&storage_path),
    };

    let id = match state.db.notes.insert(record, &storage_path).await {
        Ok(id) => id,
        Err(e) => {
            // Roll back the blob so the failed insert leaves nothing behind.
            let _ = state.storage.delete(&storage_path).await;
            return Err(e.into());
        }
    };

    info!(
        subsystem = "api",
        component = "notes",
        op = "upload",
        note_id = %id,
        chapter_id = %chapter_id,
        file_size = upload.data.len(),
        "Note uploaded"
    );
    Ok(Json(CreatedResponse { id }))
}

pub async fn delete_note(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let storage_path = state.db.notes.delete(id).await?;
    super::cleanup_blobs(state.storage.clone(), vec![storage_path]);
    Ok(Json(serde_json::json!({ "deleted": true })))
}

pub(crate) async fn text_field(field: axum::extract::multipart::Field<'_>) -> Result<String, ApiError> {
    field
        .text()
        .await
        .map_err(|e| ApiError::BadRequest(format!("Read error: {}", e)))
}

pub(crate) async fn uuid_field(
    field: axum::extract::multipart::Field<'_>,
    name: &str,
) -> Result<Uuid, ApiError> {
    let text = text_field(field).await?;
    text.trim()
        .parse()
        .map_err(|_| ApiError::BadRequest(format!("Invalid {}: not a UUID", name)))
}
