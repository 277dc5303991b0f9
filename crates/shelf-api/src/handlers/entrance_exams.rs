//! Entrance exam handlers. Exams sit outside the class taxonomy.

use axum::extract::{Multipart, Path, State};
use axum::Json;
use tracing::info;
use uuid::Uuid;

use shelf_core::{new_v7, CreateExamRecord, EntranceExam, ExamUpload};
use shelf_db::{file_url_for, generate_storage_path, StorageBackend};

use super::notes::text_field;
use super::CreatedResponse;
use crate::{ApiError, AppState};

pub async fn list_entrance_exams(
    State(state): State<AppState>,
) -> Result<Json<Vec<EntranceExam>>, ApiError> {
    Ok(Json(state.db.entrance_exams.list().await?))
}

/// Upload an entrance exam PDF.
///
/// # Multipart Fields
/// - `pdf` (required): the PDF file
/// - `name` (required): display name of the exam
pub async fn upload_entrance_exam(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<CreatedResponse>, ApiError> {
    let mut upload = ExamUpload {
        name: String::new(),
        file_name: String::new(),
        data: Vec::new(),
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
            Some("name") => {
                upload.name = text_field(field).await?;
            }
            _ => {}
        }
    }

    if upload.data.is_empty() {
        return Err(ApiError::BadRequest(
            "Missing pdf file in multipart form".to_string(),
        ));
    }

    upload.validate()?;

    let blob_id = new_v7();
    let storage_path = generate_storage_path(blob_id);
    state.storage.write(&storage_path, &upload.data).await?;

    let record = CreateExamRecord {
        name: upload.name.trim().to_string(),
        file_url: file_url_for(&storage_path),
    };

    let id = match state.db.entrance_exams.insert(record, &storage_path).await {
        Ok(id) => id,
        Err(e) => {
            let _ = state.storage.delete(&storage_path).await;
            return Err(e.into());
        }
    };

    info!(
        subsystem = "api",
        component = "entrance_exams",
        op = "upload",
        exam_id = %id,
        file_size = upload.data.len(),
        "Entrance exam uploaded"
    );
    Ok(Json(CreatedResponse { id }))
}

pub async fn delete_entrance_exam(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let storage_path = state.db.entrance_exams.delete(id).await?;
    super::cleanup_blobs(state.storage.clone(), vec![storage_path]);
    Ok(Json(serde_json::json!({ "deleted": true })))
}
