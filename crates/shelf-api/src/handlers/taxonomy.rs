//! Class, subject, and chapter handlers.

use axum::extract::{Path, State};
use axum::Json;
use serde::Serialize;
use uuid::Uuid;

use shelf_core::{
    Chapter, CreateChapterRequest, CreateClassRequest, CreateSubjectRequest, SchoolClass, Subject,
};
use shelf_db::CascadeDeleteReport;

use super::{cleanup_blobs, CreatedResponse};
use crate::{ApiError, AppState};

/// What a cascade delete removed, as reported to the caller.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CascadeDeleteResponse {
    pub subjects: u64,
    pub chapters: u64,
    pub notes: u64,
    pub document_types: u64,
}

impl From<&CascadeDeleteReport> for CascadeDeleteResponse {
    fn from(report: &CascadeDeleteReport) -> Self {
        Self {
            subjects: report.subjects,
            chapters: report.chapters,
            notes: report.notes,
            document_types: report.document_types,
        }
    }
}

// ---------------------------------------------------------------------------
// Classes
// ---------------------------------------------------------------------------

pub async fn list_classes(State(state): State<AppState>) -> Result<Json<Vec<SchoolClass>>, ApiError> {
    Ok(Json(state.db.classes.list().await?))
}

pub async fn create_class(
    State(state): State<AppState>,
    Json(req): Json<CreateClassRequest>,
) -> Result<Json<CreatedResponse>, ApiError> {
    let id = state.db.classes.create(&req.name).await?;
    Ok(Json(CreatedResponse { id }))
}

pub async fn delete_class(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<CascadeDeleteResponse>, ApiError> {
    let report = state.db.classes.delete(id).await?;
    let response = CascadeDeleteResponse::from(&report);
    cleanup_blobs(state.storage.clone(), report.storage_paths);
    Ok(Json(response))
}

// ---------------------------------------------------------------------------
// Subjects
// ---------------------------------------------------------------------------

pub async fn list_subjects(State(state): State<AppState>) -> Result<Json<Vec<Subject>>, ApiError> {
    Ok(Json(state.db.subjects.list().await?))
}

pub async fn create_subject(
    State(state): State<AppState>,
    Json(req): Json<CreateSubjectRequest>,
) -> Result<Json<CreatedResponse>, ApiError> {
    let id = state.db.subjects.create(&req.name, req.class_id).await?;
    Ok(Json(CreatedResponse { id }))
}

pub async fn delete_subject(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<CascadeDeleteResponse>, ApiError> {
    let report = state.db.subjects.delete(id).await?;
    let response = CascadeDeleteResponse::from(&report);
    cleanup_blobs(state.storage.clone(), report.storage_paths);
    Ok(Json(response))
}

// ---------------------------------------------------------------------------
// Chapters
// ---------------------------------------------------------------------------

pub async fn list_chapters(State(state): State<AppState>) -> Result<Json<Vec<Chapter>>, ApiError> {
    Ok(Json(state.db.chapters.list().await?))
}

pub async fn create_chapter(
    State(state): State<AppState>,
    Json(req): Json<CreateChapterRequest>,
) -> Result<Json<CreatedResponse>, ApiError> {
    let id = state.db.chapters.create(&req.name, req.subject_id).await?;
    Ok(Json(CreatedResponse { id }))
}

pub async fn delete_chapter(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<CascadeDeleteResponse>, ApiError> {
    let report = state.db.chapters.delete(id).await?;
    let response = CascadeDeleteResponse::from(&report);
    cleanup_blobs(state.storage.clone(), report.storage_paths);
    Ok(Json(response))
}
