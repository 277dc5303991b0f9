//! HTTP request handlers.

pub mod auth;
pub mod document_types;
pub mod entrance_exams;
pub mod notes;
pub mod taxonomy;

use std::sync::Arc;

use serde::Serialize;
use tracing::warn;
use uuid::Uuid;

use shelf_db::{FilesystemBackend, StorageBackend};

/// Standard response for create operations.
#[derive(Debug, Serialize)]
pub struct CreatedResponse {
    pub id: Uuid,
}

/// Delete stored blobs in the background after a cascade commit.
///
/// Blob removal is best effort: the database rows are already gone, and an
/// orphaned file is harmless next to a dangling row.
pub(crate) fn cleanup_blobs(storage: Arc<FilesystemBackend>, paths: Vec<String>) {
    if paths.is_empty() {
        return;
    }
    tokio::spawn(async move {
        for path in paths {
            if let Err(e) = storage.delete(&path).await {
                warn!(storage_path = %path, error = %e, "Blob cleanup failed");
            }
        }
    });
}
