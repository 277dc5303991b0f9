//! Chapter repository.

use sqlx::{Pool, Postgres, Row};
use tracing::info;
use uuid::Uuid;

use shelf_core::{new_v7, Chapter, EntityRef, Error, Result};

use crate::classes::CascadeDeleteReport;

#[derive(Clone)]
pub struct PgChapterRepository {
    pool: Pool<Postgres>,
}

impl PgChapterRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    pub async fn list(&self) -> Result<Vec<Chapter>> {
        let rows = sqlx::query(
            "SELECT id, name, subject_id, created_at_utc FROM chapter ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(rows
            .into_iter()
            .map(|row| Chapter {
                id: row.get("id"),
                name: row.get("name"),
                subject_id: EntityRef::Id(row.get("subject_id")),
                created_at_utc: Some(row.get("created_at_utc")),
            })
            .collect())
    }

    pub async fn create(&self, name: &str, subject_id: Uuid) -> Result<Uuid> {
        let name = name.trim();
        if name.is_empty() {
            return Err(Error::InvalidInput("Chapter name must not be empty".into()));
        }

        let id = new_v7();
        sqlx::query("INSERT INTO chapter (id, name, subject_id) VALUES ($1, $2, $3)")
            .bind(id)
            .bind(name)
            .bind(subject_id)
            .execute(&self.pool)
            .await
            .map_err(Error::Database)?;

        Ok(id)
    }

    /// Delete a chapter along with its notes and document types.
    pub async fn delete(&self, id: Uuid) -> Result<CascadeDeleteReport> {
        let mut tx = self.pool.begin().await.map_err(Error::Database)?;

        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM chapter WHERE id = $1)")
                .bind(id)
                .fetch_one(&mut *tx)
                .await
                .map_err(Error::Database)?;
        if !exists {
            return Err(Error::NotFound(format!("Chapter {} not found", id)));
        }

        let storage_paths: Vec<String> = sqlx::query_scalar(
            "DELETE FROM note WHERE chapter_id = $1 RETURNING storage_path",
        )
        .bind(id)
        .fetch_all(&mut *tx)
        .await
        .map_err(Error::Database)?;

        let document_types = sqlx::query("DELETE FROM document_type WHERE chapter_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(Error::Database)?
            .rows_affected();

        sqlx::query("DELETE FROM chapter WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(Error::Database)?;

        tx.commit().await.map_err(Error::Database)?;

        info!(
            subsystem = "db",
            component = "chapters",
            op = "delete_cascade",
            chapter_id = %id,
            result_count = storage_paths.len() as u64 + document_types,
            "Chapter deleted with descendants"
        );

        Ok(CascadeDeleteReport {
            subjects: 0,
            chapters: 1,
            notes: storage_paths.len() as u64,
            document_types,
            storage_paths,
        })
    }
}
