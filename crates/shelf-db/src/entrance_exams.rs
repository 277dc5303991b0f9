//! Entrance exam repository. Flat collection, no taxonomy links.

use sqlx::{Pool, Postgres, Row};
use uuid::Uuid;

use shelf_core::{new_v7, CreateExamRecord, EntranceExam, Error, Result};

#[derive(Clone)]
pub struct PgEntranceExamRepository {
    pool: Pool<Postgres>,
}

impl PgEntranceExamRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    pub async fn list(&self) -> Result<Vec<EntranceExam>> {
        let rows = sqlx::query(
            "SELECT id, name, file_url, created_at_utc FROM entrance_exam ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(rows
            .into_iter()
            .map(|row| EntranceExam {
                id: row.get("id"),
                name: row.get("name"),
                file_url: row.get("file_url"),
                created_at_utc: Some(row.get("created_at_utc")),
            })
            .collect())
    }

    pub async fn insert(&self, rec: CreateExamRecord, storage_path: &str) -> Result<Uuid> {
        let id = new_v7();
        sqlx::query(
            "INSERT INTO entrance_exam (id, name, file_url, storage_path) VALUES ($1, $2, $3, $4)",
        )
        .bind(id)
        .bind(&rec.name)
        .bind(&rec.file_url)
        .bind(storage_path)
        .execute(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(id)
    }

    /// Delete an exam, returning its storage path for blob cleanup.
    pub async fn delete(&self, id: Uuid) -> Result<String> {
        let storage_path: Option<String> =
            sqlx::query_scalar("DELETE FROM entrance_exam WHERE id = $1 RETURNING storage_path")
                .bind(id)
                .fetch_optional(&self.pool)
                .await
                .map_err(Error::Database)?;

        storage_path.ok_or_else(|| Error::NotFound(format!("Entrance exam {} not found", id)))
    }
}
