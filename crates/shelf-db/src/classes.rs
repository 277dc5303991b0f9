//! Class repository with transactional cascade delete.

use sqlx::{Pool, Postgres, Row};
use tracing::info;
use uuid::Uuid;

use shelf_core::{new_v7, Error, Result, SchoolClass};

/// Outcome of a cascade delete: row counts per level plus the storage paths
/// of removed files, for best-effort blob cleanup after commit.
#[derive(Debug, Default)]
pub struct CascadeDeleteReport {
    pub subjects: u64,
    pub chapters: u64,
    pub notes: u64,
    pub document_types: u64,
    pub storage_paths: Vec<String>,
}

#[derive(Clone)]
pub struct PgClassRepository {
    pool: Pool<Postgres>,
}

impl PgClassRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    pub async fn list(&self) -> Result<Vec<SchoolClass>> {
        let rows = sqlx::query(
            "SELECT id, name, created_at_utc FROM school_class ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(rows
            .into_iter()
            .map(|row| SchoolClass {
                id: row.get("id"),
                name: row.get("name"),
                created_at_utc: Some(row.get("created_at_utc")),
            })
            .collect())
    }

    pub async fn create(&self, name: &str) -> Result<Uuid> {
        let name = name.trim();
        if name.is_empty() {
            return Err(Error::InvalidInput("Class name must not be empty".into()));
        }

        let id = new_v7();
        sqlx::query("INSERT INTO school_class (id, name) VALUES ($1, $2)")
            .bind(id)
            .bind(name)
            .execute(&self.pool)
            .await
            .map_err(Error::Database)?;

        Ok(id)
    }

    /// Delete a class and everything beneath it in one transaction.
    ///
    /// Children are removed bottom-up (notes, document types, chapters,
    /// subjects) so no foreign key is ever dangling mid-transaction. The
    /// caller is responsible for deleting the returned blob paths after
    /// commit.
    pub async fn delete(&self, id: Uuid) -> Result<CascadeDeleteReport> {
        let mut tx = self.pool.begin().await.map_err(Error::Database)?;

        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM school_class WHERE id = $1)")
                .bind(id)
                .fetch_one(&mut *tx)
                .await
                .map_err(Error::Database)?;
        if !exists {
            return Err(Error::NotFound(format!("Class {} not found", id)));
        }

        let storage_paths: Vec<String> = sqlx::query_scalar(
            r#"
            DELETE FROM note
            WHERE chapter_id IN (
                SELECT ch.id FROM chapter ch
                JOIN subject s ON ch.subject_id = s.id
                WHERE s.class_id = $1
            )
            RETURNING storage_path
            "#,
        )
        .bind(id)
        .fetch_all(&mut *tx)
        .await
        .map_err(Error::Database)?;

        let document_types = sqlx::query(
            r#"
            DELETE FROM document_type
            WHERE chapter_id IN (
                SELECT ch.id FROM chapter ch
                JOIN subject s ON ch.subject_id = s.id
                WHERE s.class_id = $1
            )
            "#,
        )
        .bind(id)
        .execute(&mut *tx)
        .await
        .map_err(Error::Database)?
        .rows_affected();

        let chapters = sqlx::query(
            "DELETE FROM chapter WHERE subject_id IN (SELECT id FROM subject WHERE class_id = $1)",
        )
        .bind(id)
        .execute(&mut *tx)
        .await
        .map_err(Error::Database)?
        .rows_affected();

        let subjects = sqlx::query("DELETE FROM subject WHERE class_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(Error::Database)?
            .rows_affected();

        sqlx::query("DELETE FROM school_class WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(Error::Database)?;

        tx.commit().await.map_err(Error::Database)?;

        info!(
            subsystem = "db",
            component = "classes",
            op = "delete_cascade",
            class_id = %id,
            result_count = subjects + chapters + storage_paths.len() as u64 + document_types,
            "Class deleted with descendants"
        );

        Ok(CascadeDeleteReport {
            subjects,
            chapters,
            notes: storage_paths.len() as u64,
            document_types,
            storage_paths,
        })
    }
}
