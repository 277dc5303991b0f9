//! Subject repository.

use sqlx::{Pool, Postgres, Row};
use tracing::info;
use uuid::Uuid;

use shelf_core::{new_v7, EntityRef, Error, Result, Subject};

use crate::classes::CascadeDeleteReport;

#[derive(Clone)]
pub struct PgSubjectRepository {
    pool: Pool<Postgres>,
}

impl PgSubjectRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// List all subjects, orphaned ones included (class_id NULL).
    pub async fn list(&self) -> Result<Vec<Subject>> {
        let rows = sqlx::query(
            "SELECT id, name, class_id, created_at_utc FROM subject ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(rows
            .into_iter()
            .map(|row| Subject {
                id: row.get("id"),
                name: row.get("name"),
                class_id: row
                    .get::<Option<Uuid>, _>("class_id")
                    .map(EntityRef::Id),
                created_at_utc: Some(row.get("created_at_utc")),
            })
            .collect())
    }

    pub async fn create(&self, name: &str, class_id: Uuid) -> Result<Uuid> {
        let name = name.trim();
        if name.is_empty() {
            return Err(Error::InvalidInput("Subject name must not be empty".into()));
        }

        let id = new_v7();
        sqlx::query("INSERT INTO subject (id, name, class_id) VALUES ($1, $2, $3)")
            .bind(id)
            .bind(name)
            .bind(class_id)
            .execute(&self.pool)
            .await
            .map_err(Error::Database)?;

        Ok(id)
    }

    /// Delete a subject, its chapters, and those chapters' notes and
    /// document types in one transaction.
    pub async fn delete(&self, id: Uuid) -> Result<CascadeDeleteReport> {
        let mut tx = self.pool.begin().await.map_err(Error::Database)?;

        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM subject WHERE id = $1)")
                .bind(id)
                .fetch_one(&mut *tx)
                .await
                .map_err(Error::Database)?;
        if !exists {
            return Err(Error::NotFound(format!("Subject {} not found", id)));
        }

        // Notes reference both the subject and a chapter; covering both
        // clauses catches rows whose denormalized keys have drifted.
        let storage_paths: Vec<String> = sqlx::query_scalar(
            r#"
            DELETE FROM note
            WHERE subject_id = $1
               OR chapter_id IN (SELECT id FROM chapter WHERE subject_id = $1)
            RETURNING storage_path
            "#,
        )
        .bind(id)
        .fetch_all(&mut *tx)
        .await
        .map_err(Error::Database)?;

        let document_types = sqlx::query(
            "DELETE FROM document_type WHERE chapter_id IN (SELECT id FROM chapter WHERE subject_id = $1)",
        )
        .bind(id)
        .execute(&mut *tx)
        .await
        .map_err(Error::Database)?
        .rows_affected();

        let chapters = sqlx::query("DELETE FROM chapter WHERE subject_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(Error::Database)?
            .rows_affected();

        sqlx::query("DELETE FROM subject WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(Error::Database)?;

        tx.commit().await.map_err(Error::Database)?;

        info!(
            subsystem = "db",
            component = "subjects",
            op = "delete_cascade",
            subject_id = %id,
            result_count = chapters + storage_paths.len() as u64 + document_types,
            "Subject deleted with descendants"
        );

        Ok(CascadeDeleteReport {
            subjects: 1,
            chapters,
            notes: storage_paths.len() as u64,
            document_types,
            storage_paths,
        })
    }
}
