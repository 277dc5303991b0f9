//! Note repository.

use sqlx::{Pool, Postgres, Row};
use uuid::Uuid;

use shelf_core::{new_v7, CreateNoteRecord, EntityRef, Error, Note, Result};

#[derive(Clone)]
pub struct PgNoteRepository {
    pool: Pool<Postgres>,
}

impl PgNoteRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    pub async fn list(&self) -> Result<Vec<Note>> {
        let rows = sqlx::query(
            r#"
            SELECT id, title, chapter_id, subject_id, document_type_id,
                   year, file_url, created_at_utc
            FROM note
            ORDER BY id
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(rows.into_iter().map(Self::row_to_note).collect())
    }

    pub async fn list_by_chapter(&self, chapter_id: Uuid) -> Result<Vec<Note>> {
        let rows = sqlx::query(
            r#"
            SELECT id, title, chapter_id, subject_id, document_type_id,
                   year, file_url, created_at_utc
            FROM note
            WHERE chapter_id = $1
            ORDER BY id
            "#,
        )
        .bind(chapter_id)
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(rows.into_iter().map(Self::row_to_note).collect())
    }

    /// Insert a note row for an already-stored file.
    pub async fn insert(&self, rec: CreateNoteRecord, storage_path: &str) -> Result<Uuid> {
        let id = new_v7();
        sqlx::query(
            r#"
            INSERT INTO note (id, title, chapter_id, subject_id, document_type_id,
                              year, file_url, storage_path)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(id)
        .bind(&rec.title)
        .bind(rec.chapter_id)
        .bind(rec.subject_id)
        .bind(rec.document_type_id)
        .bind(&rec.year)
        .bind(&rec.file_url)
        .bind(storage_path)
        .execute(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(id)
    }

    /// Delete a note, returning its storage path for blob cleanup.
    pub async fn delete(&self, id: Uuid) -> Result<String> {
        let storage_path: Option<String> =
            sqlx::query_scalar("DELETE FROM note WHERE id = $1 RETURNING storage_path")
                .bind(id)
                .fetch_optional(&self.pool)
                .await
                .map_err(Error::Database)?;

        storage_path.ok_or_else(|| Error::NotFound(format!("Note {} not found", id)))
    }

    fn row_to_note(row: sqlx::postgres::PgRow) -> Note {
        Note {
            id: row.get("id"),
            title: row.get("title"),
            chapter_id: EntityRef::Id(row.get("chapter_id")),
            subject_id: EntityRef::Id(row.get("subject_id")),
            document_type_id: row
                .get::<Option<Uuid>, _>("document_type_id")
                .map(EntityRef::Id),
            year: row.get("year"),
            file_url: row.get("file_url"),
            created_at_utc: Some(row.get("created_at_utc")),
        }
    }
}
