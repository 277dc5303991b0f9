//! Document type repository with idempotent find-or-create.

use sqlx::{Pool, Postgres, Row};
use tracing::{debug, info};
use uuid::Uuid;

use shelf_core::{new_v7, DocumentType, EntityRef, Error, Result};

#[derive(Clone)]
pub struct PgDocumentTypeRepository {
    pool: Pool<Postgres>,
}

impl PgDocumentTypeRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    pub async fn list(&self) -> Result<Vec<DocumentType>> {
        let rows = sqlx::query(
            "SELECT id, name, chapter_id, created_at_utc FROM document_type ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(rows
            .into_iter()
            .map(|row| DocumentType {
                id: row.get("id"),
                name: row.get("name"),
                chapter_id: EntityRef::Id(row.get("chapter_id")),
                created_at_utc: Some(row.get("created_at_utc")),
            })
            .collect())
    }

    /// Create a document type. Fails with a unique violation if the chapter
    /// already has a type of this name (case-insensitively).
    pub async fn create(&self, name: &str, chapter_id: Uuid) -> Result<Uuid> {
        let name = name.trim();
        if name.is_empty() {
            return Err(Error::InvalidInput(
                "Document type name must not be empty".into(),
            ));
        }

        let id = new_v7();
        sqlx::query("INSERT INTO document_type (id, name, chapter_id) VALUES ($1, $2, $3)")
            .bind(id)
            .bind(name)
            .bind(chapter_id)
            .execute(&self.pool)
            .await
            .map_err(Error::Database)?;

        Ok(id)
    }

    /// Find or create a document type for a chapter, idempotently.
    ///
    /// The unique index on (lower(name), chapter_id) makes this safe under
    /// concurrent calls: the insert either wins or hits DO NOTHING, and the
    /// follow-up select returns whichever row won.
    pub async fn ensure(&self, name: &str, chapter_id: Uuid) -> Result<Uuid> {
        let name = name.trim();
        if name.is_empty() {
            return Err(Error::InvalidInput(
                "Document type name must not be empty".into(),
            ));
        }

        let id = new_v7();
        let inserted: Option<Uuid> = sqlx::query_scalar(
            r#"
            INSERT INTO document_type (id, name, chapter_id)
            VALUES ($1, $2, $3)
            ON CONFLICT (lower(name), chapter_id) DO NOTHING
            RETURNING id
            "#,
        )
        .bind(id)
        .bind(name)
        .bind(chapter_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(Error::Database)?;

        if let Some(id) = inserted {
            info!(
                subsystem = "db",
                component = "document_types",
                op = "ensure",
                document_type_id = %id,
                chapter_id = %chapter_id,
                "Document type created"
            );
            return Ok(id);
        }

        let existing: Uuid = sqlx::query_scalar(
            "SELECT id FROM document_type WHERE lower(name) = lower($1) AND chapter_id = $2",
        )
        .bind(name)
        .bind(chapter_id)
        .fetch_one(&self.pool)
        .await
        .map_err(Error::Database)?;

        debug!(
            subsystem = "db",
            component = "document_types",
            op = "ensure",
            document_type_id = %existing,
            chapter_id = %chapter_id,
            "Document type already present"
        );
        Ok(existing)
    }

    /// Delete a document type; notes referencing it are untagged, not removed.
    pub async fn delete(&self, id: Uuid) -> Result<()> {
        let mut tx = self.pool.begin().await.map_err(Error::Database)?;

        sqlx::query("UPDATE note SET document_type_id = NULL WHERE document_type_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(Error::Database)?;

        let deleted = sqlx::query("DELETE FROM document_type WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(Error::Database)?
            .rows_affected();
        if deleted == 0 {
            return Err(Error::NotFound(format!("Document type {} not found", id)));
        }

        tx.commit().await.map_err(Error::Database)?;
        Ok(())
    }
}
