//! # shelf-db
//!
//! PostgreSQL database layer for studyshelf.
//!
//! This crate provides:
//! - Connection pool management
//! - Repository implementations for the content taxonomy
//!   (classes, subjects, chapters, document types)
//! - Note and entrance exam repositories with blob bookkeeping
//! - Transactional cascade deletes that report what was removed
//! - Filesystem blob storage with atomic writes
//! - Admin session storage
//!
//! ## Example
//!
//! ```rust,ignore
//! use shelf_db::Database;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let db = Database::connect("postgres://localhost/studyshelf").await?;
//!     db.migrate().await?;
//!
//!     let class_id = db.classes.create("Class 10").await?;
//!     let subject_id = db.subjects.create("Physics", class_id).await?;
//!     println!("Created subject: {}", subject_id);
//!     Ok(())
//! }
//! ```

pub mod chapters;
pub mod classes;
pub mod document_types;
pub mod entrance_exams;
pub mod file_storage;
pub mod notes;
pub mod pool;
pub mod sessions;
pub mod subjects;

// Always compiled so integration tests (in tests/) can use the fixtures.
pub mod test_fixtures;

// Re-export core types
pub use shelf_core::*;

pub use chapters::PgChapterRepository;
pub use classes::{CascadeDeleteReport, PgClassRepository};
pub use document_types::PgDocumentTypeRepository;
pub use entrance_exams::PgEntranceExamRepository;
pub use file_storage::{file_url_for, generate_storage_path, FilesystemBackend, StorageBackend};
pub use notes::PgNoteRepository;
pub use pool::{create_pool, create_pool_with_config, log_pool_metrics, PoolConfig};
pub use sessions::PgSessionRepository;
pub use subjects::PgSubjectRepository;

/// Combined database context with all repositories.
#[derive(Clone)]
pub struct Database {
    /// The underlying connection pool.
    pub pool: sqlx::Pool<sqlx::Postgres>,
    /// Class repository.
    pub classes: PgClassRepository,
    /// Subject repository.
    pub subjects: PgSubjectRepository,
    /// Chapter repository.
    pub chapters: PgChapterRepository,
    /// Document type repository with idempotent ensure.
    pub document_types: PgDocumentTypeRepository,
    /// Note repository.
    pub notes: PgNoteRepository,
    /// Entrance exam repository.
    pub entrance_exams: PgEntranceExamRepository,
    /// Admin session repository.
    pub sessions: PgSessionRepository,
}

impl Database {
    /// Create a new Database instance from a connection pool.
    pub fn new(pool: sqlx::Pool<sqlx::Postgres>) -> Self {
        Self {
            classes: PgClassRepository::new(pool.clone()),
            subjects: PgSubjectRepository::new(pool.clone()),
            chapters: PgChapterRepository::new(pool.clone()),
            document_types: PgDocumentTypeRepository::new(pool.clone()),
            notes: PgNoteRepository::new(pool.clone()),
            entrance_exams: PgEntranceExamRepository::new(pool.clone()),
            sessions: PgSessionRepository::new(pool.clone()),
            pool,
        }
    }

    /// Connect with default pool settings.
    pub async fn connect(database_url: &str) -> Result<Self> {
        let pool = create_pool(database_url).await?;
        Ok(Self::new(pool))
    }

    /// Connect with explicit pool settings.
    pub async fn connect_with_config(database_url: &str, config: PoolConfig) -> Result<Self> {
        let pool = create_pool_with_config(database_url, config).await?;
        Ok(Self::new(pool))
    }

    /// Run embedded migrations to bring the schema up to date.
    pub async fn migrate(&self) -> Result<()> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| Error::Config(format!("Migration failed: {}", e)))?;
        Ok(())
    }
}
