//! # shelf-core
//!
//! Core types and state machines for studyshelf.
//!
//! This crate provides the foundational data structures the other studyshelf
//! crates depend on: the catalog entity models, the normalized dual-shape
//! entity reference, the per-session catalog cache with optimistic cascade
//! removal, the dependent-selection chain, and upload validation. It does no
//! I/O of its own.

pub mod catalog;
pub mod error;
pub mod ids;
pub mod logging;
pub mod models;
pub mod selection;
pub mod upload;

// Re-export commonly used types at crate root
pub use catalog::{CascadeRemoval, CatalogStore, Collection, DuplicateChapterGroup};
pub use error::{Error, Result};
pub use ids::new_v7;
pub use models::{
    Chapter, CreateChapterRequest, CreateClassRequest, CreateDocumentTypeRequest,
    CreateExamRecord, CreateNoteRecord, CreateSubjectRequest, DocumentType, EntityRef,
    EntranceExam, Note, SchoolClass, Subject,
};
pub use selection::SelectionChain;
pub use upload::{validate_pdf, ExamUpload, NoteUpload, MAX_PDF_BYTES};
