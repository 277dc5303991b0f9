//! # shelf-client
//!
//! HTTP client for the studyshelf API: [`ResourceClient`] for raw JSON and
//! multipart calls, and [`AdminCatalog`] pairing it with the in-memory
//! catalog store for the admin workflow (refresh, optimistic cascade delete,
//! validated uploads, past paper tagging).

pub mod admin;
pub mod client;

pub use admin::{AdminCatalog, PAST_PAPER_TYPE_NAME};
pub use client::ResourceClient;

// Re-export core types callers need alongside the client.
pub use shelf_core::{
    CatalogStore, Collection, EntityRef, Error, ExamUpload, NoteUpload, Result, SelectionChain,
};
