//! Entity models and request types for the studyshelf catalog.
//!
//! The taxonomy is a flat relational shape: Class → Subject → Chapter →
//! Note, with DocumentType tagging a note's purpose per chapter and
//! EntranceExam standing outside the hierarchy.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// =============================================================================
// ENTITY REFERENCES
// =============================================================================

/// A foreign key that may arrive either resolved or unresolved.
///
/// Backends that populate references return an embedded object
/// (`{"_id": ..., "name": ...}`); others return the bare id. Every
/// comparison site must read the key through [`EntityRef::id`]; inlining
/// the fallback at call sites is how filters silently return empty sets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EntityRef {
    /// Bare identifier.
    Id(Uuid),
    /// Reference populated by the server into the referenced object.
    Populated {
        #[serde(alias = "_id")]
        id: Uuid,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        name: Option<String>,
    },
}

impl EntityRef {
    /// The referenced id, regardless of shape.
    pub fn id(&self) -> Uuid {
        match self {
            EntityRef::Id(id) => *id,
            EntityRef::Populated { id, .. } => *id,
        }
    }

    /// The referenced entity's name, when the reference was populated.
    pub fn name(&self) -> Option<&str> {
        match self {
            EntityRef::Id(_) => None,
            EntityRef::Populated { name, .. } => name.as_deref(),
        }
    }

    /// Whether this reference points at `id`.
    pub fn is(&self, id: Uuid) -> bool {
        self.id() == id
    }
}

impl From<Uuid> for EntityRef {
    fn from(id: Uuid) -> Self {
        EntityRef::Id(id)
    }
}

// =============================================================================
// CATALOG ENTITIES
// =============================================================================

/// Root of the taxonomy (e.g. "Class 10").
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchoolClass {
    #[serde(alias = "_id")]
    pub id: Uuid,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at_utc: Option<DateTime<Utc>>,
}

/// A subject taught within a class (e.g. "Biology").
///
/// `class_id` is nullable: a subject whose class no longer resolves is an
/// "orphaned subject", a first-class correctable state rather than an error.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subject {
    #[serde(alias = "_id")]
    pub id: Uuid,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub class_id: Option<EntityRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at_utc: Option<DateTime<Utc>>,
}

/// A chapter within a subject (e.g. "Cell Structure").
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Chapter {
    #[serde(alias = "_id")]
    pub id: Uuid,
    pub name: String,
    pub subject_id: EntityRef,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at_utc: Option<DateTime<Utc>>,
}

/// A tag categorizing a note's purpose (e.g. "Past Paper"), scoped to a
/// chapter.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentType {
    #[serde(alias = "_id")]
    pub id: Uuid,
    pub name: String,
    pub chapter_id: EntityRef,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at_utc: Option<DateTime<Utc>>,
}

/// An uploaded PDF artifact attached to a chapter.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    #[serde(alias = "_id")]
    pub id: Uuid,
    pub title: String,
    pub chapter_id: EntityRef,
    pub subject_id: EntityRef,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub document_type_id: Option<EntityRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year: Option<String>,
    pub file_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at_utc: Option<DateTime<Utc>>,
}

/// An entrance exam paper, independent of the class hierarchy.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntranceExam {
    #[serde(alias = "_id")]
    pub id: Uuid,
    pub name: String,
    pub file_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at_utc: Option<DateTime<Utc>>,
}

// =============================================================================
// REQUEST TYPES
// =============================================================================

/// Request for creating a class.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateClassRequest {
    pub name: String,
}

/// Request for creating a subject under a class.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSubjectRequest {
    pub name: String,
    pub class_id: Uuid,
}

/// Request for creating a chapter under a subject.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateChapterRequest {
    pub name: String,
    pub subject_id: Uuid,
}

/// Request for creating (or idempotently ensuring) a document type.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateDocumentTypeRequest {
    pub name: String,
    pub chapter_id: Uuid,
}

/// Metadata for a note row, written after its file has been stored.
#[derive(Debug, Clone)]
pub struct CreateNoteRecord {
    pub title: String,
    pub chapter_id: Uuid,
    pub subject_id: Uuid,
    pub document_type_id: Option<Uuid>,
    pub year: Option<String>,
    pub file_url: String,
}

/// Metadata for an entrance exam row, written after its file has been stored.
#[derive(Debug, Clone)]
pub struct CreateExamRecord {
    pub name: String,
    pub file_url: String,
}
