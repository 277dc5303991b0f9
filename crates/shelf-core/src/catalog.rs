//! In-memory catalog state for an admin session.
//!
//! The store mirrors the six server collections and acts as a read-through
//! cache: after every mutation the affected collections are marked stale and
//! must be refetched wholesale. Optimistic cascade removal keeps the local
//! view displayable between the mutation and the refetch; the server remains
//! the source of truth throughout.

use std::collections::HashSet;

use uuid::Uuid;

use crate::models::{Chapter, DocumentType, EntranceExam, Note, SchoolClass, Subject};

/// The six server collections mirrored by the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    Classes,
    Subjects,
    Chapters,
    Notes,
    EntranceExams,
    DocumentTypes,
}

impl Collection {
    /// All collections, in refetch order (parents before children).
    pub const ALL: [Collection; 6] = [
        Collection::Classes,
        Collection::Subjects,
        Collection::Chapters,
        Collection::Notes,
        Collection::EntranceExams,
        Collection::DocumentTypes,
    ];
}

/// Counts of locally removed descendants after an optimistic cascade.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CascadeRemoval {
    pub subjects: usize,
    pub chapters: usize,
    pub notes: usize,
    pub document_types: usize,
}

/// A group of chapters sharing a normalized name under one subject.
#[derive(Debug, Clone)]
pub struct DuplicateChapterGroup {
    pub subject_id: Uuid,
    pub name: String,
    pub chapter_ids: Vec<Uuid>,
}

/// Per-admin-session catalog cache.
#[derive(Debug, Default)]
pub struct CatalogStore {
    classes: Vec<SchoolClass>,
    subjects: Vec<Subject>,
    chapters: Vec<Chapter>,
    notes: Vec<Note>,
    entrance_exams: Vec<EntranceExam>,
    document_types: Vec<DocumentType>,
    stale: HashSet<Collection>,
}

impl CatalogStore {
    pub fn new() -> Self {
        let mut store = Self::default();
        // Nothing has been fetched yet, so everything starts stale.
        store.invalidate_all();
        store
    }

    // --- Accessors ---------------------------------------------------------

    pub fn classes(&self) -> &[SchoolClass] {
        &self.classes
    }

    pub fn subjects(&self) -> &[Subject] {
        &self.subjects
    }

    pub fn chapters(&self) -> &[Chapter] {
        &self.chapters
    }

    pub fn notes(&self) -> &[Note] {
        &self.notes
    }

    pub fn entrance_exams(&self) -> &[EntranceExam] {
        &self.entrance_exams
    }

    pub fn document_types(&self) -> &[DocumentType] {
        &self.document_types
    }

    // --- Cache state -------------------------------------------------------

    /// Mark one collection as needing a refetch.
    pub fn invalidate(&mut self, collection: Collection) {
        self.stale.insert(collection);
    }

    /// Mark every collection as needing a refetch.
    pub fn invalidate_all(&mut self) {
        self.stale.extend(Collection::ALL);
    }

    pub fn is_stale(&self, collection: Collection) -> bool {
        self.stale.contains(&collection)
    }

    /// Collections currently awaiting a refetch.
    pub fn stale_collections(&self) -> Vec<Collection> {
        Collection::ALL
            .into_iter()
            .filter(|c| self.stale.contains(c))
            .collect()
    }

    // --- Replacement (authoritative refetch results) -----------------------

    pub fn replace_classes(&mut self, items: Vec<SchoolClass>) {
        self.classes = items;
        self.stale.remove(&Collection::Classes);
    }

    pub fn replace_subjects(&mut self, items: Vec<Subject>) {
        self.subjects = items;
        self.stale.remove(&Collection::Subjects);
    }

    pub fn replace_chapters(&mut self, items: Vec<Chapter>) {
        self.chapters = items;
        self.stale.remove(&Collection::Chapters);
    }

    pub fn replace_notes(&mut self, items: Vec<Note>) {
        self.notes = items;
        self.stale.remove(&Collection::Notes);
    }

    pub fn replace_entrance_exams(&mut self, items: Vec<EntranceExam>) {
        self.entrance_exams = items;
        self.stale.remove(&Collection::EntranceExams);
    }

    pub fn replace_document_types(&mut self, items: Vec<DocumentType>) {
        self.document_types = items;
        self.stale.remove(&Collection::DocumentTypes);
    }

    // --- Filter primitives -------------------------------------------------

    /// Subjects belonging to a class. Orphaned subjects never match.
    pub fn subjects_of(&self, class_id: Uuid) -> Vec<&Subject> {
        self.subjects
            .iter()
            .filter(|s| s.class_id.as_ref().is_some_and(|r| r.is(class_id)))
            .collect()
    }

    /// Chapters belonging to a subject.
    pub fn chapters_of(&self, subject_id: Uuid) -> Vec<&Chapter> {
        self.chapters
            .iter()
            .filter(|c| c.subject_id.is(subject_id))
            .collect()
    }

    /// Notes belonging to a chapter.
    pub fn notes_of(&self, chapter_id: Uuid) -> Vec<&Note> {
        self.notes
            .iter()
            .filter(|n| n.chapter_id.is(chapter_id))
            .collect()
    }

    pub fn class(&self, id: Uuid) -> Option<&SchoolClass> {
        self.classes.iter().find(|c| c.id == id)
    }

    pub fn subject(&self, id: Uuid) -> Option<&Subject> {
        self.subjects.iter().find(|s| s.id == id)
    }

    pub fn chapter(&self, id: Uuid) -> Option<&Chapter> {
        self.chapters.iter().find(|c| c.id == id)
    }

    /// Find a document type by case-insensitive name within a chapter.
    ///
    /// Advisory only: the local cache may be stale, so callers that need a
    /// guaranteed answer must go through the server-side ensure operation.
    pub fn find_document_type(&self, name: &str, chapter_id: Uuid) -> Option<&DocumentType> {
        self.document_types
            .iter()
            .find(|dt| dt.name.eq_ignore_ascii_case(name) && dt.chapter_id.is(chapter_id))
    }

    // --- Optimistic cascade removal ----------------------------------------

    /// Remove a class and everything beneath it from the local view.
    ///
    /// Descendants are derived at every level through the normalized
    /// reference, so the removal is consistent regardless of which shape the
    /// foreign keys arrived in. All affected collections are marked stale
    /// pending the authoritative refetch.
    pub fn remove_class_cascade(&mut self, id: Uuid) -> CascadeRemoval {
        let subject_ids: HashSet<Uuid> = self
            .subjects_of(id)
            .into_iter()
            .map(|s| s.id)
            .collect();
        let chapter_ids: HashSet<Uuid> = self
            .chapters
            .iter()
            .filter(|c| subject_ids.contains(&c.subject_id.id()))
            .map(|c| c.id)
            .collect();

        self.classes.retain(|c| c.id != id);
        self.subjects.retain(|s| !subject_ids.contains(&s.id));
        let removal = self.remove_chapters(&chapter_ids);

        self.invalidate(Collection::Classes);
        self.invalidate(Collection::Subjects);
        CascadeRemoval {
            subjects: subject_ids.len(),
            ..removal
        }
    }

    /// Remove a subject, its chapters, and those chapters' notes and
    /// document types from the local view.
    pub fn remove_subject_cascade(&mut self, id: Uuid) -> CascadeRemoval {
        let chapter_ids: HashSet<Uuid> = self
            .chapters_of(id)
            .into_iter()
            .map(|c| c.id)
            .collect();

        self.subjects.retain(|s| s.id != id);
        let removal = self.remove_chapters(&chapter_ids);

        self.invalidate(Collection::Subjects);
        CascadeRemoval {
            subjects: 1,
            ..removal
        }
    }

    /// Remove a chapter and its notes and document types from the local view.
    pub fn remove_chapter_cascade(&mut self, id: Uuid) -> CascadeRemoval {
        let mut ids = HashSet::new();
        ids.insert(id);
        self.remove_chapters(&ids)
    }

    pub fn remove_note(&mut self, id: Uuid) {
        self.notes.retain(|n| n.id != id);
        self.invalidate(Collection::Notes);
    }

    pub fn remove_entrance_exam(&mut self, id: Uuid) {
        self.entrance_exams.retain(|e| e.id != id);
        self.invalidate(Collection::EntranceExams);
    }

    pub fn remove_document_type(&mut self, id: Uuid) {
        self.document_types.retain(|dt| dt.id != id);
        self.invalidate(Collection::DocumentTypes);
    }

    fn remove_chapters(&mut self, chapter_ids: &HashSet<Uuid>) -> CascadeRemoval {
        let notes_before = self.notes.len();
        let types_before = self.document_types.len();

        self.chapters.retain(|c| !chapter_ids.contains(&c.id));
        self.notes
            .retain(|n| !chapter_ids.contains(&n.chapter_id.id()));
        self.document_types
            .retain(|dt| !chapter_ids.contains(&dt.chapter_id.id()));

        self.invalidate(Collection::Chapters);
        self.invalidate(Collection::Notes);
        self.invalidate(Collection::DocumentTypes);

        CascadeRemoval {
            subjects: 0,
            chapters: chapter_ids.len(),
            notes: notes_before - self.notes.len(),
            document_types: types_before - self.document_types.len(),
        }
    }

    // --- Cleanup queries ---------------------------------------------------

    /// Subjects whose class reference is missing or dangling.
    pub fn orphaned_subjects(&self) -> Vec<&Subject> {
        let class_ids: HashSet<Uuid> = self.classes.iter().map(|c| c.id).collect();
        self.subjects
            .iter()
            .filter(|s| match &s.class_id {
                None => true,
                Some(r) => !class_ids.contains(&r.id()),
            })
            .collect()
    }

    /// Chapters sharing a normalized name under one subject.
    pub fn duplicate_chapters(&self) -> Vec<DuplicateChapterGroup> {
        use std::collections::HashMap;

        let mut groups: HashMap<(Uuid, String), Vec<Uuid>> = HashMap::new();
        for ch in &self.chapters {
            let key = (ch.subject_id.id(), ch.name.trim().to_lowercase());
            groups.entry(key).or_default().push(ch.id);
        }

        let mut duplicates: Vec<DuplicateChapterGroup> = groups
            .into_iter()
            .filter(|(_, ids)| ids.len() > 1)
            .map(|((subject_id, name), chapter_ids)| DuplicateChapterGroup {
                subject_id,
                name,
                chapter_ids,
            })
            .collect();
        duplicates.sort_by(|a, b| a.name.cmp(&b.name));
        duplicates
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::EntityRef;

    fn uid(n: u128) -> Uuid {
        Uuid::from_u128(n)
    }

    fn class(id: u128, name: &str) -> SchoolClass {
        SchoolClass {
            id: uid(id),
            name: name.to_string(),
            created_at_utc: None,
        }
    }

    fn subject(id: u128, name: &str, class_id: Option<u128>) -> Subject {
        Subject {
            id: uid(id),
            name: name.to_string(),
            class_id: class_id.map(|c| EntityRef::Id(uid(c))),
            created_at_utc: None,
        }
    }

    // Populated shape, to prove filters are shape-agnostic.
    fn chapter(id: u128, name: &str, subject_id: u128) -> Chapter {
        Chapter {
            id: uid(id),
            name: name.to_string(),
            subject_id: EntityRef::Populated {
                id: uid(subject_id),
                name: None,
            },
            created_at_utc: None,
        }
    }

    fn note(id: u128, title: &str, chapter_id: u128, subject_id: u128) -> Note {
        Note {
            id: uid(id),
            title: title.to_string(),
            chapter_id: EntityRef::Id(uid(chapter_id)),
            subject_id: EntityRef::Id(uid(subject_id)),
            document_type_id: None,
            year: None,
            file_url: "/files/x.pdf".to_string(),
            created_at_utc: None,
        }
    }

    fn doc_type(id: u128, name: &str, chapter_id: u128) -> DocumentType {
        DocumentType {
            id: uid(id),
            name: name.to_string(),
            chapter_id: EntityRef::Id(uid(chapter_id)),
            created_at_utc: None,
        }
    }

    fn seeded_store() -> CatalogStore {
        let mut store = CatalogStore::new();
        store.replace_classes(vec![class(1, "Class 9"), class(2, "Class 10")]);
        store.replace_subjects(vec![
            subject(10, "Biology", Some(1)),
            subject(11, "Chemistry", Some(1)),
            subject(12, "Physics", Some(2)),
        ]);
        store.replace_chapters(vec![
            chapter(20, "Cell Structure", 10),
            chapter(21, "Tissues", 10),
            chapter(22, "Atoms", 11),
            chapter(23, "Motion", 12),
        ]);
        store.replace_notes(vec![
            note(30, "Ch1 Notes", 20, 10),
            note(31, "Ch2 Notes", 21, 10),
            note(32, "Atoms Notes", 22, 11),
            note(33, "Motion Notes", 23, 12),
        ]);
        store.replace_document_types(vec![
            doc_type(40, "Past Paper", 20),
            doc_type(41, "Past Paper", 23),
        ]);
        store.replace_entrance_exams(vec![]);
        store
    }

    #[test]
    fn test_new_store_starts_fully_stale() {
        let store = CatalogStore::new();
        for c in Collection::ALL {
            assert!(store.is_stale(c));
        }
    }

    #[test]
    fn test_replace_clears_staleness() {
        let store = seeded_store();
        for c in Collection::ALL {
            assert!(!store.is_stale(c), "{:?} should be fresh", c);
        }
    }

    #[test]
    fn test_subjects_of_filters_by_class() {
        let store = seeded_store();
        let names: Vec<&str> = store.subjects_of(uid(1)).iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["Biology", "Chemistry"]);
    }

    #[test]
    fn test_chapters_of_matches_populated_references() {
        let store = seeded_store();
        assert_eq!(store.chapters_of(uid(10)).len(), 2);
        assert_eq!(store.chapters_of(uid(12)).len(), 1);
    }

    #[test]
    fn test_remove_class_cascade_removes_all_descendants() {
        let mut store = seeded_store();
        let removal = store.remove_class_cascade(uid(1));

        assert_eq!(
            removal,
            CascadeRemoval {
                subjects: 2,
                chapters: 3,
                notes: 3,
                document_types: 1,
            }
        );
        assert_eq!(store.classes().len(), 1);
        assert!(store.subjects_of(uid(1)).is_empty());
        assert!(store.chapters_of(uid(10)).is_empty());
        // Unrelated branch untouched.
        assert_eq!(store.notes_of(uid(23)).len(), 1);
    }

    #[test]
    fn test_remove_class_cascade_invalidates_affected_collections() {
        let mut store = seeded_store();
        store.remove_class_cascade(uid(1));
        for c in [
            Collection::Classes,
            Collection::Subjects,
            Collection::Chapters,
            Collection::Notes,
            Collection::DocumentTypes,
        ] {
            assert!(store.is_stale(c), "{:?} should be stale", c);
        }
        assert!(!store.is_stale(Collection::EntranceExams));
    }

    #[test]
    fn test_remove_subject_cascade_removes_notes_and_doc_types() {
        let mut store = seeded_store();
        let removal = store.remove_subject_cascade(uid(10));
        assert_eq!(removal.chapters, 2);
        assert_eq!(removal.notes, 2);
        assert!(store.subject(uid(10)).is_none());
        assert!(store.notes_of(uid(20)).is_empty());
        assert!(store.find_document_type("Past Paper", uid(20)).is_none());
    }

    #[test]
    fn test_remove_chapter_cascade_removes_one_branch() {
        let mut store = seeded_store();
        let removal = store.remove_chapter_cascade(uid(20));
        assert_eq!(removal.chapters, 1);
        assert_eq!(removal.notes, 1);
        assert_eq!(removal.document_types, 1);
        assert!(store.chapter(uid(21)).is_some());
    }

    #[test]
    fn test_find_document_type_is_case_insensitive() {
        let store = seeded_store();
        let dt = store.find_document_type("past paper", uid(20)).unwrap();
        assert_eq!(dt.id, uid(40));
        assert!(store.find_document_type("past paper", uid(22)).is_none());
    }

    #[test]
    fn test_orphaned_subjects_detects_missing_and_dangling() {
        let mut store = seeded_store();
        store.replace_subjects(vec![
            subject(10, "Biology", Some(1)),
            subject(13, "Astronomy", None),
            subject(14, "Geology", Some(99)),
        ]);
        let names: Vec<&str> = store
            .orphaned_subjects()
            .iter()
            .map(|s| s.name.as_str())
            .collect();
        assert_eq!(names, vec!["Astronomy", "Geology"]);
    }

    #[test]
    fn test_duplicate_chapters_groups_by_normalized_name() {
        let mut store = seeded_store();
        store.replace_chapters(vec![
            chapter(20, "Cell Structure", 10),
            chapter(24, "cell structure ", 10),
            chapter(22, "Atoms", 11),
        ]);
        let dups = store.duplicate_chapters();
        assert_eq!(dups.len(), 1);
        assert_eq!(dups[0].subject_id, uid(10));
        assert_eq!(dups[0].chapter_ids.len(), 2);
    }

    #[test]
    fn test_remove_note_only_touches_notes() {
        let mut store = seeded_store();
        store.remove_note(uid(30));
        assert_eq!(store.notes().len(), 3);
        assert!(store.is_stale(Collection::Notes));
        assert!(!store.is_stale(Collection::Chapters));
    }
}
