//! Dependent selection chain for class → subject → chapter pickers.
//!
//! Each selector is unavailable until its parent has a value, and changing
//! an ancestor always clears every descendant selection. Options are always
//! derived from the catalog store through the normalized reference, never by
//! comparing raw foreign key fields.

use uuid::Uuid;

use crate::catalog::CatalogStore;
use crate::error::{Error, Result};
use crate::models::{Chapter, Subject};

/// Tracks a class/subject/chapter selection against a catalog store.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SelectionChain {
    class: Option<Uuid>,
    subject: Option<Uuid>,
    chapter: Option<Uuid>,
}

impl SelectionChain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn class(&self) -> Option<Uuid> {
        self.class
    }

    pub fn subject(&self) -> Option<Uuid> {
        self.subject
    }

    pub fn chapter(&self) -> Option<Uuid> {
        self.chapter
    }

    /// Whether the subject selector is available.
    pub fn subject_enabled(&self) -> bool {
        self.class.is_some()
    }

    /// Whether the chapter selector is available.
    pub fn chapter_enabled(&self) -> bool {
        self.subject.is_some()
    }

    /// Select a class, clearing any subject and chapter selection.
    ///
    /// `None` clears the whole chain.
    pub fn select_class(&mut self, store: &CatalogStore, id: Option<Uuid>) -> Result<()> {
        if let Some(id) = id {
            if store.class(id).is_none() {
                return Err(Error::NotFound(format!("Class {} not in catalog", id)));
            }
        }
        self.class = id;
        self.subject = None;
        self.chapter = None;
        Ok(())
    }

    /// Select a subject from the current class's options, clearing any
    /// chapter selection.
    pub fn select_subject(&mut self, store: &CatalogStore, id: Option<Uuid>) -> Result<()> {
        let Some(class_id) = self.class else {
            return Err(Error::InvalidInput(
                "Select a class before selecting a subject".to_string(),
            ));
        };
        if let Some(id) = id {
            let valid = store.subjects_of(class_id).iter().any(|s| s.id == id);
            if !valid {
                return Err(Error::InvalidInput(format!(
                    "Subject {} is not an option for the selected class",
                    id
                )));
            }
        }
        self.subject = id;
        self.chapter = None;
        Ok(())
    }

    /// Select a chapter from the current subject's options.
    pub fn select_chapter(&mut self, store: &CatalogStore, id: Option<Uuid>) -> Result<()> {
        let Some(subject_id) = self.subject else {
            return Err(Error::InvalidInput(
                "Select a subject before selecting a chapter".to_string(),
            ));
        };
        if let Some(id) = id {
            let valid = store.chapters_of(subject_id).iter().any(|c| c.id == id);
            if !valid {
                return Err(Error::InvalidInput(format!(
                    "Chapter {} is not an option for the selected subject",
                    id
                )));
            }
        }
        self.chapter = id;
        Ok(())
    }

    /// Subject options for the current class selection.
    pub fn subject_options<'a>(&self, store: &'a CatalogStore) -> Vec<&'a Subject> {
        match self.class {
            Some(class_id) => store.subjects_of(class_id),
            None => Vec::new(),
        }
    }

    /// Chapter options for the current subject selection.
    pub fn chapter_options<'a>(&self, store: &'a CatalogStore) -> Vec<&'a Chapter> {
        match self.subject {
            Some(subject_id) => store.chapters_of(subject_id),
            None => Vec::new(),
        }
    }

    /// Drop selections that no longer resolve after a store refresh.
    ///
    /// Clearing is top-down: losing the class clears everything beneath it.
    pub fn reconcile(&mut self, store: &CatalogStore) {
        if let Some(class_id) = self.class {
            if store.class(class_id).is_none() {
                self.class = None;
                self.subject = None;
                self.chapter = None;
                return;
            }
        }
        if let (Some(class_id), Some(subject_id)) = (self.class, self.subject) {
            if !store.subjects_of(class_id).iter().any(|s| s.id == subject_id) {
                self.subject = None;
                self.chapter = None;
                return;
            }
        }
        if let (Some(subject_id), Some(chapter_id)) = (self.subject, self.chapter) {
            if !store.chapters_of(subject_id).iter().any(|c| c.id == chapter_id) {
                self.chapter = None;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{EntityRef, SchoolClass, Subject};

    fn uid(n: u128) -> Uuid {
        Uuid::from_u128(n)
    }

    fn store() -> CatalogStore {
        let mut store = CatalogStore::new();
        store.replace_classes(vec![
            SchoolClass {
                id: uid(1),
                name: "Class 10".to_string(),
                created_at_utc: None,
            },
            SchoolClass {
                id: uid(2),
                name: "Class 11".to_string(),
                created_at_utc: None,
            },
        ]);
        store.replace_subjects(vec![
            Subject {
                id: uid(10),
                name: "Biology".to_string(),
                class_id: Some(EntityRef::Id(uid(1))),
                created_at_utc: None,
            },
            Subject {
                id: uid(11),
                name: "Maths".to_string(),
                class_id: Some(EntityRef::Populated {
                    id: uid(2),
                    name: Some("Class 11".to_string()),
                }),
                created_at_utc: None,
            },
        ]);
        store.replace_chapters(vec![crate::models::Chapter {
            id: uid(20),
            name: "Cell Structure".to_string(),
            subject_id: EntityRef::Id(uid(10)),
            created_at_utc: None,
        }]);
        store
    }

    #[test]
    fn test_child_selectors_disabled_until_parent_selected() {
        let store = store();
        let mut chain = SelectionChain::new();
        assert!(!chain.subject_enabled());
        assert!(chain.select_subject(&store, Some(uid(10))).is_err());

        chain.select_class(&store, Some(uid(1))).unwrap();
        assert!(chain.subject_enabled());
        assert!(!chain.chapter_enabled());
        assert!(chain.select_chapter(&store, Some(uid(20))).is_err());
    }

    #[test]
    fn test_options_follow_parent_selection() {
        let store = store();
        let mut chain = SelectionChain::new();
        assert!(chain.subject_options(&store).is_empty());

        chain.select_class(&store, Some(uid(1))).unwrap();
        let options: Vec<Uuid> = chain.subject_options(&store).iter().map(|s| s.id).collect();
        assert_eq!(options, vec![uid(10)]);

        chain.select_class(&store, Some(uid(2))).unwrap();
        let options: Vec<Uuid> = chain.subject_options(&store).iter().map(|s| s.id).collect();
        assert_eq!(options, vec![uid(11)]);
    }

    #[test]
    fn test_changing_ancestor_clears_descendants() {
        let store = store();
        let mut chain = SelectionChain::new();
        chain.select_class(&store, Some(uid(1))).unwrap();
        chain.select_subject(&store, Some(uid(10))).unwrap();
        chain.select_chapter(&store, Some(uid(20))).unwrap();

        chain.select_class(&store, Some(uid(2))).unwrap();
        assert_eq!(chain.subject(), None);
        assert_eq!(chain.chapter(), None);

        // Changing the subject clears only the chapter.
        chain.select_class(&store, Some(uid(1))).unwrap();
        chain.select_subject(&store, Some(uid(10))).unwrap();
        chain.select_chapter(&store, Some(uid(20))).unwrap();
        chain.select_subject(&store, Some(uid(10))).unwrap();
        assert_eq!(chain.chapter(), None);
    }

    #[test]
    fn test_rejects_option_outside_parent_scope() {
        let store = store();
        let mut chain = SelectionChain::new();
        chain.select_class(&store, Some(uid(1))).unwrap();
        // Maths belongs to Class 11.
        assert!(chain.select_subject(&store, Some(uid(11))).is_err());
    }

    #[test]
    fn test_reconcile_clears_removed_selection() {
        let mut store = store();
        let mut chain = SelectionChain::new();
        chain.select_class(&store, Some(uid(1))).unwrap();
        chain.select_subject(&store, Some(uid(10))).unwrap();
        chain.select_chapter(&store, Some(uid(20))).unwrap();

        store.remove_subject_cascade(uid(10));
        chain.reconcile(&store);

        assert_eq!(chain.class(), Some(uid(1)));
        assert_eq!(chain.subject(), None);
        assert_eq!(chain.chapter(), None);
    }
}
