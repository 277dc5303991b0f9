//! Admin catalog: a resource client paired with the in-memory catalog store.
//!
//! Deletes apply the local cascade immediately for a responsive view, then
//! refetch from the server, which is authoritative. If the request fails the
//! local store is left untouched.

use tracing::{debug, info};
use uuid::Uuid;

use shelf_core::{
    CatalogStore, Collection, DuplicateChapterGroup, ExamUpload, NoteUpload, Result, Subject,
};

use crate::client::ResourceClient;

/// Document type name applied to past paper uploads.
pub const PAST_PAPER_TYPE_NAME: &str = "Past Paper";

pub struct AdminCatalog {
    client: ResourceClient,
    store: CatalogStore,
}

impl AdminCatalog {
    pub fn new(client: ResourceClient) -> Self {
        Self {
            client,
            store: CatalogStore::new(),
        }
    }

    pub fn store(&self) -> &CatalogStore {
        &self.store
    }

    pub fn client(&self) -> &ResourceClient {
        &self.client
    }

    pub async fn login(&mut self, email: &str, password: &str) -> Result<()> {
        self.client.login(email, password).await
    }

    pub async fn logout(&mut self) -> Result<()> {
        self.client.logout().await
    }

    // -----------------------------------------------------------------------
    // Refresh
    // -----------------------------------------------------------------------

    /// Refetch every collection from the server.
    pub async fn refresh_all(&mut self) -> Result<()> {
        for collection in Collection::ALL {
            self.refresh(collection).await?;
        }
        info!(
            subsystem = "client",
            component = "admin_catalog",
            op = "refresh_all",
            "Catalog refreshed"
        );
        Ok(())
    }

    /// Refetch one collection.
    pub async fn refresh(&mut self, collection: Collection) -> Result<()> {
        match collection {
            Collection::Classes => {
                let items = self.client.list_classes().await?;
                self.store.replace_classes(items);
            }
            Collection::Subjects => {
                let items = self.client.list_subjects().await?;
                self.store.replace_subjects(items);
            }
            Collection::Chapters => {
                let items = self.client.list_chapters().await?;
                self.store.replace_chapters(items);
            }
            Collection::Notes => {
                let items = self.client.list_notes().await?;
                self.store.replace_notes(items);
            }
            Collection::EntranceExams => {
                let items = self.client.list_entrance_exams().await?;
                self.store.replace_entrance_exams(items);
            }
            Collection::DocumentTypes => {
                let items = self.client.list_document_types().await?;
                self.store.replace_document_types(items);
            }
        }
        debug!(
            subsystem = "client",
            component = "admin_catalog",
            op = "refresh",
            collection = ?collection,
            "Collection refreshed"
        );
        Ok(())
    }

    /// Refetch only the collections currently marked stale.
    pub async fn refresh_stale(&mut self) -> Result<()> {
        for collection in self.store.stale_collections() {
            self.refresh(collection).await?;
        }
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Creates
    // -----------------------------------------------------------------------

    pub async fn create_class(&mut self, name: &str) -> Result<Uuid> {
        let id = self.client.create_class(name).await?;
        self.refresh(Collection::Classes).await?;
        Ok(id)
    }

    pub async fn create_subject(&mut self, name: &str, class_id: Uuid) -> Result<Uuid> {
        let id = self.client.create_subject(name, class_id).await?;
        self.refresh(Collection::Subjects).await?;
        Ok(id)
    }

    pub async fn create_chapter(&mut self, name: &str, subject_id: Uuid) -> Result<Uuid> {
        let id = self.client.create_chapter(name, subject_id).await?;
        self.refresh(Collection::Chapters).await?;
        Ok(id)
    }

    // -----------------------------------------------------------------------
    // Deletes (optimistic cascade, then refetch)
    // -----------------------------------------------------------------------

    pub async fn delete_class(&mut self, id: Uuid) -> Result<()> {
        self.client.delete_class(id).await?;
        self.store.remove_class_cascade(id);
        self.refresh_stale().await
    }

    pub async fn delete_subject(&mut self, id: Uuid) -> Result<()> {
        self.client.delete_subject(id).await?;
        self.store.remove_subject_cascade(id);
        self.refresh_stale().await
    }

    pub async fn delete_chapter(&mut self, id: Uuid) -> Result<()> {
        self.client.delete_chapter(id).await?;
        self.store.remove_chapter_cascade(id);
        self.refresh_stale().await
    }

    pub async fn delete_note(&mut self, id: Uuid) -> Result<()> {
        self.client.delete_note(id).await?;
        self.store.remove_note(id);
        self.refresh_stale().await
    }

    pub async fn delete_entrance_exam(&mut self, id: Uuid) -> Result<()> {
        self.client.delete_entrance_exam(id).await?;
        self.store.remove_entrance_exam(id);
        self.refresh_stale().await
    }

    pub async fn delete_document_type(&mut self, id: Uuid) -> Result<()> {
        self.client.delete_document_type(id).await?;
        self.store.remove_document_type(id);
        self.refresh_stale().await
    }

    // -----------------------------------------------------------------------
    // Uploads
    // -----------------------------------------------------------------------

    /// Validate and upload a note, then refetch the notes collection.
    ///
    /// Validation failures reject the upload before any request is issued.
    pub async fn upload_note(&mut self, upload: NoteUpload) -> Result<Uuid> {
        upload.validate()?;
        let id = self.client.upload_note(&upload).await?;
        self.refresh(Collection::Notes).await?;
        Ok(id)
    }

    /// Upload a past paper: a note tagged with the chapter's "Past Paper"
    /// document type, created on demand.
    ///
    /// The local cache lookup is advisory only; the server-side ensure call
    /// is what guarantees a single type per chapter.
    pub async fn upload_past_paper(&mut self, mut upload: NoteUpload) -> Result<Uuid> {
        let (chapter_id, _) = upload.validate()?;

        let cached = self
            .store
            .find_document_type(PAST_PAPER_TYPE_NAME, chapter_id)
            .map(|dt| dt.id);
        let document_type_id = match cached {
            Some(id) => id,
            None => {
                let id = self
                    .client
                    .ensure_document_type(PAST_PAPER_TYPE_NAME, chapter_id)
                    .await?;
                self.refresh(Collection::DocumentTypes).await?;
                id
            }
        };

        upload.document_type_id = Some(document_type_id);
        let id = self.client.upload_note(&upload).await?;
        self.refresh(Collection::Notes).await?;
        Ok(id)
    }

    /// Validate and upload an entrance exam, then refetch the collection.
    pub async fn upload_exam(&mut self, upload: ExamUpload) -> Result<Uuid> {
        upload.validate()?;
        let id = self.client.upload_entrance_exam(&upload).await?;
        self.refresh(Collection::EntranceExams).await?;
        Ok(id)
    }

    // -----------------------------------------------------------------------
    // Cleanup panel queries
    // -----------------------------------------------------------------------

    /// Subjects whose class reference is missing or dangling.
    pub fn orphaned_subjects(&self) -> Vec<&Subject> {
        self.store.orphaned_subjects()
    }

    /// Chapters sharing a name under the same subject.
    pub fn duplicate_chapters(&self) -> Vec<DuplicateChapterGroup> {
        self.store.duplicate_chapters()
    }
}
