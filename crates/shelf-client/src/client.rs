//! HTTP resource client for the studyshelf API.

use reqwest::multipart;
use serde::Deserialize;
use uuid::Uuid;

use shelf_core::{
    Chapter, CreateChapterRequest, CreateClassRequest, CreateDocumentTypeRequest,
    CreateSubjectRequest, DocumentType, EntranceExam, Error, ExamUpload, Note, NoteUpload, Result,
    SchoolClass, Subject,
};

#[derive(Debug, Deserialize)]
struct Created {
    id: Uuid,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LoginBody {
    token: String,
}

/// JSON and multipart client for one studyshelf server.
///
/// The base URL points at the API root, e.g. `http://localhost:4000/api`.
/// Mutating calls carry the bearer token obtained via [`login`](Self::login).
pub struct ResourceClient {
    http: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

impl ResourceClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            http: reqwest::Client::new(),
            base_url,
            token: None,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    /// Resolve a stored `file_url` to something fetchable.
    ///
    /// Absolute URLs pass through untouched. Root-relative paths are joined
    /// to the server origin, which is the base URL minus its `/api` suffix.
    pub fn asset_url(&self, file_url: &str) -> String {
        if file_url.starts_with("http://") || file_url.starts_with("https://") {
            return file_url.to_string();
        }
        let origin = self.base_url.strip_suffix("/api").unwrap_or(&self.base_url);
        format!("{}{}", origin, file_url)
    }

    // -----------------------------------------------------------------------
    // Sessions
    // -----------------------------------------------------------------------

    pub async fn login(&mut self, email: &str, password: &str) -> Result<()> {
        let resp = self
            .http
            .post(format!("{}/auth/login", self.base_url))
            .json(&serde_json::json!({ "email": email, "password": password }))
            .send()
            .await?;
        let body: LoginBody = Self::check(resp).await?.json().await?;
        self.token = Some(body.token);
        Ok(())
    }

    pub async fn logout(&mut self) -> Result<()> {
        let req = self.authed(self.http.post(format!("{}/auth/logout", self.base_url)))?;
        Self::check(req.send().await?).await?;
        self.token = None;
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Collections
    // -----------------------------------------------------------------------

    pub async fn list_classes(&self) -> Result<Vec<SchoolClass>> {
        self.get_json("/classes").await
    }

    pub async fn create_class(&self, name: &str) -> Result<Uuid> {
        self.post_created(
            "/classes",
            &CreateClassRequest {
                name: name.to_string(),
            },
        )
        .await
    }

    pub async fn delete_class(&self, id: Uuid) -> Result<()> {
        self.delete_path(&format!("/classes/{}", id)).await
    }

    pub async fn list_subjects(&self) -> Result<Vec<Subject>> {
        self.get_json("/subjects").await
    }

    pub async fn create_subject(&self, name: &str, class_id: Uuid) -> Result<Uuid> {
        self.post_created(
            "/subjects",
            &CreateSubjectRequest {
                name: name.to_string(),
                class_id,
            },
        )
        .await
    }

    pub async fn delete_subject(&self, id: Uuid) -> Result<()> {
        self.delete_path(&format!("/subjects/{}", id)).await
    }

    pub async fn list_chapters(&self) -> Result<Vec<Chapter>> {
        self.get_json("/chapters").await
    }

    pub async fn create_chapter(&self, name: &str, subject_id: Uuid) -> Result<Uuid> {
        self.post_created(
            "/chapters",
            &CreateChapterRequest {
                name: name.to_string(),
                subject_id,
            },
        )
        .await
    }

    pub async fn delete_chapter(&self, id: Uuid) -> Result<()> {
        self.delete_path(&format!("/chapters/{}", id)).await
    }

    pub async fn list_document_types(&self) -> Result<Vec<DocumentType>> {
        self.get_json("/document-types").await
    }

    pub async fn create_document_type(&self, name: &str, chapter_id: Uuid) -> Result<Uuid> {
        self.post_created(
            "/document-types",
            &CreateDocumentTypeRequest {
                name: name.to_string(),
                chapter_id,
            },
        )
        .await
    }

    /// Find-or-create a document type on the server, idempotently.
    pub async fn ensure_document_type(&self, name: &str, chapter_id: Uuid) -> Result<Uuid> {
        self.post_created(
            "/document-types/ensure",
            &serde_json::json!({ "name": name, "chapterId": chapter_id }),
        )
        .await
    }

    pub async fn delete_document_type(&self, id: Uuid) -> Result<()> {
        self.delete_path(&format!("/document-types/{}", id)).await
    }

    pub async fn list_notes(&self) -> Result<Vec<Note>> {
        self.get_json("/notes").await
    }

    /// Upload a note PDF as multipart/form-data.
    ///
    /// The caller is expected to have run [`NoteUpload::validate`] already;
    /// this method sends whatever it is given.
    pub async fn upload_note(&self, upload: &NoteUpload) -> Result<Uuid> {
        let pdf = multipart::Part::bytes(upload.data.clone())
            .file_name(upload.file_name.clone())
            .mime_str("application/pdf")
            .map_err(|e| Error::InvalidInput(format!("Invalid MIME type: {}", e)))?;

        let mut form = multipart::Form::new()
            .part("pdf", pdf)
            .text("title", upload.effective_title().to_string());
        if let Some(chapter_id) = upload.chapter_id {
            form = form.text("chapterId", chapter_id.to_string());
        }
        if let Some(subject_id) = upload.subject_id {
            form = form.text("subjectId", subject_id.to_string());
        }
        if let Some(document_type_id) = upload.document_type_id {
            form = form.text("documentTypeId", document_type_id.to_string());
        }
        if let Some(year) = upload.effective_year() {
            form = form.text("year", year.to_string());
        }

        let req = self.authed(
            self.http
                .post(format!("{}/notes", self.base_url))
                .multipart(form),
        )?;
        let created: Created = Self::check(req.send().await?).await?.json().await?;
        Ok(created.id)
    }

    pub async fn delete_note(&self, id: Uuid) -> Result<()> {
        self.delete_path(&format!("/notes/{}", id)).await
    }

    pub async fn list_entrance_exams(&self) -> Result<Vec<EntranceExam>> {
        self.get_json("/entrance-exams").await
    }

    pub async fn upload_entrance_exam(&self, upload: &ExamUpload) -> Result<Uuid> {
        let pdf = multipart::Part::bytes(upload.data.clone())
            .file_name(upload.file_name.clone())
            .mime_str("application/pdf")
            .map_err(|e| Error::InvalidInput(format!("Invalid MIME type: {}", e)))?;

        let form = multipart::Form::new()
            .part("pdf", pdf)
            .text("name", upload.name.clone());

        let req = self.authed(
            self.http
                .post(format!("{}/entrance-exams", self.base_url))
                .multipart(form),
        )?;
        let created: Created = Self::check(req.send().await?).await?.json().await?;
        Ok(created.id)
    }

    pub async fn delete_entrance_exam(&self, id: Uuid) -> Result<()> {
        self.delete_path(&format!("/entrance-exams/{}", id)).await
    }

    // -----------------------------------------------------------------------
    // Internals
    // -----------------------------------------------------------------------

    fn authed(&self, builder: reqwest::RequestBuilder) -> Result<reqwest::RequestBuilder> {
        let token = self
            .token
            .as_deref()
            .ok_or_else(|| Error::Unauthorized("Not logged in".to_string()))?;
        Ok(builder.bearer_auth(token))
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, path: &str) -> Result<T> {
        let resp = self
            .http
            .get(format!("{}{}", self.base_url, path))
            .send()
            .await?;
        Ok(Self::check(resp).await?.json().await?)
    }

    async fn post_created<B: serde::Serialize>(&self, path: &str, body: &B) -> Result<Uuid> {
        let req = self.authed(
            self.http
                .post(format!("{}{}", self.base_url, path))
                .json(body),
        )?;
        let created: Created = Self::check(req.send().await?).await?.json().await?;
        Ok(created.id)
    }

    async fn delete_path(&self, path: &str) -> Result<()> {
        let req = self.authed(self.http.delete(format!("{}{}", self.base_url, path)))?;
        Self::check(req.send().await?).await?;
        Ok(())
    }

    /// Map non-2xx responses onto domain errors using the server's
    /// `{"error": msg}` body.
    async fn check(resp: reqwest::Response) -> Result<reqwest::Response> {
        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }

        let message = resp
            .json::<ErrorBody>()
            .await
            .map(|b| b.error)
            .unwrap_or_else(|_| format!("Request failed with status {}", status));

        Err(match status.as_u16() {
            400 => Error::InvalidInput(message),
            401 => Error::Unauthorized(message),
            404 => Error::NotFound(message),
            _ => Error::Internal(message),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_trailing_slash_is_trimmed() {
        let client = ResourceClient::new("http://localhost:4000/api/");
        assert_eq!(client.base_url(), "http://localhost:4000/api");
    }

    #[test]
    fn test_asset_url_passes_absolute_urls_through() {
        let client = ResourceClient::new("http://localhost:4000/api");
        assert_eq!(
            client.asset_url("https://cdn.example.com/x.pdf"),
            "https://cdn.example.com/x.pdf"
        );
        assert_eq!(
            client.asset_url("http://other.example.com/y.pdf"),
            "http://other.example.com/y.pdf"
        );
    }

    #[test]
    fn test_asset_url_joins_relative_paths_to_origin() {
        let client = ResourceClient::new("http://localhost:4000/api");
        assert_eq!(
            client.asset_url("/files/blobs/ab/cd/x.pdf"),
            "http://localhost:4000/files/blobs/ab/cd/x.pdf"
        );
    }

    #[test]
    fn test_asset_url_without_api_suffix() {
        let client = ResourceClient::new("http://localhost:4000");
        assert_eq!(
            client.asset_url("/files/a.pdf"),
            "http://localhost:4000/files/a.pdf"
        );
    }

    #[test]
    fn test_mutations_require_login() {
        let client = ResourceClient::new("http://localhost:4000/api");
        let err = client
            .authed(reqwest::Client::new().post("http://localhost:4000/api/classes"))
            .err()
            .unwrap();
        assert!(matches!(err, Error::Unauthorized(_)));
    }
}
