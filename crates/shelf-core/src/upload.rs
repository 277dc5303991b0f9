//! Upload payload assembly and validation.
//!
//! Validation runs before any network request is issued: a missing file or
//! missing chapter selection never reaches the wire.

use uuid::Uuid;

use crate::error::{Error, Result};

/// Maximum accepted PDF size in bytes (25 MiB).
pub const MAX_PDF_BYTES: usize = 25 * 1024 * 1024;

/// Maximum accepted length for the free-text year field.
pub const MAX_YEAR_LEN: usize = 32;

/// PDF files start with this magic sequence.
const PDF_MAGIC: &[u8] = b"%PDF-";

/// Validate that uploaded bytes look like an acceptable PDF.
pub fn validate_pdf(filename: &str, data: &[u8]) -> Result<()> {
    if data.is_empty() {
        return Err(Error::InvalidInput(format!(
            "File '{}' is empty",
            filename
        )));
    }
    if data.len() > MAX_PDF_BYTES {
        return Err(Error::InvalidInput(format!(
            "File '{}' exceeds maximum size of {} bytes",
            filename, MAX_PDF_BYTES
        )));
    }
    if !data.starts_with(PDF_MAGIC) {
        return Err(Error::InvalidInput(format!(
            "File '{}' is not a PDF",
            filename
        )));
    }
    Ok(())
}

/// A note (or past paper) upload: PDF bytes plus parent identifiers.
#[derive(Debug, Clone)]
pub struct NoteUpload {
    pub file_name: String,
    pub data: Vec<u8>,
    pub chapter_id: Option<Uuid>,
    pub subject_id: Option<Uuid>,
    pub document_type_id: Option<Uuid>,
    /// Defaults to the file name when blank.
    pub title: Option<String>,
    /// Free text; supports values like "2023-Supplementary".
    pub year: Option<String>,
}

impl NoteUpload {
    /// The title to submit: the explicit title when present and non-blank,
    /// the file name otherwise.
    pub fn effective_title(&self) -> &str {
        match self.title.as_deref().map(str::trim) {
            Some(t) if !t.is_empty() => t,
            _ => &self.file_name,
        }
    }

    /// The year to submit, trimmed; blank years are dropped.
    pub fn effective_year(&self) -> Option<&str> {
        self.year
            .as_deref()
            .map(str::trim)
            .filter(|y| !y.is_empty())
    }

    /// Check required fields and file contents.
    pub fn validate(&self) -> Result<(Uuid, Uuid)> {
        let chapter_id = self
            .chapter_id
            .ok_or_else(|| Error::InvalidInput("Select a chapter before uploading".to_string()))?;
        let subject_id = self
            .subject_id
            .ok_or_else(|| Error::InvalidInput("Select a subject before uploading".to_string()))?;
        validate_pdf(&self.file_name, &self.data)?;
        if let Some(year) = self.effective_year() {
            if year.len() > MAX_YEAR_LEN {
                return Err(Error::InvalidInput(format!(
                    "Year value exceeds {} characters",
                    MAX_YEAR_LEN
                )));
            }
        }
        Ok((chapter_id, subject_id))
    }
}

/// An entrance exam upload: PDF bytes plus a display name.
#[derive(Debug, Clone)]
pub struct ExamUpload {
    pub name: String,
    pub file_name: String,
    pub data: Vec<u8>,
}

impl ExamUpload {
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(Error::InvalidInput(
                "Exam name must not be empty".to_string(),
            ));
        }
        validate_pdf(&self.file_name, &self.data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pdf_bytes() -> Vec<u8> {
        b"%PDF-1.7 minimal".to_vec()
    }

    fn upload() -> NoteUpload {
        NoteUpload {
            file_name: "ch1-notes.pdf".to_string(),
            data: pdf_bytes(),
            chapter_id: Some(Uuid::from_u128(1)),
            subject_id: Some(Uuid::from_u128(2)),
            document_type_id: None,
            title: None,
            year: None,
        }
    }

    #[test]
    fn test_valid_upload_passes() {
        assert!(upload().validate().is_ok());
    }

    #[test]
    fn test_missing_file_blocks_upload() {
        let mut u = upload();
        u.data = Vec::new();
        let err = u.validate().unwrap_err();
        assert!(err.to_string().contains("empty"));
    }

    #[test]
    fn test_missing_chapter_blocks_upload() {
        let mut u = upload();
        u.chapter_id = None;
        let err = u.validate().unwrap_err();
        assert!(err.to_string().contains("chapter"));
    }

    #[test]
    fn test_non_pdf_rejected() {
        let mut u = upload();
        u.data = b"GIF89a not a pdf".to_vec();
        assert!(u.validate().is_err());
    }

    #[test]
    fn test_title_defaults_to_filename() {
        let mut u = upload();
        assert_eq!(u.effective_title(), "ch1-notes.pdf");
        u.title = Some("   ".to_string());
        assert_eq!(u.effective_title(), "ch1-notes.pdf");
        u.title = Some("Cell Structure Notes".to_string());
        assert_eq!(u.effective_title(), "Cell Structure Notes");
    }

    #[test]
    fn test_year_is_free_text_but_trimmed_and_capped() {
        let mut u = upload();
        u.year = Some(" 2023-Supplementary ".to_string());
        assert_eq!(u.effective_year(), Some("2023-Supplementary"));
        assert!(u.validate().is_ok());

        u.year = Some("x".repeat(MAX_YEAR_LEN + 1));
        assert!(u.validate().is_err());

        u.year = Some("  ".to_string());
        assert_eq!(u.effective_year(), None);
    }

    #[test]
    fn test_exam_upload_requires_name() {
        let exam = ExamUpload {
            name: " ".to_string(),
            file_name: "mdcat-2024.pdf".to_string(),
            data: pdf_bytes(),
        };
        assert!(exam.validate().is_err());
    }

    #[test]
    fn test_oversized_pdf_rejected() {
        let mut data = pdf_bytes();
        data.resize(MAX_PDF_BYTES + 1, 0);
        assert!(validate_pdf("big.pdf", &data).is_err());
    }
}
