//! PDF blob storage with a pluggable backend.
//!
//! Uploaded files are written under UUIDv7-sharded paths
//! (`blobs/{first-2-hex}/{next-2-hex}/{uuid}.pdf`) with atomic
//! temp-file-plus-rename writes. Rows in `note` and `entrance_exam` carry
//! both the public `file_url` and the backend `storage_path`.

use async_trait::async_trait;
use std::path::PathBuf;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{debug, warn};
use uuid::Uuid;

use shelf_core::Result;

/// Storage backend trait for different storage implementations.
///
/// Allows abstracting over filesystem, S3, or other storage providers.
#[async_trait]
pub trait StorageBackend: Send + Sync {
    /// Write data to the specified path.
    async fn write(&self, path: &str, data: &[u8]) -> Result<()>;

    /// Read data from the specified path.
    async fn read(&self, path: &str) -> Result<Vec<u8>>;

    /// Delete data at the specified path.
    async fn delete(&self, path: &str) -> Result<()>;

    /// Check if data exists at the specified path.
    async fn exists(&self, path: &str) -> Result<bool>;
}

/// Generate the sharded storage path for a blob id.
pub fn generate_storage_path(id: Uuid) -> String {
    let hex = id.simple().to_string();
    format!("blobs/{}/{}/{}.pdf", &hex[0..2], &hex[2..4], id)
}

/// Public URL under which a stored blob is served.
pub fn file_url_for(storage_path: &str) -> String {
    format!("/files/{}", storage_path)
}

/// Filesystem storage backend.
pub struct FilesystemBackend {
    base_path: PathBuf,
}

impl FilesystemBackend {
    /// Create a new filesystem backend with the given base directory.
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
        }
    }

    fn full_path(&self, path: &str) -> PathBuf {
        self.base_path.join(path)
    }

    /// Validate that the storage backend can write, read, and delete files.
    ///
    /// Performs a full round-trip test at startup to catch filesystem issues
    /// (permission errors, missing directories) early.
    pub async fn validate(&self) -> std::result::Result<(), String> {
        let test_dir = self.base_path.join("blobs/.health-check");
        let test_file = test_dir.join("test.bin");

        fs::create_dir_all(&test_dir)
            .await
            .map_err(|e| format!("create_dir_all({:?}): {}", test_dir, e))?;

        let data = b"storage-health-check";
        fs::write(&test_file, data)
            .await
            .map_err(|e| format!("write({:?}): {}", test_file, e))?;

        let read_data = fs::read(&test_file)
            .await
            .map_err(|e| format!("read({:?}): {}", test_file, e))?;
        if read_data != data {
            return Err("read-back mismatch".to_string());
        }

        fs::remove_file(&test_file)
            .await
            .map_err(|e| format!("remove_file({:?}): {}", test_file, e))?;
        let _ = fs::remove_dir(&test_dir).await;

        Ok(())
    }
}

#[async_trait]
impl StorageBackend for FilesystemBackend {
    async fn write(&self, path: &str, data: &[u8]) -> Result<()> {
        let full_path = self.full_path(path);
        debug!(
            subsystem = "db",
            component = "file_storage",
            op = "write",
            storage_path = %path,
            file_size = data.len(),
            "Writing blob"
        );

        if let Some(parent) = full_path.parent() {
            fs::create_dir_all(parent).await.map_err(|e| {
                warn!(parent = %parent.display(), error = %e, "file_storage: create_dir_all failed");
                e
            })?;
        }

        // Atomic write: temp file + rename
        let temp_path = full_path.with_extension("tmp");
        let mut file = fs::File::create(&temp_path).await?;
        file.write_all(data).await?;
        file.sync_all().await?;
        drop(file);

        fs::rename(&temp_path, &full_path).await.map_err(|e| {
            warn!(from = %temp_path.display(), to = %full_path.display(), error = %e, "file_storage: rename failed");
            e
        })?;

        Ok(())
    }

    async fn read(&self, path: &str) -> Result<Vec<u8>> {
        Ok(fs::read(self.full_path(path)).await?)
    }

    async fn delete(&self, path: &str) -> Result<()> {
        let full_path = self.full_path(path);
        match fs::remove_file(&full_path).await {
            Ok(()) => Ok(()),
            // Already gone is fine for cascade cleanup.
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    async fn exists(&self, path: &str) -> Result<bool> {
        Ok(fs::try_exists(self.full_path(path)).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_storage_path_shards_by_uuid_hex() {
        let id = Uuid::from_u128(0xabcd_ef00_0000_0000_0000_0000_0000_0001);
        let path = generate_storage_path(id);
        assert!(path.starts_with("blobs/ab/cd/"));
        assert!(path.ends_with(".pdf"));
    }

    #[test]
    fn test_file_url_for_prefixes_files_route() {
        assert_eq!(file_url_for("blobs/ab/cd/x.pdf"), "/files/blobs/ab/cd/x.pdf");
    }

    #[tokio::test]
    async fn test_filesystem_backend_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let backend = FilesystemBackend::new(dir.path());

        let path = generate_storage_path(Uuid::now_v7());
        backend.write(&path, b"%PDF-1.7 test").await.unwrap();
        assert!(backend.exists(&path).await.unwrap());
        assert_eq!(backend.read(&path).await.unwrap(), b"%PDF-1.7 test");

        backend.delete(&path).await.unwrap();
        assert!(!backend.exists(&path).await.unwrap());
        // Deleting again is a no-op.
        backend.delete(&path).await.unwrap();
    }

    #[tokio::test]
    async fn test_validate_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let backend = FilesystemBackend::new(dir.path());
        backend.validate().await.unwrap();
    }
}
