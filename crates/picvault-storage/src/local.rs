use crate::traits::{validate_key, Storage, StorageError, StorageResult};
use crate::StorageBackend;
use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tokio::fs;
use tokio::io::AsyncWriteExt;

/// Local filesystem storage implementation
///
/// Intended for development. Links it hands out carry an `expires` marker but
/// no signature; whatever serves `base_url` decides whether to honour it.
///
/// The content type of each object is kept in a `<key>.content-type` file next
/// to it, so a file server in front of `base_path` can send the right header.
#[derive(Clone)]
pub struct LocalStorage {
    base_path: PathBuf,
    base_url: String,
}

impl LocalStorage {
    /// Create a new LocalStorage instance
    ///
    /// # Arguments
    /// * `base_path` - Root directory for file storage (e.g., "/var/lib/picvault")
    /// * `base_url` - Base URL for serving files (e.g., "http://localhost:3000/media")
    pub async fn new(base_path: impl Into<PathBuf>, base_url: String) -> StorageResult<Self> {
        let base_path = base_path.into();

        fs::create_dir_all(&base_path).await.map_err(|e| {
            StorageError::ConfigError(format!(
                "Failed to create storage directory {}: {}",
                base_path.display(),
                e
            ))
        })?;

        Ok(LocalStorage {
            base_path,
            base_url,
        })
    }

    /// Convert storage key to filesystem path, rejecting traversal
    fn key_to_path(&self, storage_key: &str) -> StorageResult<PathBuf> {
        validate_key(storage_key)?;
        Ok(self.base_path.join(storage_key))
    }

    fn content_type_path(path: &Path) -> PathBuf {
        let mut sidecar = path.as_os_str().to_owned();
        sidecar.push(".content-type");
        PathBuf::from(sidecar)
    }

    fn generate_url(&self, key: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), key)
    }

    async fn ensure_parent_dir(&self, path: &Path) -> StorageResult<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }
        Ok(())
    }
}

#[async_trait]
impl Storage for LocalStorage {
    async fn put(&self, storage_key: &str, data: Vec<u8>, content_type: &str) -> StorageResult<()> {
        let path = self.key_to_path(storage_key)?;
        let size = data.len();

        self.ensure_parent_dir(&path).await?;

        let start = std::time::Instant::now();

        let mut file = fs::File::create(&path).await.map_err(|e| {
            StorageError::UploadFailed(format!("Failed to create file {}: {}", path.display(), e))
        })?;

        file.write_all(&data).await.map_err(|e| {
            StorageError::UploadFailed(format!("Failed to write file {}: {}", path.display(), e))
        })?;

        file.sync_all().await.map_err(|e| {
            StorageError::UploadFailed(format!("Failed to sync file {}: {}", path.display(), e))
        })?;

        let sidecar = Self::content_type_path(&path);
        fs::write(&sidecar, content_type.as_bytes()).await.map_err(|e| {
            StorageError::UploadFailed(format!(
                "Failed to record content type {}: {}",
                sidecar.display(),
                e
            ))
        })?;

        tracing::info!(
            path = %path.display(),
            key = %storage_key,
            content_type = %content_type,
            size_bytes = size,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Local storage upload successful"
        );

        Ok(())
    }

    async fn delete(&self, storage_key: &str) -> StorageResult<()> {
        let path = self.key_to_path(storage_key)?;
        let start = std::time::Instant::now();

        match fs::remove_file(&path).await {
            Ok(()) => {}
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(()),
            Err(e) => {
                return Err(StorageError::DeleteFailed(format!(
                    "Failed to delete file {}: {}",
                    path.display(),
                    e
                )))
            }
        }

        // Best effort once the object itself is gone.
        let sidecar = Self::content_type_path(&path);
        if let Err(e) = fs::remove_file(&sidecar).await {
            if e.kind() != ErrorKind::NotFound {
                tracing::warn!(path = %sidecar.display(), error = %e, "Failed to remove content type file");
            }
        }

        tracing::info!(
            path = %path.display(),
            key = %storage_key,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Local storage delete successful"
        );

        Ok(())
    }

    async fn presigned_get_url(
        &self,
        storage_key: &str,
        expires_in: Duration,
    ) -> StorageResult<String> {
        self.key_to_path(storage_key)?;
        let expires_at = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_err(|e| StorageError::BackendError(e.to_string()))?
            + expires_in;

        Ok(format!(
            "{}?expires={}",
            self.generate_url(storage_key),
            expires_at.as_secs()
        ))
    }

    async fn exists(&self, storage_key: &str) -> StorageResult<bool> {
        let path = self.key_to_path(storage_key)?;
        Ok(fs::try_exists(&path).await?)
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::Local
    }
}

#[cfg(all(test, feature = "storage-local"))]
mod tests {
    use super::*;
    use tempfile::tempdir;

    async fn storage(dir: &Path) -> LocalStorage {
        LocalStorage::new(dir, "http://localhost:3000/media/".to_string())
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_local_storage_put_and_exists() {
        let dir = tempdir().unwrap();
        let storage = storage(dir.path()).await;
        let key = "users/u1/profile_0123.jpg";

        storage.put(key, b"test data".to_vec(), "image/jpeg").await.unwrap();

        assert!(storage.exists(key).await.unwrap());
        let on_disk = std::fs::read(dir.path().join(key)).unwrap();
        assert_eq!(on_disk, b"test data");
        let content_type =
            std::fs::read_to_string(dir.path().join("users/u1/profile_0123.jpg.content-type")).unwrap();
        assert_eq!(content_type, "image/jpeg");
    }

    #[tokio::test]
    async fn test_path_traversal_rejected() {
        let dir = tempdir().unwrap();
        let storage = storage(dir.path()).await;

        let result = storage.put("../../../etc/passwd", vec![1], "text/plain").await;
        assert!(matches!(result, Err(StorageError::InvalidKey(_))));

        let result = storage.delete("../etc/passwd").await;
        assert!(matches!(result, Err(StorageError::InvalidKey(_))));

        let result = storage.exists("/etc/passwd").await;
        assert!(matches!(result, Err(StorageError::InvalidKey(_))));
    }

    #[tokio::test]
    async fn test_local_storage_delete() {
        let dir = tempdir().unwrap();
        let storage = storage(dir.path()).await;
        let key = "users/u1/profile_gone.png";

        storage.put(key, b"bye".to_vec(), "image/png").await.unwrap();
        storage.delete(key).await.unwrap();
        assert!(!storage.exists(key).await.unwrap());
        assert!(!dir.path().join("users/u1/profile_gone.png.content-type").exists());

        // Missing objects delete cleanly, like S3.
        storage.delete(key).await.unwrap();
    }

    #[tokio::test]
    async fn test_local_delete_reports_filesystem_errors() {
        let dir = tempdir().unwrap();
        let storage = storage(dir.path()).await;
        let key = "users/u1/profile_stuck.jpg";

        // A directory where the file should be cannot be removed with remove_file.
        std::fs::create_dir_all(dir.path().join(key)).unwrap();

        let result = storage.delete(key).await;
        assert!(matches!(result, Err(StorageError::DeleteFailed(_))));
        assert!(storage.exists(key).await.unwrap());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_local_exists_reports_filesystem_errors() {
        let dir = tempdir().unwrap();
        let storage = storage(dir.path()).await;

        // A path that walks through a regular file fails with ENOTDIR, not "missing".
        std::fs::write(dir.path().join("users"), b"not a directory").unwrap();

        let result = storage.exists("users/u1/profile_x.jpg").await;
        assert!(matches!(result, Err(StorageError::IoError(_))));
    }

    #[tokio::test]
    async fn test_local_presigned_url() {
        let dir = tempdir().unwrap();
        let storage = storage(dir.path()).await;

        let url = storage
            .presigned_get_url("users/u1/profile_x.jpg", Duration::from_secs(300))
            .await
            .unwrap();

        assert!(url.starts_with("http://localhost:3000/media/users/u1/profile_x.jpg?expires="));
        let expires: u64 = url.rsplit('=').next().unwrap().parse().unwrap();
        let now = SystemTime::now().duration_since(UNIX_EPOCH).unwrap().as_secs();
        assert!(expires >= now + 299 && expires <= now + 301);
        assert_eq!(storage.backend_type(), StorageBackend::Local);
    }
}
