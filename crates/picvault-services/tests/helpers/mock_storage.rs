//! Mock Storage implementation for testing

use async_trait::async_trait;
use picvault_services::{Storage, StorageError};
use picvault_storage::{StorageBackend, StorageResult};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;
use std::time::Duration;

/// Mock storage that keeps objects in memory and can be told to fail.
#[derive(Default)]
pub struct MockStorage {
    files: Mutex<HashMap<String, (Vec<u8>, String)>>,
    fail_put: AtomicBool,
    fail_delete: AtomicBool,
    fail_presign: AtomicBool,
}

impl MockStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_put(&self, fail: bool) {
        self.fail_put.store(fail, Ordering::SeqCst);
    }

    pub fn fail_delete(&self, fail: bool) {
        self.fail_delete.store(fail, Ordering::SeqCst);
    }

    pub fn fail_presign(&self, fail: bool) {
        self.fail_presign.store(fail, Ordering::SeqCst);
    }

    /// Set a file in the mock storage
    pub fn set_file(&self, key: &str, data: Vec<u8>) {
        self.files
            .lock()
            .unwrap()
            .insert(key.to_string(), (data, "application/octet-stream".to_string()));
    }

    pub fn has_file(&self, key: &str) -> bool {
        self.files.lock().unwrap().contains_key(key)
    }

    pub fn get_file(&self, key: &str) -> Option<Vec<u8>> {
        self.files.lock().unwrap().get(key).map(|(data, _)| data.clone())
    }

    pub fn content_type(&self, key: &str) -> Option<String> {
        self.files.lock().unwrap().get(key).map(|(_, ct)| ct.clone())
    }

    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.files.lock().unwrap().keys().cloned().collect();
        keys.sort();
        keys
    }
}

#[async_trait]
impl Storage for MockStorage {
    async fn put(&self, storage_key: &str, data: Vec<u8>, content_type: &str) -> StorageResult<()> {
        if self.fail_put.load(Ordering::SeqCst) {
            return Err(StorageError::UploadFailed("injected put failure".to_string()));
        }
        self.files
            .lock()
            .unwrap()
            .insert(storage_key.to_string(), (data, content_type.to_string()));
        Ok(())
    }

    async fn delete(&self, storage_key: &str) -> StorageResult<()> {
        if self.fail_delete.load(Ordering::SeqCst) {
            return Err(StorageError::DeleteFailed("injected delete failure".to_string()));
        }
        self.files.lock().unwrap().remove(storage_key);
        Ok(())
    }

    async fn presigned_get_url(
        &self,
        storage_key: &str,
        expires_in: Duration,
    ) -> StorageResult<String> {
        if self.fail_presign.load(Ordering::SeqCst) {
            return Err(StorageError::BackendError("injected presign failure".to_string()));
        }
        Ok(format!(
            "https://example.com/presigned/{}?expires_in={}",
            storage_key,
            expires_in.as_secs()
        ))
    }

    async fn exists(&self, storage_key: &str) -> StorageResult<bool> {
        Ok(self.has_file(storage_key))
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::S3
    }
}
