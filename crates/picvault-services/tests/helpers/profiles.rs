//! Profile repository wrapper with failure injection.

use async_trait::async_trait;
use picvault_core::{AppError, ProfileRecord, UserId};
use picvault_db::{InMemoryProfileRepository, ProfileRepository};
use std::sync::atomic::{AtomicBool, Ordering};

#[derive(Default)]
pub struct FlakyProfiles {
    inner: InMemoryProfileRepository,
    fail_reads: AtomicBool,
    fail_upserts: AtomicBool,
}

impl FlakyProfiles {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    pub fn fail_upserts(&self, fail: bool) {
        self.fail_upserts.store(fail, Ordering::SeqCst);
    }

    /// Current key as stored, bypassing failure injection.
    pub async fn current_key(&self, user: &UserId) -> Option<String> {
        self.inner
            .get_by_user(user)
            .await
            .unwrap()
            .and_then(|r| r.current_key().map(String::from))
    }

    pub async fn record_count(&self) -> usize {
        self.inner.len().await
    }

    /// Seed a record directly.
    pub async fn seed(&self, record: ProfileRecord) {
        self.inner.upsert(&record).await.unwrap();
    }
}

fn unavailable() -> AppError {
    AppError::Internal("record store unavailable".to_string())
}

#[async_trait]
impl ProfileRepository for FlakyProfiles {
    async fn get_by_user(&self, user: &UserId) -> Result<Option<ProfileRecord>, AppError> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(unavailable());
        }
        self.inner.get_by_user(user).await
    }

    async fn upsert(&self, record: &ProfileRecord) -> Result<(), AppError> {
        if self.fail_upserts.load(Ordering::SeqCst) {
            return Err(unavailable());
        }
        self.inner.upsert(record).await
    }

    async fn get_or_create(&self, user: &UserId) -> Result<ProfileRecord, AppError> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(unavailable());
        }
        self.inner.get_or_create(user).await
    }
}
