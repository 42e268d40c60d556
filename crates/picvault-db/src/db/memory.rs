//! In-memory profile repository.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use picvault_core::{AppError, ProfileRecord, UserId};
use tokio::sync::RwLock;

use super::profile::ProfileRepository;

/// Profile records held in process memory. Cloning shares the same map.
#[derive(Clone, Default)]
pub struct InMemoryProfileRepository {
    records: Arc<RwLock<HashMap<UserId, ProfileRecord>>>,
}

impl InMemoryProfileRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored records.
    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}

#[async_trait]
impl ProfileRepository for InMemoryProfileRepository {
    async fn get_by_user(&self, user: &UserId) -> Result<Option<ProfileRecord>, AppError> {
        Ok(self.records.read().await.get(user).cloned())
    }

    async fn upsert(&self, record: &ProfileRecord) -> Result<(), AppError> {
        let mut records = self.records.write().await;
        let created_at = records
            .get(&record.user_id)
            .map(|existing| existing.created_at)
            .unwrap_or(record.created_at);

        records.insert(
            record.user_id.clone(),
            ProfileRecord {
                created_at,
                ..record.clone()
            },
        );
        Ok(())
    }

    async fn get_or_create(&self, user: &UserId) -> Result<ProfileRecord, AppError> {
        let mut records = self.records.write().await;
        let record = records
            .entry(user.clone())
            .or_insert_with(|| ProfileRecord::empty(user.clone()));
        Ok(record.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(id: &str) -> UserId {
        UserId::parse(id).unwrap()
    }

    #[tokio::test]
    async fn get_or_create_provisions_once() {
        let repo = InMemoryProfileRepository::new();
        assert!(repo.get_by_user(&user("u1")).await.unwrap().is_none());

        let created = repo.get_or_create(&user("u1")).await.unwrap();
        assert_eq!(created.current_key(), None);

        repo.upsert(&created.with_picture_key("users/u1/profile_a.jpg"))
            .await
            .unwrap();

        // A second provisioning call must not reset the pointer.
        let again = repo.get_or_create(&user("u1")).await.unwrap();
        assert_eq!(again.current_key(), Some("users/u1/profile_a.jpg"));
        assert_eq!(repo.len().await, 1);
    }

    #[tokio::test]
    async fn upsert_keeps_original_creation_time() {
        let repo = InMemoryProfileRepository::new();
        let first = repo.get_or_create(&user("u2")).await.unwrap();

        let mut replacement = ProfileRecord::empty(user("u2"));
        replacement.picture_key = "users/u2/profile_b.png".to_string();
        repo.upsert(&replacement).await.unwrap();

        let stored = repo.get_by_user(&user("u2")).await.unwrap().unwrap();
        assert_eq!(stored.created_at, first.created_at);
        assert_eq!(stored.picture_key, "users/u2/profile_b.png");
    }

    #[tokio::test]
    async fn clones_share_state() {
        let repo = InMemoryProfileRepository::new();
        let other = repo.clone();
        repo.get_or_create(&user("u3")).await.unwrap();
        assert!(!other.is_empty().await);
    }
}
