use picvault_core::{AccessLink, LinkExpiry, PictureKey, ProfileRecord, UserId};
use picvault_db::ProfileRepository;
use picvault_storage::Storage;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use super::error::{PictureError, PictureOutcome};

/// Lifecycle manager for users' profile pictures.
///
/// Coordinates object-store writes and deletes with the profile record that
/// names the current object. There is no transaction spanning the two:
///
/// - `set_picture` uploads first and only then moves the pointer. Failing to
///   move it leaves an orphaned object. The previous object is removed
///   afterwards on a best-effort basis.
/// - `clear_picture` deletes the object first and only clears the pointer once
///   the delete succeeded, so the pointer never names a missing object.
///
/// Operations on the same user are not serialized; the last committed record
/// write wins.
#[derive(Clone)]
pub struct PictureService {
    storage: Arc<dyn Storage>,
    profiles: Arc<dyn ProfileRepository>,
    link_expiry: LinkExpiry,
    stale_delete_failures: Arc<AtomicU64>,
}

impl PictureService {
    pub fn new(
        storage: Arc<dyn Storage>,
        profiles: Arc<dyn ProfileRepository>,
        link_expiry: LinkExpiry,
    ) -> Self {
        Self {
            storage,
            profiles,
            link_expiry,
            stale_delete_failures: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Explicit provisioning step for the account-creation workflow. Idempotent.
    #[tracing::instrument(skip(self), fields(user_id = %user))]
    pub async fn provision(&self, user: &UserId) -> Result<ProfileRecord, PictureError> {
        self.profiles
            .get_or_create(user)
            .await
            .map_err(PictureError::RecordUpdate)
    }

    /// Upload `content` as the user's new picture and make it current.
    #[tracing::instrument(skip(self, content), fields(user_id = %user, size_bytes = content.len()))]
    pub async fn set_picture(
        &self,
        user: &UserId,
        content: Vec<u8>,
        content_type: &str,
    ) -> Result<PictureOutcome, PictureError> {
        let key = PictureKey::generate(user, content_type);

        self.storage
            .put(key.as_str(), content, content_type)
            .await
            .map_err(PictureError::StoreWrite)?;

        let record = match self.profiles.get_or_create(user).await {
            Ok(record) => record,
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    orphan_key = %key,
                    "Profile record unavailable after upload, object left orphaned"
                );
                return Err(PictureError::RecordRead(e));
            }
        };
        let previous = record.current_key().map(String::from);

        if let Err(e) = self.profiles.upsert(&record.with_picture_key(key.as_str())).await {
            tracing::warn!(
                error = %e,
                orphan_key = %key,
                "Profile record update failed after upload, object left orphaned"
            );
            return Err(PictureError::RecordUpdate(e));
        }

        tracing::info!(key = %key, previous_key = ?previous, "Profile picture updated");

        if let Some(previous) = previous.filter(|p| p != key.as_str()) {
            self.remove_stale(user, &previous).await;
        }

        Ok(PictureOutcome::Updated)
    }

    /// Time-limited read link for the current picture, `None` when no picture is set.
    ///
    /// Read-only: a user without a record is reported as having no picture
    /// and no record is created.
    #[tracing::instrument(skip(self), fields(user_id = %user))]
    pub async fn get_picture_link(&self, user: &UserId) -> Result<Option<AccessLink>, PictureError> {
        let record = self
            .profiles
            .get_by_user(user)
            .await
            .map_err(PictureError::RecordRead)?;

        let Some(key) = record.as_ref().and_then(|r| r.current_key()) else {
            return Ok(None);
        };

        let expires_in = self.link_expiry.duration();
        let url = self
            .storage
            .presigned_get_url(key, expires_in)
            .await
            .map_err(PictureError::LinkGeneration)?;

        Ok(Some(AccessLink {
            url,
            key: key.to_string(),
            expires_in,
        }))
    }

    /// Delete the current picture and clear the pointer.
    ///
    /// If the store delete fails the record is left untouched.
    #[tracing::instrument(skip(self), fields(user_id = %user))]
    pub async fn clear_picture(&self, user: &UserId) -> Result<PictureOutcome, PictureError> {
        let record = self
            .profiles
            .get_or_create(user)
            .await
            .map_err(PictureError::RecordRead)?;

        let Some(key) = record.current_key() else {
            return Ok(PictureOutcome::NothingToDelete);
        };

        if PictureKey::belongs_to(key, user) {
            self.storage
                .delete(key)
                .await
                .map_err(PictureError::StoreDelete)?;
        } else {
            tracing::warn!(key = %key, "Current key is outside the user namespace, clearing pointer only");
        }

        self.profiles
            .upsert(&record.with_picture_key(""))
            .await
            .map_err(PictureError::RecordUpdate)?;

        tracing::info!(key = %key, "Profile picture deleted");
        Ok(PictureOutcome::Deleted)
    }

    /// Number of superseded pictures that could not be removed from the store.
    pub fn stale_delete_failures(&self) -> u64 {
        self.stale_delete_failures.load(Ordering::Relaxed)
    }

    /// Best-effort removal of a superseded object. Failures are logged and counted, never returned.
    async fn remove_stale(&self, user: &UserId, stale_key: &str) {
        if !PictureKey::belongs_to(stale_key, user) {
            tracing::warn!(
                stale_key = %stale_key,
                "Superseded key is outside the user namespace, not deleting"
            );
            return;
        }

        if let Err(e) = self.storage.delete(stale_key).await {
            self.stale_delete_failures.fetch_add(1, Ordering::Relaxed);
            tracing::warn!(
                user_id = %user,
                stale_key = %stale_key,
                error = %e,
                "Could not delete superseded profile picture"
            );
        }
    }
}
