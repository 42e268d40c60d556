use picvault_core::AppError;
use picvault_storage::StorageError;
use thiserror::Error;

/// Successful result of a picture operation, with the message shown to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PictureOutcome {
    Updated,
    Deleted,
    /// `clear_picture` on a user without a picture.
    NothingToDelete,
}

impl PictureOutcome {
    pub fn message(&self) -> &'static str {
        match self {
            PictureOutcome::Updated => "Profile picture updated!",
            PictureOutcome::Deleted => "Profile picture deleted.",
            PictureOutcome::NothingToDelete => "No profile picture to delete.",
        }
    }
}

/// Failure of a picture operation.
#[derive(Debug, Error)]
pub enum PictureError {
    /// Upload rejected; the record was not touched.
    #[error("failed to upload picture: {0}")]
    StoreWrite(#[source] StorageError),

    /// Delete rejected; the record still points at the object.
    #[error("failed to delete picture: {0}")]
    StoreDelete(#[source] StorageError),

    /// Reading or provisioning the record failed.
    #[error("failed to read profile record: {0}")]
    RecordRead(#[source] AppError),

    /// Writing the new pointer failed. During `set_picture` the uploaded object is left orphaned.
    #[error("failed to update profile record: {0}")]
    RecordUpdate(#[source] AppError),

    #[error("failed to generate access link: {0}")]
    LinkGeneration(#[source] StorageError),
}

impl PictureError {
    /// Machine-readable error code
    pub fn error_code(&self) -> &'static str {
        match self {
            PictureError::StoreWrite(_) => "STORE_WRITE_ERROR",
            PictureError::StoreDelete(_) => "STORE_DELETE_ERROR",
            PictureError::RecordRead(_) => "RECORD_READ_ERROR",
            PictureError::RecordUpdate(_) => "RECORD_UPDATE_ERROR",
            PictureError::LinkGeneration(_) => "LINK_GENERATION_ERROR",
        }
    }

    /// Message for the presentation layer.
    pub fn user_message(&self) -> String {
        match self {
            PictureError::StoreWrite(e) => format!("Error uploading image: {}", e),
            PictureError::StoreDelete(e) => format!("Error deleting image: {}", e),
            PictureError::RecordRead(_) | PictureError::RecordUpdate(_) => {
                "Could not update your profile. Please try again.".to_string()
            }
            PictureError::LinkGeneration(_) => {
                "Could not load your profile picture. Please try again.".to_string()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn outcome_messages() {
        assert_eq!(PictureOutcome::Updated.message(), "Profile picture updated!");
        assert_eq!(PictureOutcome::Deleted.message(), "Profile picture deleted.");
    }

    #[test]
    fn delete_failure_message_carries_detail() {
        let err = PictureError::StoreDelete(StorageError::DeleteFailed("timeout".to_string()));
        assert_eq!(err.error_code(), "STORE_DELETE_ERROR");
        assert_eq!(err.user_message(), "Error deleting image: Delete failed: timeout");
    }

    #[test]
    fn record_failures_hide_internals() {
        let err = PictureError::RecordUpdate(AppError::Internal("pool exhausted".to_string()));
        assert!(!err.user_message().contains("pool"));
        assert_eq!(err.error_code(), "RECORD_UPDATE_ERROR");
    }
}
