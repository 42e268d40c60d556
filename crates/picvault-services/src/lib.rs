//! Picvault Services
//!
//! Business services built on the storage and persistence crates. The main one
//! is `PictureService`, which keeps each user's profile picture object and the
//! record pointing at it consistent.

pub mod picture;

pub use picture::{PictureError, PictureOutcome, PictureService};

// Re-exported so callers can wire the service without naming every crate.
pub use picvault_db::ProfileRepository;
pub use picvault_storage::{Storage, StorageError};
