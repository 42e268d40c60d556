//! Picvault Storage Library
//!
//! This crate provides the object-store abstraction used by the picture
//! lifecycle manager, with implementations for S3 and the local filesystem.
//!
//! # Storage key format
//!
//! Keys are generated by `picvault_core::PictureKey` and look like
//! `users/{user_id}/profile_{token}.{ext}`. Backends treat them as opaque but
//! reject keys containing `..` or a leading `/`.

pub mod factory;
#[cfg(feature = "storage-local")]
pub mod local;
#[cfg(feature = "storage-s3")]
pub mod s3;
pub mod traits;

// Re-export commonly used types
pub use factory::create_storage;
#[cfg(feature = "storage-local")]
pub use local::LocalStorage;
pub use picvault_core::StorageBackend;
#[cfg(feature = "storage-s3")]
pub use s3::S3Storage;
pub use traits::{Storage, StorageError, StorageResult};
