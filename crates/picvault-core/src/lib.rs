//! Picvault Core Library
//!
//! This crate provides the domain types, error types, configuration and the
//! object-key / link-expiry policies shared across all Picvault components.

pub mod config;
pub mod error;
pub mod link;
pub mod models;
pub mod picture_key;
pub mod storage_types;

// Re-export commonly used types
pub use config::Config;
pub use error::AppError;
pub use link::{AccessLink, LinkExpiry};
pub use models::{ProfileRecord, UserId};
pub use picture_key::PictureKey;
pub use storage_types::StorageBackend;
