//! Domain models

pub mod profile;

pub use profile::{ProfileRecord, UserId};
