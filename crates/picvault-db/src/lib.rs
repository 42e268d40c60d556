//! Picvault record persistence
//!
//! Profile records map a user to the key of their current picture object.

pub mod db;

pub use db::{
    connect, run_migrations, InMemoryProfileRepository, PgProfileRepository, ProfileRepository,
};
