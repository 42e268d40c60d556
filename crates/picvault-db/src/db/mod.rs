//! Database repositories for data access layer
//!
//! `ProfileRepository` is the record-persistence contract the lifecycle
//! manager depends on. `PgProfileRepository` backs it with PostgreSQL,
//! `InMemoryProfileRepository` with a process-local map.

pub mod memory;
pub mod pool;
pub mod profile;

pub use memory::InMemoryProfileRepository;
pub use pool::{connect, run_migrations};
pub use profile::{PgProfileRepository, ProfileRepository};
