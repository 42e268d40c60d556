#![allow(dead_code)]

pub mod mock_storage;
pub mod profiles;

use picvault_core::{LinkExpiry, UserId};
use picvault_services::PictureService;
use std::sync::Arc;

pub use mock_storage::MockStorage;
pub use profiles::FlakyProfiles;

/// Service wired to in-memory collaborators, plus handles to both for assertions.
pub struct TestHarness {
    pub service: PictureService,
    pub storage: Arc<MockStorage>,
    pub profiles: Arc<FlakyProfiles>,
}

impl TestHarness {
    pub fn new() -> Self {
        let storage = Arc::new(MockStorage::new());
        let profiles = Arc::new(FlakyProfiles::new());
        let service = PictureService::new(storage.clone(), profiles.clone(), LinkExpiry::default());
        Self {
            service,
            storage,
            profiles,
        }
    }
}

pub fn user(id: &str) -> UserId {
    UserId::parse(id).expect("valid test user id")
}
