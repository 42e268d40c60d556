use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::AppError;

const MAX_USER_ID_LEN: usize = 128;

/// Identity of an account owner, as handed over by the authentication layer.
///
/// The value is used verbatim as a path segment of object keys
/// (`users/<user-id>/...`), so only ASCII alphanumerics, `-` and `_` are accepted.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct UserId(String);

impl UserId {
    pub fn parse(value: impl Into<String>) -> Result<Self, AppError> {
        let value = value.into();

        if value.is_empty() {
            return Err(AppError::InvalidInput("user id must not be empty".to_string()));
        }
        if value.len() > MAX_USER_ID_LEN {
            return Err(AppError::InvalidInput(format!(
                "user id must be at most {} bytes",
                MAX_USER_ID_LEN
            )));
        }
        if !value
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_')
        {
            return Err(AppError::InvalidInput(format!(
                "user id {:?} contains characters outside [A-Za-z0-9_-]",
                value
            )));
        }

        Ok(UserId(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for UserId {
    type Error = AppError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        UserId::parse(value)
    }
}

impl From<UserId> for String {
    fn from(id: UserId) -> Self {
        id.0
    }
}

/// Per-user pointer to the currently active picture object.
///
/// An empty `picture_key` means no picture is set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileRecord {
    pub user_id: UserId,
    pub picture_key: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ProfileRecord {
    /// Fresh record with no picture, as created on first contact with a user.
    pub fn empty(user_id: UserId) -> Self {
        let now = Utc::now();
        Self {
            user_id,
            picture_key: String::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// The current key, or `None` when no picture is set.
    pub fn current_key(&self) -> Option<&str> {
        if self.picture_key.is_empty() {
            None
        } else {
            Some(&self.picture_key)
        }
    }

    /// Copy of this record pointing at `key` (empty string clears it).
    pub fn with_picture_key(&self, key: impl Into<String>) -> Self {
        Self {
            user_id: self.user_id.clone(),
            picture_key: key.into(),
            created_at: self.created_at,
            updated_at: Utc::now(),
        }
    }
}
