//! Time-limited access links.

use serde::Serialize;
use std::time::Duration;

/// Default lifetime of an access link.
pub const DEFAULT_LINK_TTL_SECS: u64 = 300;
/// Longest lifetime S3 accepts for a presigned GET.
pub const MAX_LINK_TTL_SECS: u64 = 7 * 24 * 60 * 60;

/// Expiry window applied to every generated access link.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LinkExpiry(Duration);

impl LinkExpiry {
    /// Build from seconds, clamped to `1..=MAX_LINK_TTL_SECS`.
    pub fn from_secs(secs: u64) -> Self {
        LinkExpiry(Duration::from_secs(secs.clamp(1, MAX_LINK_TTL_SECS)))
    }

    pub fn duration(&self) -> Duration {
        self.0
    }
}

impl Default for LinkExpiry {
    fn default() -> Self {
        LinkExpiry::from_secs(DEFAULT_LINK_TTL_SECS)
    }
}

/// Credential-free read link for one stored picture. Never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AccessLink {
    pub url: String,
    pub key: String,
    #[serde(rename = "expires_in_secs", serialize_with = "serialize_secs")]
    pub expires_in: Duration,
}

fn serialize_secs<S: serde::Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_u64(d.as_secs())
}
