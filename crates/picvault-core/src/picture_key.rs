//! Object key generation and validation for profile pictures.
//!
//! Key format: `users/{user_id}/profile_{token}.{ext}` where `token` is a v4
//! UUID in 32-char lowercase hex. The lifecycle manager is the only writer and
//! deleter under `users/{user_id}/`; migration tooling relies on this layout.

use std::fmt;
use uuid::Uuid;

use crate::models::UserId;

const KEY_ROOT: &str = "users";
const FILE_PREFIX: &str = "profile_";
const TOKEN_LEN: usize = 32;
const DEFAULT_EXTENSION: &str = "jpg";
const FALLBACK_CONTENT_TYPE: &str = "application/octet-stream";

/// (content type, extension). First entry per extension is the canonical content type.
const IMAGE_TYPES: &[(&str, &str)] = &[
    ("image/jpeg", "jpg"),
    ("image/jpg", "jpg"),
    ("image/pjpeg", "jpg"),
    ("image/png", "png"),
    ("image/gif", "gif"),
    ("image/webp", "webp"),
    ("image/avif", "avif"),
    ("image/heic", "heic"),
];

/// A generated object key for a user's profile picture.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PictureKey(String);

impl PictureKey {
    /// Generate a fresh key scoped to `user`.
    ///
    /// Collisions are not re-checked against the store.
    pub fn generate(user: &UserId, content_type: &str) -> Self {
        let token = Uuid::new_v4().simple().to_string();
        PictureKey(format!(
            "{}/{}/{}{}.{}",
            KEY_ROOT,
            user,
            FILE_PREFIX,
            token,
            extension_for_content_type(content_type)
        ))
    }

    /// Namespace every key of `user` lives under, with trailing slash.
    pub fn user_prefix(user: &UserId) -> String {
        format!("{}/{}/", KEY_ROOT, user)
    }

    /// Whether `key` is a well-formed picture key inside `user`'s namespace.
    pub fn belongs_to(key: &str, user: &UserId) -> bool {
        let Some(file) = key.strip_prefix(&Self::user_prefix(user)) else {
            return false;
        };
        let Some(rest) = file.strip_prefix(FILE_PREFIX) else {
            return false;
        };
        let Some((token, ext)) = rest.split_once('.') else {
            return false;
        };

        token.len() == TOKEN_LEN
            && token
                .bytes()
                .all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b))
            && !ext.is_empty()
            && ext.bytes().all(|b| b.is_ascii_alphanumeric())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PictureKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// File extension for an advisory content type. Unknown types map to `jpg`.
pub fn extension_for_content_type(content_type: &str) -> &'static str {
    let essence = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();

    IMAGE_TYPES
        .iter()
        .find(|(mime, _)| *mime == essence)
        .map(|(_, ext)| *ext)
        .unwrap_or(DEFAULT_EXTENSION)
}

/// Content type guessed from a file extension (`jpeg` and `jpg` both map to `image/jpeg`).
pub fn content_type_for_extension(ext: &str) -> &'static str {
    let ext = ext.trim_start_matches('.').to_ascii_lowercase();
    let ext = if ext == "jpeg" { "jpg" } else { ext.as_str() };

    IMAGE_TYPES
        .iter()
        .find(|(_, e)| *e == ext)
        .map(|(mime, _)| *mime)
        .unwrap_or(FALLBACK_CONTENT_TYPE)
}
