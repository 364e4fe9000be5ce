//! Object key generation.
//!
//! Keys have the shape `{owner_scope}/{upload_id}/{file_name}`:
//! - `owner_scope` is the first 32 hex chars of SHA-256 over the owner
//!   identifier, so keys never expose emails and owners never share a prefix
//! - `upload_id` is a UUIDv7, unique per upload and time ordered
//! - `file_name` is the sanitized original name, so URLs still end with it

use sha2::{Digest, Sha256};
use uuid::Uuid;

const OWNER_SCOPE_LEN: usize = 32;
const FALLBACK_FILENAME: &str = "avatar";

/// Builds a fresh storage key for an object uploaded by `owner`.
#[must_use]
pub fn avatar_key(owner: &str, filename: &str) -> String {
    let digest = format!("{:x}", Sha256::digest(owner.as_bytes()));
    let scope = digest.get(..OWNER_SCOPE_LEN).unwrap_or(&digest);

    format!(
        "{scope}/{}/{}",
        Uuid::now_v7().simple(),
        sanitize_filename(filename)
    )
}

/// Sanitize filename for storage key.
///
/// Removes or replaces characters that could cause issues in storage paths.
/// Only allows ASCII alphanumeric characters, dots, hyphens, and underscores.
/// Directory components sent by some browsers are dropped first.
#[must_use]
pub fn sanitize_filename(filename: &str) -> String {
    let base = filename
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or_default()
        .trim();

    let sanitized: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '.' || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();

    if sanitized.chars().all(|c| c == '.') {
        FALLBACK_FILENAME.to_string()
    } else {
        sanitized
    }
}
