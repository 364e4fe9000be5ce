//! Account domain types.

use bytes::Bytes;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use vouch_shared::Claims;

/// A registered user as seen by the core.
///
/// The password credential stays inside the credential store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Unique user ID.
    pub id: Uuid,
    /// Email address as entered at signup.
    pub email: String,
    /// Username; signup sets it to the email.
    pub username: String,
    /// URI of the current profile image.
    pub avatar_url: Option<String>,
}

/// Input for creating a user. The password travels separately.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    /// Email address.
    pub email: String,
    /// Username.
    pub username: String,
    /// Initial avatar reference.
    pub avatar_url: Option<String>,
}

/// A file received from a client.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    /// Original file name as sent by the client.
    pub file_name: String,
    /// Declared MIME type, if any.
    pub content_type: Option<String>,
    /// File content.
    pub bytes: Bytes,
}

impl UploadedFile {
    /// Creates an uploaded file.
    #[must_use]
    pub fn new(
        file_name: impl Into<String>,
        content_type: Option<String>,
        bytes: impl Into<Bytes>,
    ) -> Self {
        Self {
            file_name: file_name.into(),
            content_type,
            bytes: bytes.into(),
        }
    }

    /// Size in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Whether the file has no content.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// The authenticated caller, taken from a validated token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    /// User ID from the `sub` claim.
    pub user_id: Uuid,
    /// Email from the `email` claim.
    pub email: String,
}

impl From<Claims> for Identity {
    fn from(claims: Claims) -> Self {
        Self {
            user_id: claims.sub,
            email: claims.email,
        }
    }
}

/// What happened to the previously referenced avatar after an update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PreviousAvatar {
    /// The user had no avatar, or it already was the new one.
    NoPrevious,
    /// The old object was deleted.
    Removed,
    /// The old object was already missing from the store.
    AlreadyGone,
    /// The old reference points outside the avatar container, e.g. the default avatar.
    Unmanaged,
    /// Deleting the old object failed; it is orphaned.
    Failed(String),
}

/// Result of a committed avatar update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AvatarUpdate {
    /// The new avatar URI, now persisted on the user record.
    pub avatar_url: String,
    /// Cleanup outcome for the old object.
    pub previous: PreviousAvatar,
}

/// An object written to the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredObject {
    /// Key inside the avatar container.
    pub key: String,
    /// Public URI.
    pub url: String,
}
