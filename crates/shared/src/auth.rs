//! Authentication types for JWT and the auth endpoints.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// JWT claims for bearer tokens.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// User email.
    pub email: String,
    /// Subject (user ID).
    pub sub: Uuid,
    /// Issuer.
    pub iss: String,
    /// Audience; always equal to the issuer.
    pub aud: String,
    /// Issued at timestamp.
    pub iat: i64,
    /// Expiration timestamp.
    pub exp: i64,
}

impl Claims {
    /// Creates claims for a user issued at `issued_at`.
    #[must_use]
    pub fn new(
        user_id: Uuid,
        email: &str,
        issuer: &str,
        issued_at: DateTime<Utc>,
        expires_at: DateTime<Utc>,
    ) -> Self {
        Self {
            email: email.to_string(),
            sub: user_id,
            iss: issuer.to_string(),
            aud: issuer.to_string(),
            iat: issued_at.timestamp(),
            exp: expires_at.timestamp(),
        }
    }

    /// Returns the user ID from claims.
    #[must_use]
    pub const fn user_id(&self) -> Uuid {
        self.sub
    }
}

/// Sign-in request payload.
#[derive(Debug, Clone, Deserialize)]
pub struct SigninRequest {
    /// User email.
    pub email: String,
    /// User password.
    pub password: String,
}

/// Sign-in response payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenResponse {
    /// Signed bearer token.
    pub token: String,
}

/// Avatar reference returned by the avatar endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AvatarResponse {
    /// URI of the current profile image.
    pub avatar_url: String,
}
