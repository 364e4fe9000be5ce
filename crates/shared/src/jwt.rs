//! JWT token generation and validation.
//!
//! Tokens are HS256-signed, carry the user's email and id, and live for
//! exactly one hour. Issuer and audience are the same configured string.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{
    Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode, errors::ErrorKind,
};
use thiserror::Error;
use uuid::Uuid;

use crate::auth::Claims;
use crate::config::JwtConfig;
use crate::error::AppError;

/// Lifetime of an issued token in seconds.
pub const TOKEN_LIFETIME_SECS: i64 = 3600;

/// Errors that can occur during JWT operations.
#[derive(Debug, Error)]
pub enum JwtError {
    /// No signing secret configured.
    #[error("jwt signing secret is absent or empty")]
    MissingSecret,

    /// The user handed to the issuer has no email.
    #[error("cannot issue a token for a user without an email")]
    MissingEmail,

    /// Token encoding failed.
    #[error("failed to encode token: {0}")]
    EncodingError(String),

    /// Token decoding failed.
    #[error("failed to decode token: {0}")]
    DecodingError(String),

    /// Token has expired.
    #[error("token has expired")]
    Expired,

    /// Token was signed for another issuer or audience.
    #[error("token issuer or audience mismatch")]
    WrongIssuer,
}

impl From<JwtError> for AppError {
    fn from(err: JwtError) -> Self {
        match err {
            JwtError::MissingSecret => Self::Configuration(err.to_string()),
            JwtError::MissingEmail => Self::invalid_input(err.to_string()),
            JwtError::EncodingError(msg) => Self::Internal(msg),
            JwtError::DecodingError(_) | JwtError::Expired | JwtError::WrongIssuer => {
                Self::Unauthorized
            }
        }
    }
}

/// JWT service for token operations.
#[derive(Clone)]
pub struct JwtService {
    issuer: String,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
}

impl std::fmt::Debug for JwtService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtService")
            .field("issuer", &self.issuer)
            .field("encoding_key", &"[hidden]")
            .field("decoding_key", &"[hidden]")
            .finish()
    }
}

impl JwtService {
    /// Creates a new JWT service from configuration.
    ///
    /// # Errors
    ///
    /// Returns `JwtError::MissingSecret` if the secret is absent or empty.
    pub fn new(config: &JwtConfig) -> Result<Self, JwtError> {
        let secret = config
            .secret
            .as_deref()
            .filter(|s| !s.is_empty())
            .ok_or(JwtError::MissingSecret)?;

        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[config.issuer.as_str()]);
        validation.set_audience(&[config.issuer.as_str()]);
        validation.set_required_spec_claims(&["exp", "iss", "aud", "sub"]);

        Ok(Self {
            issuer: config.issuer.clone(),
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        })
    }

    /// Issues a bearer token for a user, valid for one hour from now.
    ///
    /// # Errors
    ///
    /// Returns `JwtError::MissingEmail` for a user without an email and
    /// `JwtError::EncodingError` if signing fails.
    pub fn issue(&self, user_id: Uuid, email: &str) -> Result<String, JwtError> {
        self.issue_at(user_id, email, Utc::now())
    }

    /// Issues a bearer token as if the current time were `issued_at`.
    ///
    /// # Errors
    ///
    /// Same as [`JwtService::issue`].
    pub fn issue_at(
        &self,
        user_id: Uuid,
        email: &str,
        issued_at: DateTime<Utc>,
    ) -> Result<String, JwtError> {
        if email.is_empty() {
            return Err(JwtError::MissingEmail);
        }
        let expires_at = issued_at + Duration::seconds(TOKEN_LIFETIME_SECS);
        let claims = Claims::new(user_id, email, &self.issuer, issued_at, expires_at);

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| JwtError::EncodingError(e.to_string()))
    }

    /// Validates and decodes a token.
    ///
    /// # Errors
    ///
    /// Returns `JwtError::Expired` if the token has expired,
    /// `JwtError::WrongIssuer` for a foreign issuer or audience, and
    /// `JwtError::DecodingError` for anything else.
    pub fn validate_token(&self, token: &str) -> Result<Claims, JwtError> {
        decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => JwtError::Expired,
                ErrorKind::InvalidIssuer | ErrorKind::InvalidAudience => JwtError::WrongIssuer,
                _ => JwtError::DecodingError(e.to_string()),
            })
    }

    /// Returns the configured issuer (also the audience).
    #[must_use]
    pub fn issuer(&self) -> &str {
        &self.issuer
    }
}
