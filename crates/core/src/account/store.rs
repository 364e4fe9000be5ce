//! The credential store seam.

use thiserror::Error;
use uuid::Uuid;
use vouch_shared::AppError;

use super::types::{NewUser, User};
use crate::auth::PasswordError;

/// Errors reported by a credential store.
#[derive(Debug, Error)]
pub enum CredentialError {
    /// Creation refused; carries every rule the input broke.
    #[error("user rejected: {}", .0.join("; "))]
    Rejected(Vec<String>),

    /// No user with this ID.
    #[error("user not found: {0}")]
    NotFound(Uuid),

    /// The backing store failed.
    #[error("credential store failure: {0}")]
    Backend(String),
}

impl CredentialError {
    /// Creates a backend error.
    pub fn backend(msg: impl Into<String>) -> Self {
        Self::Backend(msg.into())
    }
}

impl From<PasswordError> for CredentialError {
    fn from(err: PasswordError) -> Self {
        Self::Backend(err.to_string())
    }
}

impl From<CredentialError> for AppError {
    fn from(err: CredentialError) -> Self {
        match err {
            CredentialError::Rejected(reasons) => Self::InvalidInput(reasons),
            CredentialError::NotFound(id) => Self::NotFound(format!("user {id}")),
            CredentialError::Backend(msg) => Self::Internal(msg),
        }
    }
}

/// User persistence and password checks.
///
/// Implemented in memory here and against Postgres by the db crate.
/// Emails are unique case-insensitively.
pub trait CredentialStore: Send + Sync {
    /// Create a user, enforcing email and password rules and hashing the password.
    fn create(
        &self,
        user: NewUser,
        password: &str,
    ) -> impl std::future::Future<Output = Result<User, CredentialError>> + Send;

    /// Find a user by ID.
    fn find_by_id(
        &self,
        id: Uuid,
    ) -> impl std::future::Future<Output = Result<Option<User>, CredentialError>> + Send;

    /// Find a user by email, ignoring case.
    fn find_by_email(
        &self,
        email: &str,
    ) -> impl std::future::Future<Output = Result<Option<User>, CredentialError>> + Send;

    /// Check a password against the user's stored credential.
    fn verify_password(
        &self,
        user: &User,
        password: &str,
    ) -> impl std::future::Future<Output = Result<bool, CredentialError>> + Send;

    /// Persist a new avatar reference.
    fn set_avatar_url(
        &self,
        id: Uuid,
        avatar_url: &str,
    ) -> impl std::future::Future<Output = Result<(), CredentialError>> + Send;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejected_maps_to_invalid_input_with_all_reasons() {
        let err: AppError =
            CredentialError::Rejected(vec!["one".into(), "two".into()]).into();
        match err {
            AppError::InvalidInput(reasons) => assert_eq!(reasons, vec!["one", "two"]),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_backend_maps_to_internal() {
        let err: AppError = CredentialError::backend("db down").into();
        assert_eq!(err.status_code(), 500);
    }

    #[test]
    fn test_not_found_maps_to_not_found() {
        let err: AppError = CredentialError::NotFound(Uuid::nil()).into();
        assert_eq!(err.status_code(), 404);
    }
}
