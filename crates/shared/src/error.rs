//! Application-wide error types.

use thiserror::Error;

/// Result type alias using `AppError`.
pub type AppResult<T> = Result<T, AppError>;

/// Application error types.
#[derive(Debug, Error)]
pub enum AppError {
    /// Malformed or missing request data; carries every reason found.
    #[error("Invalid input: {}", .0.join("; "))]
    InvalidInput(Vec<String>),

    /// Authentication failed. Deliberately carries no detail.
    #[error("Authentication failed")]
    Unauthorized,

    /// Referenced user or avatar is absent.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Object key collision when overwrite was not requested.
    #[error("Conflict: {0}")]
    Conflict(String),

    /// The object store could not be reached or refused the operation.
    #[error("Object store unavailable: {0}")]
    StoreUnavailable(String),

    /// Misdeployment: required configuration is missing or invalid.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The new avatar was uploaded but the user record could not be updated.
    #[error("Commit failed: {0}")]
    CommitFailed(String),

    /// Internal server error, e.g. a failing credential backend.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Builds an `InvalidInput` error from a single reason.
    #[must_use]
    pub fn invalid_input(reason: impl Into<String>) -> Self {
        Self::InvalidInput(vec![reason.into()])
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn status_code(&self) -> u16 {
        match self {
            Self::InvalidInput(_) => 400,
            Self::Unauthorized => 401,
            Self::NotFound(_) => 404,
            Self::Conflict(_) => 409,
            Self::StoreUnavailable(_) | Self::CommitFailed(_) => 503,
            Self::Configuration(_) | Self::Internal(_) => 500,
        }
    }

    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidInput(_) => "INVALID_INPUT",
            Self::Unauthorized => "UNAUTHORIZED",
            Self::NotFound(_) => "NOT_FOUND",
            Self::Conflict(_) => "CONFLICT",
            Self::StoreUnavailable(_) => "STORE_UNAVAILABLE",
            Self::Configuration(_) => "CONFIGURATION_ERROR",
            Self::CommitFailed(_) => "COMMIT_FAILED",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Whether a client may reasonably retry the same request.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::StoreUnavailable(_) | Self::CommitFailed(_))
    }
}
