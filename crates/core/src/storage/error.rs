//! Storage error types.

use thiserror::Error;
use vouch_shared::AppError;

/// Storage operation errors.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Uploaded file has no content.
    #[error("file is empty")]
    EmptyFile,

    /// File size exceeds maximum allowed.
    #[error("file size {size} bytes exceeds maximum allowed {max} bytes")]
    FileTooLarge {
        /// Actual file size.
        size: u64,
        /// Maximum allowed size.
        max: u64,
    },

    /// Content type not allowed.
    #[error("content type '{content_type}' is not allowed")]
    InvalidContentType {
        /// The rejected content type.
        content_type: String,
    },

    /// An object already exists at the key and overwrite was not requested.
    #[error("object already exists: {key}")]
    Conflict {
        /// Storage path that already exists.
        key: String,
    },

    /// File not found in storage.
    #[error("file not found: {key}")]
    NotFound {
        /// Storage key that was not found.
        key: String,
    },

    /// Storage provider configuration error.
    #[error("storage configuration error: {0}")]
    Configuration(String),

    /// OpenDAL operation error.
    #[error("storage operation failed: {0}")]
    Operation(String),

    /// Invalid container name or storage key.
    #[error("invalid storage key: {0}")]
    InvalidKey(String),
}

impl StorageError {
    /// Create a file too large error.
    #[must_use]
    pub fn file_too_large(size: u64, max: u64) -> Self {
        Self::FileTooLarge { size, max }
    }

    /// Create an invalid content type error.
    #[must_use]
    pub fn invalid_content_type(content_type: impl Into<String>) -> Self {
        Self::InvalidContentType {
            content_type: content_type.into(),
        }
    }

    /// Create a conflict error.
    #[must_use]
    pub fn conflict(key: impl Into<String>) -> Self {
        Self::Conflict { key: key.into() }
    }

    /// Create a configuration error.
    #[must_use]
    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    /// Create an operation error.
    #[must_use]
    pub fn operation(msg: impl Into<String>) -> Self {
        Self::Operation(msg.into())
    }
}

impl From<opendal::Error> for StorageError {
    fn from(err: opendal::Error) -> Self {
        match err.kind() {
            opendal::ErrorKind::NotFound => Self::NotFound {
                key: err.to_string(),
            },
            opendal::ErrorKind::AlreadyExists => Self::Conflict {
                key: err.to_string(),
            },
            opendal::ErrorKind::ConfigInvalid => Self::Configuration(err.to_string()),
            _ => Self::Operation(err.to_string()),
        }
    }
}

impl From<StorageError> for AppError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::EmptyFile
            | StorageError::FileTooLarge { .. }
            | StorageError::InvalidContentType { .. }
            | StorageError::InvalidKey(_) => Self::InvalidInput(vec![err.to_string()]),
            StorageError::Conflict { .. } => Self::Conflict(err.to_string()),
            StorageError::NotFound { .. } => Self::NotFound(err.to_string()),
            StorageError::Configuration(msg) => Self::Configuration(msg),
            StorageError::Operation(msg) => Self::StoreUnavailable(msg),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_errors_map_to_invalid_input() {
        let err: AppError = StorageError::file_too_large(20, 10).into();
        assert!(matches!(err, AppError::InvalidInput(ref r) if r.len() == 1));

        let err: AppError = StorageError::invalid_content_type("text/html").into();
        assert!(matches!(err, AppError::InvalidInput(_)));

        let err: AppError = StorageError::EmptyFile.into();
        assert!(matches!(err, AppError::InvalidInput(_)));
    }

    #[test]
    fn test_backend_failures_map_to_store_unavailable() {
        let err: AppError = StorageError::operation("connection reset").into();
        assert!(matches!(err, AppError::StoreUnavailable(ref m) if m == "connection reset"));
    }

    #[test]
    fn test_conflict_maps_to_conflict() {
        let err: AppError = StorageError::conflict("profile-images/a.png").into();
        assert_eq!(err.status_code(), 409);
    }
}
