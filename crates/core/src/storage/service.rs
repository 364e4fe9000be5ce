//! Storage service implementation using Apache OpenDAL.

use std::path::Path;

use bytes::Bytes;
use opendal::{ErrorKind, Operator, services};
use tracing::debug;
use url::Url;

use super::config::{StorageConfig, StorageProvider};
use super::error::StorageError;

/// Storage service for profile images.
#[derive(Debug, Clone)]
pub struct StorageService {
    operator: Operator,
    config: StorageConfig,
}

impl StorageService {
    /// Create a new storage service from configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage provider cannot be initialized.
    pub fn from_config(config: StorageConfig) -> Result<Self, StorageError> {
        let operator = Self::create_operator(&config.provider)?;
        Ok(Self { operator, config })
    }

    /// Create OpenDAL operator from provider config.
    fn create_operator(provider: &StorageProvider) -> Result<Operator, StorageError> {
        let operator = match provider {
            StorageProvider::S3 {
                endpoint,
                bucket,
                access_key_id,
                secret_access_key,
                region,
            } => {
                let builder = services::S3::default()
                    .endpoint(endpoint)
                    .bucket(bucket)
                    .access_key_id(access_key_id)
                    .secret_access_key(secret_access_key)
                    .region(region);
                Operator::new(builder).map_err(configuration_error)?.finish()
            }
            StorageProvider::AzureBlob {
                account,
                access_key,
                container,
            } => {
                let builder = services::Azblob::default()
                    .account_name(account)
                    .account_key(access_key)
                    .container(container);
                Operator::new(builder).map_err(configuration_error)?.finish()
            }
            StorageProvider::LocalFs { root } => {
                let builder = services::Fs::default().root(
                    root.to_str()
                        .ok_or_else(|| StorageError::configuration("invalid path"))?,
                );
                Operator::new(builder).map_err(configuration_error)?.finish()
            }
            StorageProvider::Memory => Operator::new(services::Memory::default())
                .map_err(configuration_error)?
                .finish(),
        };

        Ok(operator)
    }

    /// Validate an upload against config constraints.
    ///
    /// # Errors
    ///
    /// Returns an error if the file is empty, too large, or of a content
    /// type that is not allowed. An undeclared content type is accepted.
    pub fn validate_upload(
        &self,
        content_type: Option<&str>,
        size: u64,
    ) -> Result<(), StorageError> {
        if size == 0 {
            return Err(StorageError::EmptyFile);
        }

        if size > self.config.max_file_size {
            return Err(StorageError::file_too_large(
                size,
                self.config.max_file_size,
            ));
        }

        if let Some(content_type) = content_type
            && !self.config.is_content_type_allowed(content_type)
        {
            return Err(StorageError::invalid_content_type(content_type));
        }

        Ok(())
    }

    /// Create the container if it does not exist yet.
    ///
    /// Idempotent. Backends without a directory concept accept any prefix,
    /// so an `Unsupported` answer counts as success.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend rejects the operation.
    pub async fn ensure_container(&self, container: &str) -> Result<(), StorageError> {
        validate_segment(container)?;
        let dir = format!("{container}/");

        if self.operator.exists(&dir).await.map_err(StorageError::from)? {
            return Ok(());
        }

        match self.operator.create_dir(&dir).await {
            Ok(()) => {
                debug!(container, "Created storage container");
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::Unsupported => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    /// Upload an object and return its public URL.
    ///
    /// With `overwrite` unset an existing object at the key is a conflict.
    /// The existence check and the write are two calls, so two racing
    /// non-overwriting writers can both succeed; keys from
    /// [`super::avatar_key`] are unique per upload, which makes that moot.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Conflict` on a collision without overwrite,
    /// or an operation error if the backend fails.
    pub async fn put(
        &self,
        container: &str,
        key: &str,
        bytes: Bytes,
        overwrite: bool,
    ) -> Result<String, StorageError> {
        let path = object_path(container, key)?;

        if !overwrite && self.operator.exists(&path).await.map_err(StorageError::from)? {
            return Err(StorageError::conflict(path));
        }

        let size = bytes.len();
        self.operator
            .write(&path, bytes)
            .await
            .map_err(StorageError::from)?;
        debug!(path = %path, size, "Stored object");

        Ok(self.object_url(container, key))
    }

    /// Read an object's content.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if the object does not exist.
    pub async fn read(&self, container: &str, key: &str) -> Result<Bytes, StorageError> {
        let path = object_path(container, key)?;
        match self.operator.read(&path).await {
            Ok(buffer) => Ok(buffer.to_bytes()),
            Err(e) if e.kind() == ErrorKind::NotFound => Err(StorageError::NotFound { key: path }),
            Err(e) => Err(e.into()),
        }
    }

    /// Check if an object exists in storage.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot answer.
    pub async fn exists(&self, container: &str, key: &str) -> Result<bool, StorageError> {
        let path = object_path(container, key)?;
        self.operator.exists(&path).await.map_err(StorageError::from)
    }

    /// Delete an object from storage. Deleting a missing object succeeds.
    ///
    /// # Errors
    ///
    /// Returns an error if deletion fails.
    pub async fn delete(&self, container: &str, key: &str) -> Result<(), StorageError> {
        let path = object_path(container, key)?;
        match self.operator.delete(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    /// List every object key in a container, sorted.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot list.
    pub async fn list_keys(&self, container: &str) -> Result<Vec<String>, StorageError> {
        validate_segment(container)?;
        let dir = format!("{container}/");

        let entries = match self.operator.list_with(&dir).recursive(true).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut keys: Vec<String> = entries
            .iter()
            .filter(|entry| entry.metadata().is_file())
            .filter_map(|entry| entry.path().strip_prefix(&dir).map(String::from))
            .collect();
        keys.sort();
        Ok(keys)
    }

    /// Public URL of an object.
    #[must_use]
    pub fn object_url(&self, container: &str, key: &str) -> String {
        format!("{}/{container}/{key}", self.config.public_base_url)
    }

    /// Recover the object key from a URL produced by [`Self::object_url`].
    ///
    /// Returns `None` when the URL does not point into `container` of this
    /// store, e.g. a default avatar hosted elsewhere.
    #[must_use]
    pub fn key_from_url(&self, container: &str, url: &str) -> Option<String> {
        let prefix = format!("{}/{container}/", self.config.public_base_url);
        let parsed_prefix = Url::parse(&prefix).ok()?;
        let parsed = Url::parse(url).ok()?;

        if parsed.origin() != parsed_prefix.origin() {
            return None;
        }

        let key = parsed.path().strip_prefix(parsed_prefix.path())?;
        if key.is_empty() || key.split('/').any(|s| s.is_empty() || s == "..") {
            return None;
        }
        Some(key.to_string())
    }

    /// Root directory of a `local_fs` store, `None` for remote backends.
    #[must_use]
    pub fn local_root(&self) -> Option<&Path> {
        match &self.config.provider {
            StorageProvider::LocalFs { root } => Some(root.as_path()),
            _ => None,
        }
    }

    /// Get the storage provider name.
    #[must_use]
    pub fn provider_name(&self) -> &'static str {
        self.config.provider.name()
    }

    /// Get the configuration.
    #[must_use]
    pub fn config(&self) -> &StorageConfig {
        &self.config
    }
}

fn configuration_error(err: opendal::Error) -> StorageError {
    StorageError::configuration(err.to_string())
}

fn validate_segment(container: &str) -> Result<(), StorageError> {
    if container.is_empty() || container.contains('/') || container == ".." {
        return Err(StorageError::InvalidKey(format!(
            "invalid container name '{container}'"
        )));
    }
    Ok(())
}

fn object_path(container: &str, key: &str) -> Result<String, StorageError> {
    validate_segment(container)?;
    if key.is_empty()
        || key.starts_with('/')
        || key.split('/').any(|s| s.is_empty() || s == "..")
    {
        return Err(StorageError::InvalidKey(format!("invalid object key '{key}'")));
    }
    Ok(format!("{container}/{key}"))
}
