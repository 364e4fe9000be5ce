//! Avatar lifecycle: upload, link, then clean up the old object.
//!
//! An update walks `Uploading -> Uploaded -> RecordUpdating -> Committed`.
//! The new object is written under a fresh key before the user record is
//! touched, and the old object is deleted only once the new reference is
//! persisted. If the record cannot be updated the new object is deleted
//! again, so the record and the store never disagree about the current
//! avatar.
//!
//! Updates for the same user are serialized in-process. Across processes
//! the last writer wins on the user record.

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};
use uuid::Uuid;
use vouch_shared::{AppError, AppResult};

use super::store::{CredentialError, CredentialStore};
use super::types::{AvatarUpdate, Identity, PreviousAvatar, StoredObject, UploadedFile};
use crate::storage::{StorageService, avatar_key};

type LockTable = DashMap<Uuid, Arc<Mutex<()>>>;

/// A user's slot in the lock table.
///
/// Dropping it removes the table entry once no other update holds it,
/// including when the update future is dropped before finishing.
struct LockSlot<'a> {
    locks: &'a LockTable,
    user_id: Uuid,
    lock: Arc<Mutex<()>>,
}

impl<'a> LockSlot<'a> {
    fn acquire(locks: &'a LockTable, user_id: Uuid) -> Self {
        let lock = locks
            .entry(user_id)
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();
        Self {
            locks,
            user_id,
            lock,
        }
    }
}

impl Drop for LockSlot<'_> {
    fn drop(&mut self) {
        // One reference in the table, one here.
        self.locks.remove_if(&self.user_id, |_, lock| {
            Arc::ptr_eq(lock, &self.lock) && Arc::strong_count(lock) == 2
        });
    }
}

/// Orchestrates avatar uploads against the object store and the credential store.
pub struct AvatarManager<S: CredentialStore> {
    storage: Arc<StorageService>,
    store: Arc<S>,
    container: String,
    locks: LockTable,
}

impl<S: CredentialStore> AvatarManager<S> {
    /// Create a manager writing into `container`.
    #[must_use]
    pub fn new(storage: Arc<StorageService>, store: Arc<S>, container: impl Into<String>) -> Self {
        Self {
            storage,
            store,
            container: container.into(),
            locks: DashMap::new(),
        }
    }

    /// Container that holds avatars.
    #[must_use]
    pub fn container(&self) -> &str {
        &self.container
    }

    /// Replace the caller's avatar with `file`.
    ///
    /// # Errors
    ///
    /// - `Unauthorized` without an identity
    /// - `InvalidInput` for a missing, empty, oversized, or non-image file,
    ///   before anything is written
    /// - `NotFound` if the user record is gone; the upload is removed
    /// - `CommitFailed` if the record cannot be updated; the upload is
    ///   removed and the old avatar stays current
    /// - `StoreUnavailable` if the object store fails
    pub async fn update_avatar(
        &self,
        identity: Option<&Identity>,
        file: Option<UploadedFile>,
    ) -> AppResult<AvatarUpdate> {
        let identity = identity.ok_or(AppError::Unauthorized)?;
        let file = self.check_file(file)?;

        let slot = LockSlot::acquire(&self.locks, identity.user_id);
        let _guard = slot.lock.lock().await;

        self.replace(identity.user_id, &file).await
    }

    /// Current avatar reference of the caller, returned as stored.
    ///
    /// # Errors
    ///
    /// `Unauthorized` without an identity, `NotFound` if the user or the
    /// reference is missing.
    pub async fn get_avatar(&self, identity: Option<&Identity>) -> AppResult<String> {
        let identity = identity.ok_or(AppError::Unauthorized)?;

        let user = self
            .store
            .find_by_id(identity.user_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("user {}", identity.user_id)))?;

        match user.avatar_url {
            Some(url) if !url.is_empty() => Ok(url),
            _ => Err(AppError::NotFound("avatar".to_string())),
        }
    }

    /// Upload `file` under a fresh key scoped to `owner`.
    ///
    /// # Errors
    ///
    /// `Conflict` if the key exists and `overwrite` is unset,
    /// `StoreUnavailable` if the store fails.
    pub async fn store_new(
        &self,
        owner: &str,
        file: &UploadedFile,
        overwrite: bool,
    ) -> AppResult<StoredObject> {
        self.storage.ensure_container(&self.container).await?;

        let key = avatar_key(owner, &file.file_name);
        let url = self
            .storage
            .put(&self.container, &key, file.bytes.clone(), overwrite)
            .await?;
        info!(key = %key, size = file.len(), "Uploaded avatar");

        Ok(StoredObject { key, url })
    }

    /// Delete an object this manager just uploaded. Failures are logged only.
    pub async fn discard(&self, key: &str) {
        match self.storage.delete(&self.container, key).await {
            Ok(()) => debug!(key, "Discarded uploaded avatar"),
            Err(e) => error!(key, error = %e, "Failed to discard uploaded avatar, object is orphaned"),
        }
    }

    /// Number of users with an update in flight.
    #[must_use]
    pub fn active_locks(&self) -> usize {
        self.locks.len()
    }

    /// Check size and content type of a file against the storage limits.
    ///
    /// # Errors
    ///
    /// `InvalidInput` naming the broken limit.
    pub fn validate_file(&self, file: &UploadedFile) -> AppResult<()> {
        self.storage
            .validate_upload(file.content_type.as_deref(), file.len() as u64)?;
        Ok(())
    }

    fn check_file(&self, file: Option<UploadedFile>) -> AppResult<UploadedFile> {
        let file = file
            .filter(|f| !f.is_empty())
            .ok_or_else(|| AppError::invalid_input("No file uploaded."))?;
        self.validate_file(&file)?;
        Ok(file)
    }

    async fn replace(&self, user_id: Uuid, file: &UploadedFile) -> AppResult<AvatarUpdate> {
        let stored = self.store_new(&user_id.to_string(), file, true).await?;

        let user = match self.store.find_by_id(user_id).await {
            Ok(Some(user)) => user,
            Ok(None) => {
                warn!(user_id = %user_id, "Avatar update for unknown user");
                self.discard(&stored.key).await;
                return Err(AppError::NotFound(format!("user {user_id}")));
            }
            Err(e) => {
                self.discard(&stored.key).await;
                return Err(e.into());
            }
        };

        if let Err(e) = self.store.set_avatar_url(user_id, &stored.url).await {
            self.discard(&stored.key).await;
            return Err(match e {
                CredentialError::NotFound(id) => AppError::NotFound(format!("user {id}")),
                other => {
                    error!(user_id = %user_id, error = %other, "Failed to persist avatar reference");
                    AppError::CommitFailed(other.to_string())
                }
            });
        }
        info!(user_id = %user_id, avatar_url = %stored.url, "Avatar reference updated");

        let previous = self
            .remove_previous(user.avatar_url.as_deref(), &stored.url)
            .await;

        Ok(AvatarUpdate {
            avatar_url: stored.url,
            previous,
        })
    }

    async fn remove_previous(&self, previous: Option<&str>, current: &str) -> PreviousAvatar {
        let Some(previous) = previous.filter(|url| !url.is_empty() && *url != current) else {
            return PreviousAvatar::NoPrevious;
        };
        let Some(key) = self.storage.key_from_url(&self.container, previous) else {
            return PreviousAvatar::Unmanaged;
        };

        match self.storage.exists(&self.container, &key).await {
            Ok(false) => return PreviousAvatar::AlreadyGone,
            Ok(true) => {}
            Err(e) => {
                warn!(key = %key, error = %e, "Could not check previous avatar");
                return PreviousAvatar::Failed(e.to_string());
            }
        }

        match self.storage.delete(&self.container, &key).await {
            Ok(()) => {
                debug!(key = %key, "Removed previous avatar");
                PreviousAvatar::Removed
            }
            Err(e) => {
                warn!(key = %key, error = %e, "Failed to remove previous avatar");
                PreviousAvatar::Failed(e.to_string())
            }
        }
    }
}
