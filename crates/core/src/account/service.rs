//! Account facade: signup, signin, and avatar operations.

use std::sync::Arc;

use tracing::{info, warn};
use vouch_shared::{AppError, AppResult, JwtService, config::AvatarConfig};

use super::avatar::AvatarManager;
use super::store::CredentialStore;
use super::types::{AvatarUpdate, Identity, NewUser, UploadedFile, User};
use crate::auth::{equalize_verification, normalize_email};
use crate::storage::StorageService;

/// Composes the credential store, object store, and token issuer.
pub struct AccountService<S: CredentialStore> {
    store: Arc<S>,
    jwt: Arc<JwtService>,
    avatars: AvatarManager<S>,
    default_avatar_url: String,
}

impl<S: CredentialStore> AccountService<S> {
    /// Create a new account service.
    #[must_use]
    pub fn new(
        store: Arc<S>,
        storage: Arc<StorageService>,
        jwt: Arc<JwtService>,
        avatar: &AvatarConfig,
    ) -> Self {
        Self {
            avatars: AvatarManager::new(storage, Arc::clone(&store), avatar.container.clone()),
            store,
            jwt,
            default_avatar_url: avatar.default_url.clone(),
        }
    }

    /// Register a user, optionally with a profile image.
    ///
    /// A non-empty file is uploaded first and never overwrites an existing
    /// object. Without one the user gets the default avatar. If the
    /// credential store refuses the user the upload is deleted again.
    ///
    /// # Errors
    ///
    /// `InvalidInput` for an oversized or non-image file or with every
    /// reason the store reported, `Conflict` on
    /// a key collision, `StoreUnavailable` if the upload fails.
    pub async fn signup(
        &self,
        email: &str,
        password: &str,
        profile_image: Option<UploadedFile>,
    ) -> AppResult<User> {
        let uploaded = match profile_image.filter(|file| !file.is_empty()) {
            Some(file) => {
                self.avatars.validate_file(&file)?;
                let owner = normalize_email(email);
                Some(self.avatars.store_new(&owner, &file, false).await?)
            }
            None => None,
        };

        let avatar_url = uploaded
            .as_ref()
            .map_or_else(|| self.default_avatar_url.clone(), |obj| obj.url.clone());
        let new_user = NewUser {
            email: email.to_string(),
            username: email.to_string(),
            avatar_url: Some(avatar_url),
        };

        match self.store.create(new_user, password).await {
            Ok(user) => {
                info!(user_id = %user.id, "User signed up");
                Ok(user)
            }
            Err(e) => {
                if let Some(obj) = uploaded {
                    self.avatars.discard(&obj.key).await;
                }
                warn!(error = %e, "Signup rejected");
                Err(e.into())
            }
        }
    }

    /// Check credentials and issue a bearer token.
    ///
    /// # Errors
    ///
    /// `Unauthorized` for an unknown email or a wrong password alike.
    pub async fn signin(&self, email: &str, password: &str) -> AppResult<String> {
        let Some(user) = self.store.find_by_email(email).await? else {
            equalize_verification(password.to_string()).await;
            warn!("Signin failed");
            return Err(AppError::Unauthorized);
        };

        if !self.store.verify_password(&user, password).await? {
            warn!(user_id = %user.id, "Signin failed");
            return Err(AppError::Unauthorized);
        }

        let token = self.jwt.issue(user.id, &user.email)?;
        info!(user_id = %user.id, "Issued token");
        Ok(token)
    }

    /// See [`AvatarManager::update_avatar`].
    ///
    /// # Errors
    ///
    /// As [`AvatarManager::update_avatar`].
    pub async fn update_avatar(
        &self,
        identity: Option<&Identity>,
        file: Option<UploadedFile>,
    ) -> AppResult<AvatarUpdate> {
        self.avatars.update_avatar(identity, file).await
    }

    /// See [`AvatarManager::get_avatar`].
    ///
    /// # Errors
    ///
    /// As [`AvatarManager::get_avatar`].
    pub async fn get_avatar(&self, identity: Option<&Identity>) -> AppResult<String> {
        self.avatars.get_avatar(identity).await
    }

    /// Token issuer used by signin.
    #[must_use]
    pub fn jwt(&self) -> &JwtService {
        &self.jwt
    }

    /// The avatar lifecycle manager.
    #[must_use]
    pub fn avatars(&self) -> &AvatarManager<S> {
        &self.avatars
    }
}
