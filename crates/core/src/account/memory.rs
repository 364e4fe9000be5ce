//! In-process credential store for tests and local runs.

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use tracing::debug;
use uuid::Uuid;

use super::store::{CredentialError, CredentialStore};
use super::types::{NewUser, User};
use crate::auth::{
    PasswordPolicy, hash_password_blocking, normalize_email, validate_email,
    verify_password_blocking,
};

#[derive(Debug, Clone)]
struct StoredUser {
    user: User,
    password_hash: String,
}

/// Credential store kept in memory. Contents are lost on drop.
#[derive(Debug, Default)]
pub struct InMemoryCredentialStore {
    users: DashMap<Uuid, StoredUser>,
    emails: DashMap<String, Uuid>,
    policy: PasswordPolicy,
}

impl InMemoryCredentialStore {
    /// Creates an empty store with the default password policy.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty store enforcing `policy`.
    #[must_use]
    pub fn with_policy(policy: PasswordPolicy) -> Self {
        Self {
            policy,
            ..Self::default()
        }
    }

    /// Number of registered users.
    #[must_use]
    pub fn len(&self) -> usize {
        self.users.len()
    }

    /// Whether no user is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}

fn duplicate_email(email: &str) -> String {
    format!("Email '{email}' is already taken.")
}

impl CredentialStore for InMemoryCredentialStore {
    async fn create(&self, user: NewUser, password: &str) -> Result<User, CredentialError> {
        let normalized = normalize_email(&user.email);

        let mut reasons = Vec::new();
        if let Some(reason) = validate_email(&user.email) {
            reasons.push(reason);
        } else if self.emails.contains_key(&normalized) {
            reasons.push(duplicate_email(&user.email));
        }
        reasons.extend(self.policy.violations(password));
        if !reasons.is_empty() {
            return Err(CredentialError::Rejected(reasons));
        }

        let password_hash = hash_password_blocking(password.to_string()).await?;
        let id = Uuid::now_v7();

        // A concurrent signup may have claimed the email while hashing.
        match self.emails.entry(normalized) {
            Entry::Occupied(_) => {
                return Err(CredentialError::Rejected(vec![duplicate_email(
                    &user.email,
                )]));
            }
            Entry::Vacant(slot) => {
                slot.insert(id);
            }
        }

        let created = User {
            id,
            email: user.email,
            username: user.username,
            avatar_url: user.avatar_url,
        };
        self.users.insert(
            id,
            StoredUser {
                user: created.clone(),
                password_hash,
            },
        );
        debug!(user_id = %id, "Created user in memory");

        Ok(created)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, CredentialError> {
        Ok(self.users.get(&id).map(|stored| stored.user.clone()))
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, CredentialError> {
        let Some(id) = self.emails.get(&normalize_email(email)).map(|id| *id) else {
            return Ok(None);
        };
        self.find_by_id(id).await
    }

    async fn verify_password(&self, user: &User, password: &str) -> Result<bool, CredentialError> {
        let Some(hash) = self
            .users
            .get(&user.id)
            .map(|stored| stored.password_hash.clone())
        else {
            return Ok(false);
        };
        Ok(verify_password_blocking(password.to_string(), hash).await?)
    }

    async fn set_avatar_url(&self, id: Uuid, avatar_url: &str) -> Result<(), CredentialError> {
        let mut stored = self
            .users
            .get_mut(&id)
            .ok_or(CredentialError::NotFound(id))?;
        stored.user.avatar_url = Some(avatar_url.to_string());
        Ok(())
    }
}
