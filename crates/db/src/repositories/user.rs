//! User repository: the Postgres credential store.

use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, PaginatorTrait,
    QueryFilter, Set, SqlErr,
};
use tracing::{debug, error};
use uuid::Uuid;
use vouch_core::account::{CredentialError, CredentialStore, NewUser, User};
use vouch_core::auth::{
    PasswordPolicy, hash_password_blocking, normalize_email, validate_email,
    verify_password_blocking,
};

use crate::entities::users;

/// User repository backed by the `users` table.
#[derive(Debug, Clone)]
pub struct UserRepository {
    db: DatabaseConnection,
    policy: PasswordPolicy,
}

impl UserRepository {
    /// Creates a new user repository with the default password policy.
    #[must_use]
    pub fn new(db: DatabaseConnection) -> Self {
        Self::with_policy(db, PasswordPolicy::default())
    }

    /// Creates a new user repository enforcing `policy`.
    #[must_use]
    pub const fn with_policy(db: DatabaseConnection, policy: PasswordPolicy) -> Self {
        Self { db, policy }
    }

    /// Finds the full row by ID, including the password hash.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_model(&self, id: Uuid) -> Result<Option<users::Model>, DbErr> {
        users::Entity::find_by_id(id).one(&self.db).await
    }

    /// Checks if an email is already registered, ignoring case.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn email_exists(&self, email: &str) -> Result<bool, DbErr> {
        let count = users::Entity::find()
            .filter(users::Column::NormalizedEmail.eq(normalize_email(email)))
            .count(&self.db)
            .await?;

        Ok(count > 0)
    }
}

fn backend(err: DbErr) -> CredentialError {
    error!(error = %err, "User query failed");
    CredentialError::backend(err.to_string())
}

fn duplicate_email(email: &str) -> String {
    format!("Email '{email}' is already taken.")
}

impl CredentialStore for UserRepository {
    async fn create(&self, user: NewUser, password: &str) -> Result<User, CredentialError> {
        let mut reasons = Vec::new();
        if let Some(reason) = validate_email(&user.email) {
            reasons.push(reason);
        } else if self.email_exists(&user.email).await.map_err(backend)? {
            reasons.push(duplicate_email(&user.email));
        }
        reasons.extend(self.policy.violations(password));
        if !reasons.is_empty() {
            return Err(CredentialError::Rejected(reasons));
        }

        let password_hash = hash_password_blocking(password.to_string()).await?;
        let now = chrono::Utc::now().into();
        let model = users::ActiveModel {
            id: Set(Uuid::now_v7()),
            normalized_email: Set(normalize_email(&user.email)),
            email: Set(user.email.clone()),
            username: Set(user.username),
            password_hash: Set(password_hash),
            avatar_url: Set(user.avatar_url),
            created_at: Set(now),
            updated_at: Set(now),
        };

        match model.insert(&self.db).await {
            Ok(created) => {
                debug!(user_id = %created.id, "Inserted user");
                Ok(created.into())
            }
            // Lost a race with a concurrent signup for the same email.
            Err(e) if matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) => Err(
                CredentialError::Rejected(vec![duplicate_email(&user.email)]),
            ),
            Err(e) => Err(backend(e)),
        }
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, CredentialError> {
        Ok(self.find_model(id).await.map_err(backend)?.map(User::from))
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, CredentialError> {
        users::Entity::find()
            .filter(users::Column::NormalizedEmail.eq(normalize_email(email)))
            .one(&self.db)
            .await
            .map(|found| found.map(User::from))
            .map_err(backend)
    }

    async fn verify_password(&self, user: &User, password: &str) -> Result<bool, CredentialError> {
        let Some(model) = self.find_model(user.id).await.map_err(backend)? else {
            return Ok(false);
        };
        Ok(verify_password_blocking(password.to_string(), model.password_hash).await?)
    }

    async fn set_avatar_url(&self, id: Uuid, avatar_url: &str) -> Result<(), CredentialError> {
        let result = users::Entity::update_many()
            .col_expr(users::Column::AvatarUrl, Expr::value(avatar_url.to_string()))
            .col_expr(users::Column::UpdatedAt, Expr::value(chrono::Utc::now()))
            .filter(users::Column::Id.eq(id))
            .exec(&self.db)
            .await
            .map_err(backend)?;

        if result.rows_affected == 0 {
            return Err(CredentialError::NotFound(id));
        }
        Ok(())
    }
}
