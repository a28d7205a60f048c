//! User repository: the credential store.

use nursery_core::auth::{
    AuthError, UserRole, check_new_password, hash_password, verify_dummy_password,
    verify_password,
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set, SqlErr, sea_query::Expr,
};
use tracing::{info, warn};

use super::auth_db_err;
use crate::entities::users;

/// User repository for credential operations.
#[derive(Debug, Clone)]
pub struct UserRepository {
    db: DatabaseConnection,
}

impl UserRepository {
    /// Creates a new user repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Finds a user by username.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find(&self, username: &str) -> Result<Option<users::Model>, AuthError> {
        users::Entity::find_by_id(username.to_string())
            .one(&self.db)
            .await
            .map_err(auth_db_err)
    }

    /// Lists all users ordered by username.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list(&self) -> Result<Vec<users::Model>, AuthError> {
        users::Entity::find()
            .order_by_asc(users::Column::Username)
            .all(&self.db)
            .await
            .map_err(auth_db_err)
    }

    /// Checks a username/password pair and returns the user's role.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidCredentials` for an unknown user or a wrong
    /// password; both look the same to the caller and take the same Argon2
    /// work.
    pub async fn verify(&self, username: &str, password: &str) -> Result<UserRole, AuthError> {
        let Some(user) = self.find(username.trim()).await? else {
            verify_dummy_password(password)?;
            warn!(username, "login attempt for unknown user");
            return Err(AuthError::InvalidCredentials);
        };

        if !verify_password(password, &user.password_hash)? {
            warn!(username, "wrong password");
            return Err(AuthError::InvalidCredentials);
        }

        user.role.parse()
    }

    /// Creates an account.
    ///
    /// # Errors
    ///
    /// - `AuthError::Validation` if username or password is empty
    /// - `AuthError::UserExists` if the username is taken
    pub async fn create(
        &self,
        username: &str,
        password: &str,
        role: UserRole,
    ) -> Result<(), AuthError> {
        let username = username.trim();
        if username.is_empty() || password.is_empty() {
            return Err(AuthError::Validation(
                "username and password are required".to_string(),
            ));
        }
        if self.find(username).await?.is_some() {
            return Err(AuthError::UserExists(username.to_string()));
        }

        let user = users::ActiveModel {
            username: Set(username.to_string()),
            password_hash: Set(hash_password(password)?),
            role: Set(role.as_str().to_string()),
        };

        match user.insert(&self.db).await {
            Ok(_) => {
                info!(username, %role, "user created");
                Ok(())
            }
            Err(err) if matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) => {
                Err(AuthError::UserExists(username.to_string()))
            }
            Err(err) => Err(auth_db_err(err)),
        }
    }

    /// Replaces the password after checking the old one.
    ///
    /// # Errors
    ///
    /// - `AuthError::InvalidCredentials` if the old password does not match
    /// - `AuthError::Validation` if the new password is empty or differs from
    ///   its confirmation
    pub async fn change_password(
        &self,
        username: &str,
        old_password: &str,
        new_password: &str,
        confirm_password: &str,
    ) -> Result<(), AuthError> {
        self.verify(username, old_password).await?;
        check_new_password(new_password, confirm_password)?;

        self.store_password(username.trim(), new_password).await?;
        info!(username, "password changed");
        Ok(())
    }

    /// Replaces the password without the old one.
    ///
    /// Only call this after a password passcode has been verified.
    ///
    /// # Errors
    ///
    /// - `AuthError::UserNotFound` if the user does not exist
    /// - `AuthError::Validation` if the new password is empty
    pub async fn reset_password(
        &self,
        username: &str,
        new_password: &str,
    ) -> Result<(), AuthError> {
        check_new_password(new_password, new_password)?;

        self.store_password(username.trim(), new_password).await?;
        info!(username, "password reset");
        Ok(())
    }

    async fn store_password(&self, username: &str, new_password: &str) -> Result<(), AuthError> {
        let result = users::Entity::update_many()
            .col_expr(
                users::Column::PasswordHash,
                Expr::value(hash_password(new_password)?),
            )
            .filter(users::Column::Username.eq(username))
            .exec(&self.db)
            .await
            .map_err(auth_db_err)?;

        if result.rows_affected == 0 {
            return Err(AuthError::UserNotFound(username.to_string()));
        }
        Ok(())
    }

    /// Returns true if at least one admin account exists.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn admin_exists(&self) -> Result<bool, AuthError> {
        let count = users::Entity::find()
            .filter(users::Column::Role.eq(UserRole::Admin.as_str()))
            .count(&self.db)
            .await
            .map_err(auth_db_err)?;

        Ok(count > 0)
    }

    /// Seeds the default admin when the store has no admin at all.
    ///
    /// Returns true if an account was created.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn ensure_default_admin(
        &self,
        username: &str,
        password: &str,
    ) -> Result<bool, AuthError> {
        if self.admin_exists().await? {
            return Ok(false);
        }

        match self.create(username, password, UserRole::Admin).await {
            Ok(()) => {
                warn!(
                    username,
                    "seeded default admin account; change its password immediately"
                );
                Ok(true)
            }
            Err(AuthError::UserExists(_)) => {
                warn!(username, "no admin account exists and the default username is taken");
                Ok(false)
            }
            Err(err) => Err(err),
        }
    }
}
