use anyhow::Result;

use super::schema::Database;
use super::types::{CredentialError, UserId, UserRecord};
use crate::password;

impl Database {
    // ========================================================================
    // Account Operations
    // ========================================================================

    /// Look up a user by exact (case-sensitive) username.
    ///
    /// The UNIQUE constraint on `users.username` guarantees at most one row.
    pub async fn find_user(&self, username: &str) -> Result<Option<UserRecord>> {
        let row = sqlx::query_as::<_, UserRecord>(
            "SELECT id, username, password, salt FROM users WHERE username = ?",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    /// Register a new account and return its id.
    ///
    /// A fresh salt is generated for every user and only the PBKDF2 digest of
    /// the password is stored.
    ///
    /// # Errors
    ///
    /// - [`CredentialError::EmptyUsername`] if `username` is empty
    /// - [`CredentialError::UsernameTaken`] if the username is already
    ///   registered; the existing account is left untouched
    /// - [`CredentialError::Storage`] for database failures
    pub async fn create_user(&self, username: &str, password: &str) -> Result<UserId, CredentialError> {
        if username.is_empty() {
            return Err(CredentialError::EmptyUsername);
        }

        let existing: Option<(i64,)> = sqlx::query_as("SELECT id FROM users WHERE username = ?")
            .bind(username)
            .fetch_optional(&self.pool)
            .await?;
        if existing.is_some() {
            tracing::debug!("Registration rejected, username taken");
            return Err(CredentialError::UsernameTaken);
        }

        // Hashing happens before the insert so no connection is held across it.
        let salt = password::generate_salt();
        let hash = password::hash_password(password, &salt);

        let result = sqlx::query_as::<_, (i64,)>(
            "INSERT INTO users (username, password, salt) VALUES (?, ?, ?) RETURNING id",
        )
        .bind(username)
        .bind(&hash)
        .bind(&salt)
        .fetch_one(&self.pool)
        .await;

        match result {
            Ok((id,)) => {
                tracing::info!(user_id = id, "Created user");
                Ok(UserId(id))
            }
            // Lost a race with another registration between check and insert
            Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => {
                Err(CredentialError::UsernameTaken)
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Verify a username/password pair and return the user's id.
    ///
    /// # Errors
    ///
    /// [`CredentialError::InvalidCredentials`] when the user does not exist or
    /// the password does not match; [`CredentialError::Storage`] for database
    /// failures.
    pub async fn authenticate(&self, username: &str, password: &str) -> Result<UserId, CredentialError> {
        let row = sqlx::query_as::<_, UserRecord>(
            "SELECT id, username, password, salt FROM users WHERE username = ?",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;

        let Some(user) = row else {
            tracing::debug!("Login failed, unknown user");
            return Err(CredentialError::InvalidCredentials);
        };

        if password::verify_password(password, &user.password, &user.salt) {
            tracing::info!(user_id = user.id.0, "User authenticated");
            Ok(user.id)
        } else {
            tracing::debug!(user_id = user.id.0, "Login failed, wrong password");
            Err(CredentialError::InvalidCredentials)
        }
    }
}
