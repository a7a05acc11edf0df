use std::fmt;
use thiserror::Error;

use crate::news::Article;

// ============================================================================
// Error Types
// ============================================================================

/// Database-specific errors with user-friendly messages
#[derive(Debug, Error)]
pub enum DatabaseError {
    /// Another process holds a lock on the database file
    #[error("The database is locked by another process. Please close it and try again.")]
    InstanceLocked,

    /// Schema bootstrap failed
    #[error("Database setup failed: {0}")]
    Migration(String),

    /// Generic database error
    #[error("Database error: {0}")]
    Other(#[from] sqlx::Error),
}

impl DatabaseError {
    /// Check if a sqlx error indicates database locking
    pub(crate) fn from_sqlx(err: sqlx::Error) -> Self {
        if is_lock_error(&err.to_string()) {
            return DatabaseError::InstanceLocked;
        }
        DatabaseError::Other(err)
    }
}

/// SQLITE_BUSY (5) and SQLITE_LOCKED (6) surface through the error message
/// text. SQLITE_CANTOPEN is a path or permission problem, not contention.
pub(crate) fn is_lock_error(message: &str) -> bool {
    let message = message.to_lowercase();
    message.contains("database is locked")
        || message.contains("database table is locked")
        || message.contains("sqlite_busy")
        || message.contains("sqlite_locked")
}

/// Failures of account registration and login.
///
/// Unknown usernames and wrong passwords both map to
/// [`CredentialError::InvalidCredentials`] so callers cannot tell them apart.
#[derive(Debug, Error)]
pub enum CredentialError {
    #[error("User already exists.")]
    UsernameTaken,

    #[error("Username must not be empty.")]
    EmptyUsername,

    #[error("Invalid credentials.")]
    InvalidCredentials,

    #[error("Storage error: {0}")]
    Storage(#[from] sqlx::Error),
}

// ============================================================================
// Data Structures
// ============================================================================

/// Identifier of a registered user, assigned by the database.
///
/// Every saved-article operation is scoped by one of these.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, sqlx::Type)]
#[sqlx(transparent)]
pub struct UserId(pub i64);

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A row of the `users` table.
///
/// `password` is the hex PBKDF2 digest, never the plain text.
#[derive(Clone, sqlx::FromRow)]
pub struct UserRecord {
    pub id: UserId,
    pub username: String,
    pub password: String,
    pub salt: String,
}

/// Hash and salt stay out of debug output.
impl fmt::Debug for UserRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UserRecord")
            .field("id", &self.id)
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .field("salt", &"[REDACTED]")
            .finish()
    }
}

/// A saved article as stored: its row id and the serialized article payload.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct SavedArticle {
    pub id: i64,
    #[sqlx(rename = "article")]
    pub payload: Vec<u8>,
}

impl SavedArticle {
    /// Decode the stored payload back into the article it was saved from.
    pub fn article(&self) -> Result<Article, serde_json::Error> {
        serde_json::from_slice(&self.payload)
    }
}
