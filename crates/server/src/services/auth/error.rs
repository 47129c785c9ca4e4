//! Authentication error types.

use thiserror::Error;

use crate::db::RepositoryError;

/// Errors that can occur during authentication operations.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Invalid email format.
    #[error("invalid email: {0}")]
    InvalidEmail(#[from] ovenbird_core::EmailError),

    /// Credential mismatch. Deliberately undifferentiated: callers never
    /// learn whether the email or the password was wrong.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// The account exists and the credential matched, but the account is
    /// locked.
    #[error("account is locked")]
    AccountLocked,

    /// The email is already registered.
    #[error("email already in use")]
    EmailTaken,

    /// Password too weak or invalid.
    #[error("password validation failed: {0}")]
    WeakPassword(String),

    /// Password hashing error.
    #[error("password hashing error")]
    PasswordHash,

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),
}
