//! Order service error types.

use thiserror::Error;

use crate::db::RepositoryError;

/// Errors that can occur during order operations.
#[derive(Debug, Error)]
pub enum OrderError {
    /// The submitted order is malformed or inconsistent. Detected before any
    /// store interaction, so nothing was written.
    #[error("validation failed: {0}")]
    Validation(String),

    /// No order with the given ID.
    #[error("order not found")]
    NotFound,

    /// The requested status change violates the transition policy.
    #[error("cannot transition order from {from} to {to}")]
    InvalidTransition {
        /// Status the order is currently in.
        from: String,
        /// Status the caller asked for.
        to: String,
    },

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),
}
