//! CLI command implementations.

pub mod admin;
pub mod migrate;
pub mod seed;

use thiserror::Error;

/// Errors shared by commands that talk to the database.
#[derive(Debug, Error)]
pub enum CommandError {
    /// Required environment variable is missing.
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(&'static str),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Migration error.
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// Repository error from the server crate.
    #[error("Repository error: {0}")]
    Repository(#[from] ovenbird_server::db::RepositoryError),

    /// Password hashing error.
    #[error("Auth error: {0}")]
    Auth(#[from] ovenbird_server::services::auth::AuthError),

    /// Input validation error.
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Load the database URL from `OVENBIRD_DATABASE_URL` or `DATABASE_URL`.
pub(crate) fn database_url() -> Result<String, CommandError> {
    std::env::var("OVENBIRD_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
        .map_err(|_| CommandError::MissingEnvVar("OVENBIRD_DATABASE_URL"))
}
