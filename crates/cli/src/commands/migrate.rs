//! Database migration command.
//!
//! Migrations live in `crates/server/migrations/` and are embedded at compile
//! time, so the binary carries its own schema history.
//!
//! # Environment Variables
//!
//! - `OVENBIRD_DATABASE_URL` (or `DATABASE_URL`) - `PostgreSQL` connection string

use sqlx::PgPool;

use super::{CommandError, database_url};

/// Run all pending migrations.
///
/// # Errors
///
/// Returns an error if the database is unreachable or a migration fails.
pub async fn run() -> Result<(), CommandError> {
    dotenvy::dotenv().ok();

    let database_url = database_url()?;

    tracing::info!("Connecting to database...");
    let pool = PgPool::connect(&database_url).await?;

    tracing::info!("Running migrations...");
    sqlx::migrate!("../server/migrations").run(&pool).await?;

    tracing::info!("Migrations complete!");
    Ok(())
}
