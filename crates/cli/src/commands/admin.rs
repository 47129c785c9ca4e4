//! Admin user management commands.
//!
//! # Usage
//!
//! ```bash
//! ovb-cli admin create -e admin@example.com -n "Admin Name" -p <password>
//! ```
//!
//! # Environment Variables
//!
//! - `OVENBIRD_DATABASE_URL` (or `DATABASE_URL`) - `PostgreSQL` connection string

use sqlx::PgPool;

use ovenbird_core::Email;
use ovenbird_server::services::auth::hash_password;

use super::{CommandError, database_url};

/// Create a new admin user.
///
/// # Errors
///
/// Returns an error for a malformed email, a taken email, or a database
/// failure.
pub async fn create_user(email: &str, name: &str, password: &str) -> Result<i32, CommandError> {
    dotenvy::dotenv().ok();

    let email =
        Email::parse(email).map_err(|e| CommandError::InvalidInput(format!("email: {e}")))?;
    let password_hash = hash_password(password)?;

    let database_url = database_url()?;

    tracing::info!("Connecting to database...");
    let pool = PgPool::connect(&database_url).await?;

    tracing::info!("Creating admin user: {email}");

    let existing: Option<i32> = sqlx::query_scalar("SELECT id FROM users WHERE email = $1")
        .bind(email.as_str())
        .fetch_optional(&pool)
        .await?;

    if existing.is_some() {
        return Err(CommandError::InvalidInput(format!(
            "user already exists with email: {email}"
        )));
    }

    let user_id: i32 = sqlx::query_scalar(
        r"
        INSERT INTO users (full_name, email, password, role)
        VALUES ($1, $2, $3, 'admin')
        RETURNING id
        ",
    )
    .bind(name)
    .bind(email.as_str())
    .bind(&password_hash)
    .fetch_one(&pool)
    .await?;

    tracing::info!("Admin user created successfully! ID: {user_id}, Email: {email}");

    Ok(user_id)
}
