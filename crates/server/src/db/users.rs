//! User repository for database operations.
//!
//! The password hash never rides along on the [`User`] projection; the login
//! path fetches it explicitly via [`UserRepository::auth_by_email`] and drops
//! it as soon as verification is done.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::{debug, instrument};

use ovenbird_core::{AccountStatus, Email, UserId, UserRole};

use super::RepositoryError;
use crate::models::user::User;

/// Internal row type for user queries. Carries the hash; conversion to the
/// domain type discards it.
#[derive(Debug, sqlx::FromRow)]
struct UserRow {
    id: i32,
    full_name: String,
    email: String,
    password: Option<String>,
    phone: Option<String>,
    address: Option<String>,
    google_id: Option<String>,
    avatar: Option<String>,
    role: String,
    status: String,
    created_at: DateTime<Utc>,
}

impl UserRow {
    /// Convert into the domain projection, dropping the password hash.
    fn into_user(self) -> Result<User, RepositoryError> {
        let email = Email::parse(&self.email).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid email in database: {e}"))
        })?;
        let role: UserRole = self
            .role
            .parse()
            .map_err(RepositoryError::DataCorruption)?;
        let status: AccountStatus = self
            .status
            .parse()
            .map_err(RepositoryError::DataCorruption)?;

        Ok(User {
            id: UserId::new(self.id),
            full_name: self.full_name,
            email,
            phone: self.phone,
            address: self.address,
            google_id: self.google_id,
            avatar: self.avatar,
            role,
            status,
            created_at: self.created_at,
        })
    }
}

const USER_COLUMNS: &str = "id, full_name, email, password, phone, address, \
                            google_id, avatar, role, status, created_at";

/// Repository for user database operations.
pub struct UserRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> UserRepository<'a> {
    /// Create a new user repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Get a user by their ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if stored fields are invalid.
    pub async fn get_by_id(&self, id: UserId) -> Result<Option<User>, RepositoryError> {
        let row: Option<UserRow> =
            sqlx::query_as(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1"))
                .bind(id.as_i32())
                .fetch_optional(self.pool)
                .await?;

        row.map(UserRow::into_user).transpose()
    }

    /// Get a user by their email address.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if stored fields are invalid.
    pub async fn get_by_email(&self, email: &Email) -> Result<Option<User>, RepositoryError> {
        let row: Option<UserRow> =
            sqlx::query_as(&format!("SELECT {USER_COLUMNS} FROM users WHERE email = $1"))
                .bind(email.as_str())
                .fetch_optional(self.pool)
                .await?;

        row.map(UserRow::into_user).transpose()
    }

    /// Get a user and their stored password hash by email.
    ///
    /// The hash is `None` for federated-only accounts.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if stored fields are invalid.
    pub async fn auth_by_email(
        &self,
        email: &Email,
    ) -> Result<Option<(User, Option<String>)>, RepositoryError> {
        let row: Option<UserRow> =
            sqlx::query_as(&format!("SELECT {USER_COLUMNS} FROM users WHERE email = $1"))
                .bind(email.as_str())
                .fetch_optional(self.pool)
                .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let hash = row.password.clone();
        Ok(Some((row.into_user()?, hash)))
    }

    /// Create a new user with email and password hash.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the email already exists.
    /// Returns `RepositoryError::Database` for other database errors.
    #[instrument(skip(self, password_hash))]
    pub async fn create_with_password(
        &self,
        full_name: &str,
        email: &Email,
        password_hash: &str,
    ) -> Result<User, RepositoryError> {
        let row: UserRow = sqlx::query_as(&format!(
            r"
            INSERT INTO users (full_name, email, password)
            VALUES ($1, $2, $3)
            RETURNING {USER_COLUMNS}
            "
        ))
        .bind(full_name)
        .bind(email.as_str())
        .bind(password_hash)
        .fetch_one(self.pool)
        .await
        .map_err(map_unique_violation)?;

        debug!(user_id = row.id, "Created user");
        row.into_user()
    }

    /// Create a new user from a federated identity, with no password.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the email already exists;
    /// callers treat that as "a concurrent sign-in won the race" and re-read.
    /// Returns `RepositoryError::Database` for other database errors.
    #[instrument(skip(self, avatar))]
    pub async fn create_federated(
        &self,
        full_name: &str,
        email: &Email,
        google_id: &str,
        avatar: Option<&str>,
    ) -> Result<User, RepositoryError> {
        let row: UserRow = sqlx::query_as(&format!(
            r"
            INSERT INTO users (full_name, email, password, google_id, avatar)
            VALUES ($1, $2, NULL, $3, $4)
            RETURNING {USER_COLUMNS}
            "
        ))
        .bind(full_name)
        .bind(email.as_str())
        .bind(google_id)
        .bind(avatar)
        .fetch_one(self.pool)
        .await
        .map_err(map_unique_violation)?;

        debug!(user_id = row.id, "Created federated user");
        row.into_user()
    }

    /// Set the avatar if none is stored yet.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn backfill_avatar(
        &self,
        id: UserId,
        avatar: &str,
    ) -> Result<(), RepositoryError> {
        sqlx::query("UPDATE users SET avatar = $1 WHERE id = $2 AND avatar IS NULL")
            .bind(avatar)
            .bind(id.as_i32())
            .execute(self.pool)
            .await?;

        Ok(())
    }

    /// Partially update profile fields; absent fields keep their value.
    ///
    /// `password_hash` must already be hashed; this layer stores whatever it
    /// is given.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the user doesn't exist.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn update_profile(
        &self,
        id: UserId,
        full_name: Option<&str>,
        phone: Option<&str>,
        address: Option<&str>,
        password_hash: Option<&str>,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            r"
            UPDATE users
            SET full_name = COALESCE($2, full_name),
                phone = COALESCE($3, phone),
                address = COALESCE($4, address),
                password = COALESCE($5, password)
            WHERE id = $1
            ",
        )
        .bind(id.as_i32())
        .bind(full_name)
        .bind(phone)
        .bind(address)
        .bind(password_hash)
        .execute(self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }
}

/// Map a unique-constraint violation to `Conflict`; pass everything else
/// through.
fn map_unique_violation(e: sqlx::Error) -> RepositoryError {
    if let sqlx::Error::Database(ref db_err) = e
        && db_err.is_unique_violation()
    {
        return RepositoryError::Conflict("email already exists".to_owned());
    }
    RepositoryError::Database(e)
}
