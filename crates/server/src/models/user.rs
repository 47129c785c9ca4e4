//! User domain types.

use chrono::{DateTime, Utc};
use serde::Serialize;

use ovenbird_core::{AccountStatus, Email, UserId, UserRole};

/// A user account.
///
/// This type deliberately has no password field: it is the projection handed
/// to routes and serialized to clients, so the credential hash cannot leak by
/// accident. The hash is only reachable through
/// [`crate::db::users::UserRepository::auth_by_email`].
#[derive(Debug, Clone, Serialize)]
pub struct User {
    pub id: UserId,
    pub full_name: String,
    pub email: Email,
    pub phone: Option<String>,
    pub address: Option<String>,
    /// External subject ID for accounts created via federated sign-in.
    pub google_id: Option<String>,
    pub avatar: Option<String>,
    pub role: UserRole,
    pub status: AccountStatus,
    pub created_at: DateTime<Utc>,
}

/// Partial profile update.
///
/// `password`, when present, is the new plaintext from the client; it is
/// hashed before it ever reaches the store.
#[derive(Debug, Clone, Default)]
pub struct UpdateProfile {
    pub full_name: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub password: Option<String>,
}
