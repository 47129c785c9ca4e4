//! Authentication service: the identity resolver.
//!
//! Resolves a password credential or a verified federated identity to
//! exactly one user record. The federated path is create-or-reuse: a lost
//! insert race is not an error, it means another request created the account
//! a moment ago, so we return that row.

mod error;

pub use error::AuthError;

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use sqlx::PgPool;
use tracing::{info, instrument, warn};

use ovenbird_core::{AccountStatus, Email, UserId};

use crate::db::RepositoryError;
use crate::db::users::UserRepository;
use crate::models::user::{UpdateProfile, User};
use crate::services::google::VerifiedIdentity;

/// Minimum password length.
const MIN_PASSWORD_LENGTH: usize = 8;

/// Authentication service.
pub struct AuthService<'a> {
    users: UserRepository<'a>,
}

impl<'a> AuthService<'a> {
    /// Create a new authentication service.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self {
            users: UserRepository::new(pool),
        }
    }

    /// Register a new user with email and password.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidEmail` if the email format is invalid.
    /// Returns `AuthError::WeakPassword` if the password doesn't meet
    /// requirements.
    /// Returns `AuthError::EmailTaken` if the email is already registered.
    #[instrument(skip(self, password))]
    pub async fn register(
        &self,
        full_name: &str,
        email: &str,
        password: &str,
    ) -> Result<User, AuthError> {
        let email = Email::parse(email)?;
        validate_password(password)?;
        let password_hash = hash_password(password)?;

        let user = self
            .users
            .create_with_password(full_name, &email, &password_hash)
            .await
            .map_err(|e| match e {
                RepositoryError::Conflict(_) => AuthError::EmailTaken,
                other => AuthError::Repository(other),
            })?;

        info!(user_id = %user.id, "Registered user");
        Ok(user)
    }

    /// Login with email and password.
    ///
    /// The lock check runs after the credential match, so a wrong password
    /// against a locked account still reads as a plain credential failure.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidCredentials` on any mismatch, including a
    /// malformed email or a federated-only account with no password set.
    /// Returns `AuthError::AccountLocked` if the credential matched but the
    /// account is locked.
    #[instrument(skip_all)]
    pub async fn login_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<User, AuthError> {
        // A malformed email can't match anything; don't leak that either.
        let Ok(email) = Email::parse(email) else {
            return Err(AuthError::InvalidCredentials);
        };

        let (user, stored_hash) = self
            .users
            .auth_by_email(&email)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        let hash = stored_hash.ok_or(AuthError::InvalidCredentials)?;
        verify_password(password, &hash)?;

        if user.status == AccountStatus::Locked {
            return Err(AuthError::AccountLocked);
        }

        Ok(user)
    }

    /// Resolve a verified federated identity to a user, creating the account
    /// on first sign-in.
    ///
    /// The caller must have already verified the assertion (see
    /// [`crate::services::google::GoogleVerifier`]); this method trusts its
    /// email. If the account exists and has no avatar, the provider's
    /// picture is backfilled best-effort: a failure there is logged and
    /// swallowed, never surfaced as a login failure.
    ///
    /// Two concurrent first sign-ins for the same address race on the email
    /// unique constraint; the loser re-reads and returns the winner's row.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidEmail` if the asserted email is malformed.
    /// Returns `AuthError::AccountLocked` if the account is locked.
    #[instrument(skip(self, identity), fields(subject = %identity.subject))]
    pub async fn login_with_google(&self, identity: &VerifiedIdentity) -> Result<User, AuthError> {
        let email = Email::parse(&identity.email)?;

        if let Some(user) = self.users.get_by_email(&email).await? {
            return self.existing_federated_user(user, identity).await;
        }

        match self
            .users
            .create_federated(
                &identity.name,
                &email,
                &identity.subject,
                identity.picture.as_deref(),
            )
            .await
        {
            Ok(user) => {
                info!(user_id = %user.id, "Created account from federated sign-in");
                Ok(user)
            }
            Err(RepositoryError::Conflict(_)) => {
                // Lost the first-sign-in race; the row exists now.
                let user = self
                    .users
                    .get_by_email(&email)
                    .await?
                    .ok_or(AuthError::Repository(RepositoryError::NotFound))?;
                self.existing_federated_user(user, identity).await
            }
            Err(other) => Err(AuthError::Repository(other)),
        }
    }

    /// Partially update a user's profile.
    ///
    /// A supplied password replaces the stored credential, hashed here before
    /// it reaches the store.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::WeakPassword` if a new password doesn't meet
    /// requirements.
    /// Returns `AuthError::Repository` with `NotFound` for an unknown user.
    #[instrument(skip(self, changes))]
    pub async fn update_profile(
        &self,
        user_id: UserId,
        changes: &UpdateProfile,
    ) -> Result<(), AuthError> {
        let password_hash = match changes.password.as_deref() {
            Some(password) => {
                validate_password(password)?;
                Some(hash_password(password)?)
            }
            None => None,
        };

        self.users
            .update_profile(
                user_id,
                changes.full_name.as_deref(),
                changes.phone.as_deref(),
                changes.address.as_deref(),
                password_hash.as_deref(),
            )
            .await?;

        Ok(())
    }

    /// Shared tail of the federated path for an account that already exists.
    async fn existing_federated_user(
        &self,
        mut user: User,
        identity: &VerifiedIdentity,
    ) -> Result<User, AuthError> {
        if user.status == AccountStatus::Locked {
            return Err(AuthError::AccountLocked);
        }

        if user.avatar.is_none()
            && let Some(picture) = identity.picture.as_deref()
        {
            match self.users.backfill_avatar(user.id, picture).await {
                Ok(()) => user.avatar = Some(picture.to_owned()),
                Err(e) => warn!(user_id = %user.id, error = %e, "Avatar backfill failed"),
            }
        }

        Ok(user)
    }
}

/// Validate password meets requirements.
fn validate_password(password: &str) -> Result<(), AuthError> {
    if password.len() < MIN_PASSWORD_LENGTH {
        return Err(AuthError::WeakPassword(format!(
            "password must be at least {MIN_PASSWORD_LENGTH} characters"
        )));
    }

    Ok(())
}

/// Hash a password using Argon2id.
///
/// # Errors
///
/// Returns `AuthError::PasswordHash` if hashing fails.
pub fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| AuthError::PasswordHash)
}

/// Verify a password against a hash.
fn verify_password(password: &str, hash: &str) -> Result<(), AuthError> {
    let parsed_hash = PasswordHash::new(hash).map_err(|_| AuthError::InvalidCredentials)?;
    let argon2 = Argon2::default();

    argon2
        .verify_password(password.as_bytes(), &parsed_hash)
        .map_err(|_| AuthError::InvalidCredentials)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_verify_roundtrip() {
        let hash = hash_password("correct horse battery").unwrap();
        assert!(verify_password("correct horse battery", &hash).is_ok());
        assert!(matches!(
            verify_password("wrong password", &hash),
            Err(AuthError::InvalidCredentials)
        ));
    }

    #[test]
    fn test_hash_is_not_plaintext() {
        let hash = hash_password("super-secret-pw").unwrap();
        assert!(!hash.contains("super-secret-pw"));
        assert!(hash.starts_with("$argon2"));
    }

    #[test]
    fn test_short_password_rejected() {
        assert!(matches!(
            validate_password("short"),
            Err(AuthError::WeakPassword(_))
        ));
        assert!(validate_password("long enough").is_ok());
    }

    #[test]
    fn test_garbage_hash_reads_as_credential_failure() {
        assert!(matches!(
            verify_password("anything", "not-a-hash"),
            Err(AuthError::InvalidCredentials)
        ));
    }
}
