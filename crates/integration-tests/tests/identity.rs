//! Integration tests for the identity resolver.
//!
//! Password and federated sign-in against a live database, including the
//! concurrent first-sign-in race and the locked-account policy.
//!
//! Requires a running `PostgreSQL` database (see `order_lifecycle.rs`).

use uuid::Uuid;

use ovenbird_core::{AccountStatus, UserRole};
use ovenbird_integration_tests::{set_account_status, test_pool, unique_email};
use ovenbird_server::models::UpdateProfile;
use ovenbird_server::services::AuthService;
use ovenbird_server::services::auth::AuthError;
use ovenbird_server::services::google::VerifiedIdentity;

fn identity_for(email: &str) -> VerifiedIdentity {
    VerifiedIdentity {
        email: email.to_owned(),
        name: "Googled Customer".to_owned(),
        picture: Some("https://lh3.example.com/photo.jpg".to_owned()),
        subject: format!("sub-{}", Uuid::new_v4().simple()),
    }
}

#[tokio::test]
#[ignore = "Requires a running PostgreSQL database (set DATABASE_URL)"]
async fn test_register_then_login() {
    let pool = test_pool().await;
    let service = AuthService::new(&pool);
    let email = unique_email("register");

    let registered = service
        .register("Pat Baker", &email, "a-decent-password")
        .await
        .expect("registration succeeds");
    assert_eq!(registered.role, UserRole::Customer);
    assert_eq!(registered.status, AccountStatus::Active);

    let logged_in = service
        .login_with_password(&email, "a-decent-password")
        .await
        .expect("login succeeds");
    assert_eq!(logged_in.id, registered.id);
}

#[tokio::test]
#[ignore = "Requires a running PostgreSQL database (set DATABASE_URL)"]
async fn test_credential_failures_are_undifferentiated() {
    let pool = test_pool().await;
    let service = AuthService::new(&pool);
    let email = unique_email("creds");

    service
        .register("Pat Baker", &email, "a-decent-password")
        .await
        .expect("registration succeeds");

    // Wrong password and unknown email fail identically.
    let wrong_password = service
        .login_with_password(&email, "not-the-password")
        .await
        .expect_err("wrong password rejected");
    let unknown_email = service
        .login_with_password(&unique_email("nobody"), "a-decent-password")
        .await
        .expect_err("unknown email rejected");

    assert!(matches!(wrong_password, AuthError::InvalidCredentials));
    assert!(matches!(unknown_email, AuthError::InvalidCredentials));
}

#[tokio::test]
#[ignore = "Requires a running PostgreSQL database (set DATABASE_URL)"]
async fn test_duplicate_registration_rejected() {
    let pool = test_pool().await;
    let service = AuthService::new(&pool);
    let email = unique_email("dup");

    service
        .register("Pat Baker", &email, "a-decent-password")
        .await
        .expect("first registration succeeds");

    let err = service
        .register("Other Pat", &email, "another-password")
        .await
        .expect_err("second registration rejected");
    assert!(matches!(err, AuthError::EmailTaken));
}

#[tokio::test]
#[ignore = "Requires a running PostgreSQL database (set DATABASE_URL)"]
async fn test_locked_account_fails_every_path() {
    let pool = test_pool().await;
    let service = AuthService::new(&pool);
    let email = unique_email("locked");

    service
        .register("Pat Baker", &email, "a-decent-password")
        .await
        .expect("registration succeeds");
    set_account_status(&pool, &email, "locked").await;

    // Correct password, locked account.
    let password_err = service
        .login_with_password(&email, "a-decent-password")
        .await
        .expect_err("locked account rejected");
    assert!(matches!(password_err, AuthError::AccountLocked));

    // Verified federated assertion for the same address, still locked.
    let federated_err = service
        .login_with_google(&identity_for(&email))
        .await
        .expect_err("locked account rejected on federated path");
    assert!(matches!(federated_err, AuthError::AccountLocked));
}

#[tokio::test]
#[ignore = "Requires a running PostgreSQL database (set DATABASE_URL)"]
async fn test_federated_first_sign_in_creates_account() {
    let pool = test_pool().await;
    let service = AuthService::new(&pool);
    let email = unique_email("federated");
    let identity = identity_for(&email);

    let user = service
        .login_with_google(&identity)
        .await
        .expect("first sign-in creates the account");

    assert_eq!(user.email.as_str(), email);
    assert_eq!(user.role, UserRole::Customer);
    assert_eq!(user.status, AccountStatus::Active);
    assert_eq!(user.google_id.as_deref(), Some(identity.subject.as_str()));
    assert_eq!(user.avatar, identity.picture);

    // Federated-only accounts carry no credential.
    let stored: Option<String> = sqlx::query_scalar("SELECT password FROM users WHERE email = $1")
        .bind(&email)
        .fetch_one(&pool)
        .await
        .expect("read stored credential");
    assert!(stored.is_none());
}

#[tokio::test]
#[ignore = "Requires a running PostgreSQL database (set DATABASE_URL)"]
async fn test_concurrent_federated_sign_ins_create_one_row() {
    let pool = test_pool().await;
    let email = unique_email("race");

    let mut tasks = Vec::new();
    for _ in 0..5 {
        let pool = pool.clone();
        let identity = identity_for(&email);
        tasks.push(tokio::spawn(async move {
            AuthService::new(&pool).login_with_google(&identity).await
        }));
    }

    for task in tasks {
        let user = task
            .await
            .expect("task must not panic")
            .expect("every racer resolves to a user");
        assert_eq!(user.email.as_str(), email);
    }

    let rows: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE email = $1")
        .bind(&email)
        .fetch_one(&pool)
        .await
        .expect("count query");
    assert_eq!(rows, 1);
}

#[tokio::test]
#[ignore = "Requires a running PostgreSQL database (set DATABASE_URL)"]
async fn test_federated_login_backfills_missing_avatar() {
    let pool = test_pool().await;
    let service = AuthService::new(&pool);
    let email = unique_email("avatar");

    // Password-registered account has no avatar.
    service
        .register("Pat Baker", &email, "a-decent-password")
        .await
        .expect("registration succeeds");

    let user = service
        .login_with_google(&identity_for(&email))
        .await
        .expect("federated login succeeds");
    assert_eq!(
        user.avatar.as_deref(),
        Some("https://lh3.example.com/photo.jpg")
    );

    let stored: Option<String> = sqlx::query_scalar("SELECT avatar FROM users WHERE email = $1")
        .bind(&email)
        .fetch_one(&pool)
        .await
        .expect("read avatar");
    assert_eq!(stored.as_deref(), Some("https://lh3.example.com/photo.jpg"));
}

#[tokio::test]
#[ignore = "Requires a running PostgreSQL database (set DATABASE_URL)"]
async fn test_profile_update_replaces_credential_hashed() {
    let pool = test_pool().await;
    let service = AuthService::new(&pool);
    let email = unique_email("profile");

    let user = service
        .register("Pat Baker", &email, "first-password")
        .await
        .expect("registration succeeds");

    service
        .update_profile(
            user.id,
            &UpdateProfile {
                phone: Some("0911222333".to_owned()),
                password: Some("second-password".to_owned()),
                ..UpdateProfile::default()
            },
        )
        .await
        .expect("profile update succeeds");

    // Old credential is gone, new one works.
    assert!(matches!(
        service.login_with_password(&email, "first-password").await,
        Err(AuthError::InvalidCredentials)
    ));
    let updated = service
        .login_with_password(&email, "second-password")
        .await
        .expect("new password works");
    assert_eq!(updated.phone.as_deref(), Some("0911222333"));

    // Stored credential is a hash, never the plaintext echo.
    let stored: Option<String> = sqlx::query_scalar("SELECT password FROM users WHERE email = $1")
        .bind(&email)
        .fetch_one(&pool)
        .await
        .expect("read stored credential");
    let stored = stored.expect("credential present");
    assert!(stored.starts_with("$argon2"));
    assert!(!stored.contains("second-password"));
}
