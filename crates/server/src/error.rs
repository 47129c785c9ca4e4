//! Unified error handling with Sentry integration.
//!
//! Every route handler returns `Result<T, AppError>`. The response body is a
//! stable machine-readable code plus a human-readable message; internal
//! detail stays in the logs and Sentry, never in the client body.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

use crate::db::RepositoryError;
use crate::services::auth::AuthError;
use crate::services::google::GoogleAuthError;
use crate::services::orders::OrderError;

/// Application-level error type for the server.
#[derive(Debug, Error)]
pub enum AppError {
    /// Order operation failed.
    #[error("order error: {0}")]
    Order(#[from] OrderError),

    /// Authentication operation failed.
    #[error("auth error: {0}")]
    Auth(#[from] AuthError),

    /// Federated token verification failed.
    #[error("google auth error: {0}")]
    Google(#[from] GoogleAuthError),
}

/// Wire shape of every error response.
#[derive(Debug, Serialize)]
struct ErrorBody {
    code: &'static str,
    message: String,
}

impl AppError {
    /// Status, stable code, and client-safe message for this error.
    fn parts(&self) -> (StatusCode, &'static str, String) {
        match self {
            Self::Order(err) => match err {
                OrderError::Validation(msg) => {
                    (StatusCode::BAD_REQUEST, "validation_failed", msg.clone())
                }
                OrderError::NotFound => (
                    StatusCode::NOT_FOUND,
                    "not_found",
                    "Order not found".to_owned(),
                ),
                OrderError::InvalidTransition { .. } => (
                    StatusCode::CONFLICT,
                    "invalid_transition",
                    err.to_string(),
                ),
                OrderError::Repository(repo) => repository_parts(repo),
            },
            Self::Auth(err) => match err {
                AuthError::InvalidEmail(_) => (
                    StatusCode::BAD_REQUEST,
                    "validation_failed",
                    "Invalid email address".to_owned(),
                ),
                AuthError::WeakPassword(msg) => {
                    (StatusCode::BAD_REQUEST, "validation_failed", msg.clone())
                }
                AuthError::InvalidCredentials => (
                    StatusCode::UNAUTHORIZED,
                    "auth_failed",
                    "Invalid email or password".to_owned(),
                ),
                AuthError::AccountLocked => (
                    StatusCode::FORBIDDEN,
                    "account_locked",
                    "This account is locked".to_owned(),
                ),
                AuthError::EmailTaken => (
                    StatusCode::BAD_REQUEST,
                    "email_taken",
                    "An account with this email already exists".to_owned(),
                ),
                AuthError::PasswordHash => internal_parts(),
                AuthError::Repository(repo) => repository_parts(repo),
            },
            Self::Google(err) => match err {
                GoogleAuthError::Http(_) => internal_parts(),
                _ => (
                    StatusCode::UNAUTHORIZED,
                    "auth_failed",
                    "Google token is invalid".to_owned(),
                ),
            },
        }
    }
}

/// Repository errors reaching the edge: `NotFound` keeps its meaning, the
/// rest are store failures the caller may retry wholesale.
fn repository_parts(err: &RepositoryError) -> (StatusCode, &'static str, String) {
    match err {
        RepositoryError::NotFound => (
            StatusCode::NOT_FOUND,
            "not_found",
            "Not found".to_owned(),
        ),
        _ => internal_parts(),
    }
}

fn internal_parts() -> (StatusCode, &'static str, String) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        "store_unavailable",
        "Internal server error".to_owned(),
    )
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = self.parts();

        // Capture server errors to Sentry
        if status.is_server_error() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        (status, Json(ErrorBody { code, message })).into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    fn status_and_code(err: AppError) -> (StatusCode, &'static str) {
        let (status, code, _) = err.parts();
        (status, code)
    }

    #[test]
    fn test_validation_maps_to_400() {
        assert_eq!(
            status_and_code(AppError::Order(OrderError::Validation("bad".to_owned()))),
            (StatusCode::BAD_REQUEST, "validation_failed")
        );
    }

    #[test]
    fn test_not_found_maps_to_404() {
        assert_eq!(
            status_and_code(AppError::Order(OrderError::NotFound)),
            (StatusCode::NOT_FOUND, "not_found")
        );
    }

    #[test]
    fn test_invalid_transition_maps_to_409() {
        let err = AppError::Order(OrderError::InvalidTransition {
            from: "Cancelled".to_owned(),
            to: "Completed".to_owned(),
        });
        assert_eq!(
            status_and_code(err),
            (StatusCode::CONFLICT, "invalid_transition")
        );
    }

    #[test]
    fn test_credential_failure_is_undifferentiated() {
        let (_, _, message) = AppError::Auth(AuthError::InvalidCredentials).parts();
        assert!(!message.to_lowercase().contains("email not found"));
        assert_eq!(message, "Invalid email or password");
    }

    #[test]
    fn test_locked_maps_to_403() {
        assert_eq!(
            status_and_code(AppError::Auth(AuthError::AccountLocked)),
            (StatusCode::FORBIDDEN, "account_locked")
        );
    }

    #[test]
    fn test_store_failure_hides_detail() {
        let err = AppError::Order(OrderError::Repository(RepositoryError::DataCorruption(
            "users.role held 'superuser'".to_owned(),
        )));
        let (status, code, message) = err.parts();
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(code, "store_unavailable");
        assert!(!message.contains("superuser"));
    }
}
