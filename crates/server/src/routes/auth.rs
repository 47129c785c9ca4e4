//! Authentication route handlers.
//!
//! Registration, password login, and Google sign-in. The Google handler is
//! the only place the raw ID token exists; it is exchanged for a verified
//! identity before the resolver sees anything.

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use serde::Deserialize;

use crate::error::Result;
use crate::services::auth::AuthService;
use crate::state::AppState;

// =============================================================================
// Payload Types
// =============================================================================

/// Registration payload.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub full_name: String,
    pub email: String,
    pub password: String,
}

/// Login payload.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Google sign-in payload: the raw ID token from the client SDK.
#[derive(Debug, Deserialize)]
pub struct GoogleLoginRequest {
    pub token: String,
}

// =============================================================================
// Handlers
// =============================================================================

/// Register a new account.
pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<impl IntoResponse> {
    let user = AuthService::new(state.pool())
        .register(&req.full_name, &req.email, &req.password)
        .await?;

    Ok((StatusCode::CREATED, Json(user)))
}

/// Login with email and password.
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<impl IntoResponse> {
    let user = AuthService::new(state.pool())
        .login_with_password(&req.email, &req.password)
        .await?;

    Ok(Json(user))
}

/// Login or sign up with a Google ID token.
pub async fn google_login(
    State(state): State<AppState>,
    Json(req): Json<GoogleLoginRequest>,
) -> Result<impl IntoResponse> {
    let identity = state.google().verify(&req.token).await?;
    let user = AuthService::new(state.pool())
        .login_with_google(&identity)
        .await?;

    Ok(Json(user))
}
