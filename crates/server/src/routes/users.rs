//! User profile route handlers.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Deserialize;

use ovenbird_core::UserId;

use crate::error::Result;
use crate::models::user::UpdateProfile;
use crate::services::auth::AuthService;
use crate::state::AppState;

/// Profile update payload. Absent fields are left unchanged.
#[derive(Debug, Deserialize, Default)]
pub struct UpdateProfileRequest {
    pub full_name: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub password: Option<String>,
}

/// Update a user's profile.
///
/// A supplied password replaces the stored credential (hashed server-side).
pub async fn update_profile(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(req): Json<UpdateProfileRequest>,
) -> Result<impl IntoResponse> {
    let changes = UpdateProfile {
        full_name: req.full_name,
        phone: req.phone,
        address: req.address,
        password: req.password,
    };

    AuthService::new(state.pool())
        .update_profile(UserId::new(id), &changes)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}
