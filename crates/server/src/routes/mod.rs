//! HTTP route handlers.
//!
//! Handlers are thin: decode the payload, call a service, encode the result.
//! Catalog browsing and admin reporting are served elsewhere; this surface
//! carries only the operations with invariants behind them.

pub mod auth;
pub mod orders;
pub mod users;

use axum::{
    Router,
    routing::{get, post, put},
};

use crate::state::AppState;

/// Build the API router.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/orders", post(orders::create_order))
        .route("/api/orders/user/{user_id}", get(orders::user_orders))
        .route("/api/admin/orders/{id}", get(orders::order_detail))
        .route("/api/admin/orders/{id}/status", put(orders::update_status))
        .route("/api/register", post(auth::register))
        .route("/api/login", post(auth::login))
        .route("/api/auth/google", post(auth::google_login))
        .route("/api/users/{id}", put(users::update_profile))
}
