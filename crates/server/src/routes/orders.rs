//! Order route handlers.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use ovenbird_core::{OrderId, OrderStatus, ProductId, UserId};

use crate::error::Result;
use crate::models::order::{CartItem, CustomerInfo, NewOrder};
use crate::services::orders::OrderService;
use crate::state::AppState;

// =============================================================================
// Payload Types
// =============================================================================

/// Checkout payload.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderRequest {
    pub customer_info: CustomerInfoPayload,
    pub cart_items: Vec<CartItemPayload>,
    pub total: Decimal,
    #[serde(default)]
    pub user_id: Option<UserId>,
}

/// Customer snapshot as submitted at checkout.
#[derive(Debug, Deserialize)]
pub struct CustomerInfoPayload {
    pub name: String,
    pub phone: String,
    pub address: String,
}

/// One cart entry as submitted at checkout.
#[derive(Debug, Deserialize)]
pub struct CartItemPayload {
    #[serde(alias = "productId")]
    pub id: ProductId,
    pub name: String,
    pub price: Decimal,
    pub quantity: i32,
}

/// Response for a placed order.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderResponse {
    pub order_id: OrderId,
}

/// Status update payload.
#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: OrderStatus,
}

// =============================================================================
// Handlers
// =============================================================================

/// Place an order.
///
/// # Errors
///
/// Returns `validation_failed` for a malformed cart; nothing is written in
/// that case.
pub async fn create_order(
    State(state): State<AppState>,
    Json(req): Json<CreateOrderRequest>,
) -> Result<impl IntoResponse> {
    let order = NewOrder {
        customer: CustomerInfo {
            name: req.customer_info.name,
            phone: req.customer_info.phone,
            address: req.customer_info.address,
        },
        items: req
            .cart_items
            .into_iter()
            .map(|item| CartItem {
                product_id: item.id,
                name: item.name,
                price: item.price,
                quantity: item.quantity,
            })
            .collect(),
        total: req.total,
        user_id: req.user_id,
    };

    let order_id = OrderService::new(state.pool()).place_order(&order).await?;

    Ok((StatusCode::CREATED, Json(CreateOrderResponse { order_id })))
}

/// List a user's order history, newest first.
pub async fn user_orders(
    State(state): State<AppState>,
    Path(user_id): Path<i32>,
) -> Result<impl IntoResponse> {
    let orders = OrderService::new(state.pool())
        .orders_for_user(UserId::new(user_id))
        .await?;

    Ok(Json(orders))
}

/// Get one order with its line items.
pub async fn order_detail(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse> {
    let detail = OrderService::new(state.pool())
        .order_detail(OrderId::new(id))
        .await?;

    Ok(Json(detail))
}

/// Transition an order's status.
///
/// Completing an order deducts stock exactly once; repeating the call is a
/// successful no-op.
pub async fn update_status(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(req): Json<UpdateStatusRequest>,
) -> Result<impl IntoResponse> {
    OrderService::new(state.pool())
        .transition_status(OrderId::new(id), &req.status)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}
