//! Order domain types.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use ovenbird_core::{OrderId, OrderItemId, OrderStatus, ProductId, UserId};

/// An order header.
#[derive(Debug, Clone, Serialize)]
pub struct Order {
    /// Unique order ID.
    pub id: OrderId,
    /// Owning user, if the order was placed while signed in (guest checkout
    /// leaves this empty).
    pub user_id: Option<UserId>,
    /// Customer name as entered at checkout.
    pub customer_name: String,
    /// Contact phone as entered at checkout.
    pub customer_phone: String,
    /// Delivery address as entered at checkout.
    pub customer_address: String,
    /// Sum of line totals, fixed at creation.
    pub total_price: Decimal,
    /// Current lifecycle status.
    pub status: OrderStatus,
    /// When the order was placed.
    pub created_at: DateTime<Utc>,
}

/// A line item belonging to one order.
///
/// Name and price are frozen at purchase time; `product_id` is a soft
/// reference that may point at a since-deleted product.
#[derive(Debug, Clone, Serialize)]
pub struct OrderItem {
    pub id: OrderItemId,
    pub order_id: OrderId,
    pub product_id: Option<ProductId>,
    pub product_name: String,
    pub quantity: i32,
    pub price: Decimal,
    /// Product image, resolved at read time if the product still exists.
    pub image: Option<String>,
    /// Product SKU, resolved at read time if the product still exists.
    pub sku: Option<String>,
}

/// An order together with its line items.
#[derive(Debug, Clone, Serialize)]
pub struct OrderDetail {
    #[serde(flatten)]
    pub order: Order,
    pub items: Vec<OrderItem>,
}

/// Customer snapshot captured at checkout.
#[derive(Debug, Clone)]
pub struct CustomerInfo {
    pub name: String,
    pub phone: String,
    pub address: String,
}

/// One cart entry as submitted by the client.
#[derive(Debug, Clone)]
pub struct CartItem {
    pub product_id: ProductId,
    pub name: String,
    pub price: Decimal,
    pub quantity: i32,
}

/// Input for placing an order.
#[derive(Debug, Clone)]
pub struct NewOrder {
    pub customer: CustomerInfo,
    pub items: Vec<CartItem>,
    /// Client-computed total; must agree with the item sum.
    pub total: Decimal,
    pub user_id: Option<UserId>,
}

/// What completing an order requires, given its current status.
///
/// Derived under the order row lock so two concurrent completions can't both
/// observe a deductible state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompletionAction {
    /// Deduct stock for every line item and flip the status.
    Deduct,
    /// Already completed; stock was deducted by an earlier call.
    AlreadyDone,
    /// The business voided this order; completing it would deduct stock for
    /// nothing. Rejected.
    Rejected,
}

/// Classify a transition into `Completed` from the given current status.
#[must_use]
pub fn completion_action(current: &OrderStatus) -> CompletionAction {
    match current {
        OrderStatus::Completed => CompletionAction::AlreadyDone,
        OrderStatus::Cancelled => CompletionAction::Rejected,
        _ => CompletionAction::Deduct,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_completion_from_pending_deducts() {
        assert_eq!(
            completion_action(&OrderStatus::Pending),
            CompletionAction::Deduct
        );
    }

    #[test]
    fn test_completion_from_custom_label_deducts() {
        let status = OrderStatus::from("Awaiting pickup");
        assert_eq!(completion_action(&status), CompletionAction::Deduct);
    }

    #[test]
    fn test_completion_is_idempotent() {
        assert_eq!(
            completion_action(&OrderStatus::Completed),
            CompletionAction::AlreadyDone
        );
    }

    #[test]
    fn test_completion_of_cancelled_rejected() {
        assert_eq!(
            completion_action(&OrderStatus::Cancelled),
            CompletionAction::Rejected
        );
    }
}
