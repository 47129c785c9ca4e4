//! Order service: the order lifecycle engine.
//!
//! Creation validates the cart against the client-supplied total before any
//! store interaction, then writes header and items atomically. Status
//! transitions are plain label writes except the transition into
//! `Completed`, which deducts stock exactly once inside the repository's
//! completion transaction.

mod error;

pub use error::OrderError;

use rust_decimal::Decimal;
use sqlx::PgPool;
use tracing::{info, instrument};

use ovenbird_core::{OrderId, OrderStatus, UserId};

use crate::db::orders::{CompletionOutcome, OrderRepository};
use crate::models::order::{NewOrder, Order, OrderDetail};

/// Allowed drift between the client-supplied total and the item sum.
///
/// One cent: covers client-side rounding of per-line totals, nothing more.
fn rounding_tolerance() -> Decimal {
    Decimal::new(1, 2)
}

/// Order lifecycle service.
pub struct OrderService<'a> {
    orders: OrderRepository<'a>,
}

impl<'a> OrderService<'a> {
    /// Create a new order service.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self {
            orders: OrderRepository::new(pool),
        }
    }

    /// Place an order.
    ///
    /// Inventory is untouched here; stock moves only when the order
    /// completes.
    ///
    /// # Errors
    ///
    /// Returns `OrderError::Validation` for a malformed or inconsistent cart
    /// (nothing is written in that case).
    /// Returns `OrderError::Repository` if the transaction fails; nothing is
    /// visible in that case either, creation is all-or-nothing.
    #[instrument(skip(self, order), fields(items = order.items.len()))]
    pub async fn place_order(&self, order: &NewOrder) -> Result<OrderId, OrderError> {
        validate_order(order)?;

        let order_id = self.orders.create(order).await?;
        info!(%order_id, total = %order.total, "Order placed");
        Ok(order_id)
    }

    /// List a user's orders, newest first.
    ///
    /// # Errors
    ///
    /// Returns `OrderError::Repository` if the query fails.
    pub async fn orders_for_user(&self, user_id: UserId) -> Result<Vec<Order>, OrderError> {
        Ok(self.orders.list_for_user(user_id).await?)
    }

    /// Get an order with its line items.
    ///
    /// # Errors
    ///
    /// Returns `OrderError::NotFound` if the order doesn't exist.
    pub async fn order_detail(&self, order_id: OrderId) -> Result<OrderDetail, OrderError> {
        self.orders
            .get_detail(order_id)
            .await?
            .ok_or(OrderError::NotFound)
    }

    /// Transition an order to a new status.
    ///
    /// Transitions into `Completed` deduct stock exactly once: repeating the
    /// call on an already-completed order succeeds without touching
    /// inventory, and completing a cancelled order is refused. Every other
    /// target status is a plain label write.
    ///
    /// # Errors
    ///
    /// Returns `OrderError::NotFound` for an unknown order.
    /// Returns `OrderError::InvalidTransition` when completing a cancelled
    /// order.
    /// Returns `OrderError::Repository` if the transaction fails.
    #[instrument(skip(self), fields(status = %status))]
    pub async fn transition_status(
        &self,
        order_id: OrderId,
        status: &OrderStatus,
    ) -> Result<(), OrderError> {
        if status.is_completed() {
            return match self.orders.complete(order_id).await? {
                CompletionOutcome::Applied => {
                    info!(%order_id, "Order completed, stock deducted");
                    Ok(())
                }
                CompletionOutcome::AlreadyCompleted => Ok(()),
                CompletionOutcome::Rejected => Err(OrderError::InvalidTransition {
                    from: OrderStatus::Cancelled.to_string(),
                    to: OrderStatus::Completed.to_string(),
                }),
                CompletionOutcome::NotFound => Err(OrderError::NotFound),
            };
        }

        if self.orders.set_status(order_id, status).await? {
            Ok(())
        } else {
            Err(OrderError::NotFound)
        }
    }
}

/// Validate an order before it touches the store.
fn validate_order(order: &NewOrder) -> Result<(), OrderError> {
    for (value, field) in [
        (&order.customer.name, "name"),
        (&order.customer.phone, "phone"),
        (&order.customer.address, "address"),
    ] {
        if value.trim().is_empty() {
            return Err(OrderError::Validation(format!(
                "customer {field} is required"
            )));
        }
    }

    if order.items.is_empty() {
        return Err(OrderError::Validation("cart is empty".to_owned()));
    }

    for item in &order.items {
        if item.quantity <= 0 {
            return Err(OrderError::Validation(format!(
                "quantity for '{}' must be positive",
                item.name
            )));
        }
        if item.price < Decimal::ZERO {
            return Err(OrderError::Validation(format!(
                "price for '{}' cannot be negative",
                item.name
            )));
        }
    }

    let item_sum: Decimal = order
        .items
        .iter()
        .map(|item| item.price * Decimal::from(item.quantity))
        .sum();

    if (order.total - item_sum).abs() > rounding_tolerance() {
        return Err(OrderError::Validation(format!(
            "total {} does not match item sum {item_sum}",
            order.total
        )));
    }

    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::models::order::{CartItem, CustomerInfo, NewOrder};
    use ovenbird_core::ProductId;

    fn cart_item(price: &str, quantity: i32) -> CartItem {
        CartItem {
            product_id: ProductId::new(1),
            name: "Sourdough loaf".to_owned(),
            price: price.parse().unwrap(),
            quantity,
        }
    }

    fn valid_order() -> NewOrder {
        NewOrder {
            customer: CustomerInfo {
                name: "An Nguyen".to_owned(),
                phone: "0901234567".to_owned(),
                address: "12 Ly Thuong Kiet".to_owned(),
            },
            items: vec![cart_item("10.00", 2)],
            total: "20.00".parse().unwrap(),
            user_id: None,
        }
    }

    #[test]
    fn test_valid_order_passes() {
        assert!(validate_order(&valid_order()).is_ok());
    }

    #[test]
    fn test_blank_customer_fields_rejected() {
        for field in ["name", "phone", "address"] {
            let mut order = valid_order();
            match field {
                "name" => order.customer.name = "   ".to_owned(),
                "phone" => order.customer.phone = String::new(),
                _ => order.customer.address = "\t".to_owned(),
            }
            let err = validate_order(&order).unwrap_err();
            assert!(matches!(err, OrderError::Validation(msg) if msg.contains(field)));
        }
    }

    #[test]
    fn test_empty_cart_rejected() {
        let mut order = valid_order();
        order.items.clear();
        assert!(matches!(
            validate_order(&order),
            Err(OrderError::Validation(msg)) if msg.contains("empty")
        ));
    }

    #[test]
    fn test_non_positive_quantity_rejected() {
        for quantity in [0, -1] {
            let mut order = valid_order();
            order.items = vec![cart_item("10.00", quantity)];
            order.total = "0.00".parse().unwrap();
            assert!(matches!(
                validate_order(&order),
                Err(OrderError::Validation(msg)) if msg.contains("quantity")
            ));
        }
    }

    #[test]
    fn test_negative_price_rejected() {
        let mut order = valid_order();
        order.items = vec![cart_item("-1.00", 1)];
        order.total = "-1.00".parse().unwrap();
        assert!(matches!(
            validate_order(&order),
            Err(OrderError::Validation(msg)) if msg.contains("price")
        ));
    }

    #[test]
    fn test_mismatched_total_rejected() {
        let mut order = valid_order();
        order.total = "15.00".parse().unwrap();
        assert!(matches!(
            validate_order(&order),
            Err(OrderError::Validation(msg)) if msg.contains("does not match")
        ));
    }

    #[test]
    fn test_total_within_tolerance_passes() {
        // Client rounded each line; one cent of drift is accepted.
        let mut order = valid_order();
        order.total = "20.01".parse().unwrap();
        assert!(validate_order(&order).is_ok());

        order.total = "19.99".parse().unwrap();
        assert!(validate_order(&order).is_ok());
    }

    #[test]
    fn test_total_just_past_tolerance_rejected() {
        let mut order = valid_order();
        order.total = "20.02".parse().unwrap();
        assert!(validate_order(&order).is_err());
    }

    #[test]
    fn test_multi_line_sum() {
        let mut order = valid_order();
        order.items = vec![cart_item("10.00", 2), cart_item("3.50", 3)];
        order.total = "30.50".parse().unwrap();
        assert!(validate_order(&order).is_ok());
    }
}
