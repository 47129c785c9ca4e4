//! Order repository: creation, reads, and the completion transaction.
//!
//! Completion is the one write in the system where several rows must move
//! together: the order's status and every affected product's stock become
//! visible atomically or not at all. The queries here use the runtime sqlx
//! API so the crate builds without a live database.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use tracing::{debug, instrument};

use ovenbird_core::{OrderId, OrderItemId, OrderStatus, ProductId, UserId};

use super::RepositoryError;
use crate::models::order::{
    CompletionAction, NewOrder, Order, OrderDetail, OrderItem, completion_action,
};

// =============================================================================
// Internal Row Types
// =============================================================================

/// Internal row type for order header queries.
#[derive(Debug, sqlx::FromRow)]
struct OrderRow {
    id: i32,
    user_id: Option<i32>,
    customer_name: String,
    customer_phone: String,
    customer_address: String,
    total_price: Decimal,
    status: String,
    created_at: DateTime<Utc>,
}

impl From<OrderRow> for Order {
    fn from(row: OrderRow) -> Self {
        Self {
            id: OrderId::new(row.id),
            user_id: row.user_id.map(UserId::new),
            customer_name: row.customer_name,
            customer_phone: row.customer_phone,
            customer_address: row.customer_address,
            total_price: row.total_price,
            status: OrderStatus::from(row.status),
            created_at: row.created_at,
        }
    }
}

/// Internal row type for line items joined against the live catalog.
#[derive(Debug, sqlx::FromRow)]
struct OrderItemRow {
    id: i32,
    order_id: i32,
    product_id: Option<i32>,
    product_name: String,
    quantity: i32,
    price: Decimal,
    image: Option<String>,
    sku: Option<String>,
}

impl From<OrderItemRow> for OrderItem {
    fn from(row: OrderItemRow) -> Self {
        Self {
            id: OrderItemId::new(row.id),
            order_id: OrderId::new(row.order_id),
            product_id: row.product_id.map(ProductId::new),
            product_name: row.product_name,
            quantity: row.quantity,
            price: row.price,
            image: row.image,
            sku: row.sku,
        }
    }
}

/// Outcome of a completion attempt, decided under the order row lock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompletionOutcome {
    /// Stock was deducted and the status flipped in this call.
    Applied,
    /// The order was already completed; nothing changed.
    AlreadyCompleted,
    /// The order is cancelled; completing it is refused.
    Rejected,
    /// No such order.
    NotFound,
}

// =============================================================================
// Repository
// =============================================================================

/// Repository for order database operations.
pub struct OrderRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> OrderRepository<'a> {
    /// Create a new order repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Create an order with all of its line items in one transaction.
    ///
    /// Either the header and every item are committed together, or nothing
    /// is. Stock is not touched here; deduction happens at completion.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the transaction fails.
    #[instrument(skip(self, order), fields(items = order.items.len()))]
    pub async fn create(&self, order: &NewOrder) -> Result<OrderId, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let order_id: i32 = sqlx::query_scalar(
            r"
            INSERT INTO orders (user_id, customer_name, customer_phone, customer_address, total_price)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id
            ",
        )
        .bind(order.user_id.map(|id| id.as_i32()))
        .bind(&order.customer.name)
        .bind(&order.customer.phone)
        .bind(&order.customer.address)
        .bind(order.total)
        .fetch_one(&mut *tx)
        .await?;

        let mut qb = sqlx::QueryBuilder::<sqlx::Postgres>::new(
            "INSERT INTO order_items (order_id, product_id, product_name, quantity, price) ",
        );
        qb.push_values(&order.items, |mut b, item| {
            b.push_bind(order_id)
                .push_bind(item.product_id.as_i32())
                .push_bind(&item.name)
                .push_bind(item.quantity)
                .push_bind(item.price);
        });
        qb.build().execute(&mut *tx).await?;

        tx.commit().await?;

        debug!(order_id, "Created order");
        Ok(OrderId::new(order_id))
    }

    /// List a user's orders, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_for_user(&self, user_id: UserId) -> Result<Vec<Order>, RepositoryError> {
        let rows: Vec<OrderRow> = sqlx::query_as(
            r"
            SELECT id, user_id, customer_name, customer_phone, customer_address,
                   total_price, status, created_at
            FROM orders
            WHERE user_id = $1
            ORDER BY created_at DESC
            ",
        )
        .bind(user_id.as_i32())
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Get an order with its line items.
    ///
    /// Display fields (image, sku) are resolved from the catalog where the
    /// product still exists; items keep their frozen name and price either
    /// way.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn get_detail(
        &self,
        order_id: OrderId,
    ) -> Result<Option<OrderDetail>, RepositoryError> {
        let row: Option<OrderRow> = sqlx::query_as(
            r"
            SELECT id, user_id, customer_name, customer_phone, customer_address,
                   total_price, status, created_at
            FROM orders
            WHERE id = $1
            ",
        )
        .bind(order_id.as_i32())
        .fetch_optional(self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let items: Vec<OrderItemRow> = sqlx::query_as(
            r"
            SELECT oi.id, oi.order_id, oi.product_id, oi.product_name,
                   oi.quantity, oi.price, p.image, p.sku
            FROM order_items oi
            LEFT JOIN products p ON p.id = oi.product_id
            WHERE oi.order_id = $1
            ORDER BY oi.id ASC
            ",
        )
        .bind(order_id.as_i32())
        .fetch_all(self.pool)
        .await?;

        Ok(Some(OrderDetail {
            order: row.into(),
            items: items.into_iter().map(Into::into).collect(),
        }))
    }

    /// Write a status label without side effects.
    ///
    /// Used for every transition that is not into `Completed`.
    ///
    /// # Returns
    ///
    /// Returns `true` if the order existed.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn set_status(
        &self,
        order_id: OrderId,
        status: &OrderStatus,
    ) -> Result<bool, RepositoryError> {
        let result = sqlx::query("UPDATE orders SET status = $1 WHERE id = $2")
            .bind(status.as_str())
            .bind(order_id.as_i32())
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Complete an order: deduct stock for every line item and flip the
    /// status, all in one transaction.
    ///
    /// The order row is locked first, so of N concurrent completions exactly
    /// one observes a deductible status; the rest see `AlreadyCompleted` and
    /// touch nothing. Each product decrement is a single clamped UPDATE: the
    /// statement takes the product row lock and computes
    /// `GREATEST(0, stock_quantity - qty)` under it, so no concurrent
    /// decrement is lost and stock never goes negative.
    ///
    /// Stock is not reserved at creation time; an order can complete against
    /// less stock than it sold, in which case the decrement clamps at zero.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the transaction fails; the
    /// status write and every decrement roll back together.
    #[instrument(skip(self))]
    pub async fn complete(&self, order_id: OrderId) -> Result<CompletionOutcome, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let current: Option<String> =
            sqlx::query_scalar("SELECT status FROM orders WHERE id = $1 FOR UPDATE")
                .bind(order_id.as_i32())
                .fetch_optional(&mut *tx)
                .await?;

        let Some(current) = current else {
            return Ok(CompletionOutcome::NotFound);
        };

        match completion_action(&OrderStatus::from(current)) {
            CompletionAction::AlreadyDone => return Ok(CompletionOutcome::AlreadyCompleted),
            CompletionAction::Rejected => return Ok(CompletionOutcome::Rejected),
            CompletionAction::Deduct => {}
        }

        // Stable product order keeps concurrent completions from deadlocking
        // on each other's row locks.
        let items: Vec<(Option<i32>, i32)> = sqlx::query_as(
            r"
            SELECT product_id, quantity
            FROM order_items
            WHERE order_id = $1
            ORDER BY product_id ASC
            ",
        )
        .bind(order_id.as_i32())
        .fetch_all(&mut *tx)
        .await?;

        for (product_id, quantity) in items {
            // Soft reference: the product may have been removed from the
            // catalog since the order was placed.
            let Some(product_id) = product_id else {
                continue;
            };

            sqlx::query(
                r"
                UPDATE products
                SET stock_quantity = GREATEST(0, stock_quantity - $1)
                WHERE id = $2
                ",
            )
            .bind(quantity)
            .bind(product_id)
            .execute(&mut *tx)
            .await?;
        }

        sqlx::query("UPDATE orders SET status = $1 WHERE id = $2")
            .bind(OrderStatus::Completed.as_str())
            .bind(order_id.as_i32())
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        debug!(order_id = order_id.as_i32(), "Completed order");
        Ok(CompletionOutcome::Applied)
    }
}
