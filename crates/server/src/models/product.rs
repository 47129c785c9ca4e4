//! Product domain types.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use ovenbird_core::{ProductId, Sku};

/// A catalog product.
#[derive(Debug, Clone, Serialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub category: Option<String>,
    pub price: Decimal,
    pub image: Option<String>,
    pub description: Option<String>,
    pub sku: Sku,
    /// On-hand stock. Never negative; decremented only when an order
    /// completes.
    pub stock_quantity: i32,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

/// Input for creating a product (seeding and back office).
#[derive(Debug, Clone)]
pub struct NewProduct {
    pub name: String,
    pub category: Option<String>,
    pub price: Decimal,
    pub image: Option<String>,
    pub description: Option<String>,
    /// Generated from the creation timestamp when absent.
    pub sku: Option<Sku>,
    pub stock_quantity: i32,
    pub is_active: bool,
}
