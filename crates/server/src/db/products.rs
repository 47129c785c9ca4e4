//! Product repository for database operations.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use tracing::{debug, instrument};

use ovenbird_core::{ProductId, Sku};

use super::RepositoryError;
use crate::models::product::{NewProduct, Product};

/// Internal row type for product queries.
#[derive(Debug, sqlx::FromRow)]
struct ProductRow {
    id: i32,
    name: String,
    category: Option<String>,
    price: Decimal,
    image: Option<String>,
    description: Option<String>,
    sku: String,
    stock_quantity: i32,
    is_active: bool,
    created_at: DateTime<Utc>,
}

impl ProductRow {
    fn into_product(self) -> Result<Product, RepositoryError> {
        let sku = Sku::parse(&self.sku).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid sku in database: {e}"))
        })?;

        Ok(Product {
            id: ProductId::new(self.id),
            name: self.name,
            category: self.category,
            price: self.price,
            image: self.image,
            description: self.description,
            sku,
            stock_quantity: self.stock_quantity,
            is_active: self.is_active,
            created_at: self.created_at,
        })
    }
}

/// Repository for product database operations.
pub struct ProductRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ProductRepository<'a> {
    /// Create a new product repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Create a product, generating a SKU from the clock when none is given.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the SKU already exists.
    /// Returns `RepositoryError::Database` for other database errors.
    #[instrument(skip(self, product), fields(name = %product.name))]
    pub async fn create(&self, product: &NewProduct) -> Result<Product, RepositoryError> {
        let sku = product
            .sku
            .clone()
            .unwrap_or_else(|| Sku::generate(Utc::now()));

        let row: ProductRow = sqlx::query_as(
            r"
            INSERT INTO products (name, category, price, image, description, sku,
                                  stock_quantity, is_active)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING id, name, category, price, image, description, sku,
                      stock_quantity, is_active, created_at
            ",
        )
        .bind(&product.name)
        .bind(&product.category)
        .bind(product.price)
        .bind(&product.image)
        .bind(&product.description)
        .bind(sku.as_str())
        .bind(product.stock_quantity)
        .bind(product.is_active)
        .fetch_one(self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(ref db_err) = e
                && db_err.is_unique_violation()
            {
                return RepositoryError::Conflict("sku already exists".to_owned());
            }
            RepositoryError::Database(e)
        })?;

        debug!(product_id = row.id, "Created product");
        row.into_product()
    }

    /// Get a product by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        let row: Option<ProductRow> = sqlx::query_as(
            r"
            SELECT id, name, category, price, image, description, sku,
                   stock_quantity, is_active, created_at
            FROM products
            WHERE id = $1
            ",
        )
        .bind(id.as_i32())
        .fetch_optional(self.pool)
        .await?;

        row.map(ProductRow::into_product).transpose()
    }
}
