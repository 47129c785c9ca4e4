//! Seed the database with sample products and demo accounts.
//!
//! Intended for local development and staging, not production. Seeding is
//! additive and not idempotent: re-running it against a seeded database will
//! fail on the demo account's unique email.

use rust_decimal::Decimal;
use secrecy::SecretString;
use sqlx::PgPool;
use tracing::info;

use ovenbird_server::db::{ProductRepository, UserRepository, create_pool};
use ovenbird_server::models::NewProduct;
use ovenbird_server::services::auth::hash_password;

use ovenbird_core::Email;

use super::{CommandError, database_url};

/// Sample catalog: (name, category, price, stock).
const SAMPLE_PRODUCTS: &[(&str, &str, &str, i32)] = &[
    ("Sourdough loaf", "Bread", "6.50", 40),
    ("Baguette", "Bread", "3.00", 60),
    ("Butter croissant", "Pastry", "3.75", 50),
    ("Pain au chocolat", "Pastry", "4.25", 45),
    ("Lemon tart", "Cake", "5.50", 24),
    ("Black forest slice", "Cake", "6.00", 18),
    ("Cold brew", "Drink", "4.00", 100),
];

/// Demo customer credentials.
const DEMO_EMAIL: &str = "demo@ovenbird.dev";
const DEMO_PASSWORD: &str = "demo-password";

/// Seed sample data.
///
/// # Errors
///
/// Returns an error if the database is unreachable or an insert fails.
pub async fn run() -> Result<(), CommandError> {
    dotenvy::dotenv().ok();

    let database_url = SecretString::from(database_url()?);
    let pool = create_pool(&database_url).await?;
    info!("Connected to database");

    seed_products(&pool).await?;
    seed_demo_user(&pool).await?;

    info!("Seeding complete!");
    Ok(())
}

async fn seed_products(pool: &PgPool) -> Result<(), CommandError> {
    let products = ProductRepository::new(pool);

    for (name, category, price, stock) in SAMPLE_PRODUCTS {
        let price: Decimal = price
            .parse()
            .map_err(|_| CommandError::InvalidInput(format!("bad seed price for {name}")))?;

        let product = products
            .create(&NewProduct {
                name: (*name).to_owned(),
                category: Some((*category).to_owned()),
                price,
                image: None,
                description: None,
                sku: None,
                stock_quantity: *stock,
                is_active: true,
            })
            .await?;

        info!(product_id = %product.id, sku = %product.sku, "Seeded product: {name}");
    }

    Ok(())
}

async fn seed_demo_user(pool: &PgPool) -> Result<(), CommandError> {
    let users = UserRepository::new(pool);

    let email = Email::parse(DEMO_EMAIL)
        .map_err(|e| CommandError::InvalidInput(format!("bad demo email: {e}")))?;
    let password_hash = hash_password(DEMO_PASSWORD)?;

    let user = users
        .create_with_password("Demo Customer", &email, &password_hash)
        .await?;

    info!(user_id = %user.id, "Seeded demo customer ({DEMO_EMAIL} / {DEMO_PASSWORD})");
    Ok(())
}
