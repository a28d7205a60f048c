//! Shared setup for the repository integration tests.
//!
//! Every test gets its own in-memory SQLite database. The pool is held at
//! one connection because each SQLite memory connection is a separate
//! database.

#![allow(dead_code)]

use nursery_core::catalog::{Category, ItemInput};
use nursery_db::InventoryRepository;
use nursery_db::migration::Migrator;
use rust_decimal::Decimal;
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use sea_orm_migration::MigratorTrait;

/// Fresh migrated database.
pub async fn setup() -> DatabaseConnection {
    let mut options = ConnectOptions::new("sqlite::memory:");
    options
        .max_connections(1)
        .min_connections(1)
        .sqlx_logging(false);

    let db = Database::connect(options)
        .await
        .expect("Failed to open in-memory database");
    Migrator::up(&db, None).await.expect("Failed to run migrations");
    db
}

/// Plant input with the given stock and prices.
pub fn plant(name: &str, quantity: i64, cost: Decimal, sell: Decimal) -> ItemInput {
    ItemInput {
        item: name.to_string(),
        category: Category::Plants,
        item_type: "Flower".to_string(),
        quantity,
        cost_price: cost,
        sell_price: sell,
        low_stock_limit: 10,
    }
}

/// Inserts a plant and returns the repository used.
pub async fn stock(
    db: &DatabaseConnection,
    name: &str,
    quantity: i64,
    cost: Decimal,
    sell: Decimal,
) -> InventoryRepository {
    let repo = InventoryRepository::new(db.clone());
    repo.upsert(plant(name, quantity, cost, sell))
        .await
        .expect("Failed to stock item");
    repo
}
