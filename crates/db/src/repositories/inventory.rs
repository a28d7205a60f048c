//! Inventory repository: the stock ledger.
//!
//! `adjust_quantity` is the only code path that changes `quantity` after an
//! item exists. It runs on whatever connection it is given, so the sales
//! repository can call it inside its own transaction.

use nursery_core::catalog::{ItemInput, is_low_stock};
use nursery_core::ledger::{LedgerError, apply_delta};
use sea_orm::{
    ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
    sea_query::{Expr, OnConflict},
};
use tracing::{debug, info};

use super::ledger_db_err;
use crate::entities::inventory;

/// Inventory repository for catalog and stock operations.
#[derive(Debug, Clone)]
pub struct InventoryRepository {
    db: DatabaseConnection,
}

impl InventoryRepository {
    /// Creates a new inventory repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Inserts the item or overwrites every field of an existing one.
    ///
    /// # Errors
    ///
    /// Returns `LedgerError::Catalog` if the input breaks a catalog rule.
    pub async fn upsert(&self, input: ItemInput) -> Result<inventory::Model, LedgerError> {
        let input = input.validate()?;
        let name = input.item.clone();

        let model = inventory::ActiveModel {
            item: Set(input.item),
            category: Set(input.category.as_str().to_string()),
            item_type: Set(input.item_type),
            quantity: Set(input.quantity),
            cost_price: Set(input.cost_price),
            sell_price: Set(input.sell_price),
            low_stock_limit: Set(input.low_stock_limit),
        };

        inventory::Entity::insert(model)
            .on_conflict(
                OnConflict::column(inventory::Column::Item)
                    .update_columns([
                        inventory::Column::Category,
                        inventory::Column::ItemType,
                        inventory::Column::Quantity,
                        inventory::Column::CostPrice,
                        inventory::Column::SellPrice,
                        inventory::Column::LowStockLimit,
                    ])
                    .to_owned(),
            )
            .exec_without_returning(&self.db)
            .await
            .map_err(ledger_db_err)?;

        info!(item = %name, "inventory item saved");
        self.get(&name).await
    }

    /// Finds an item by name. Surrounding whitespace is ignored, as in upsert.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find(&self, item: &str) -> Result<Option<inventory::Model>, LedgerError> {
        inventory::Entity::find_by_id(item.trim().to_string())
            .one(&self.db)
            .await
            .map_err(ledger_db_err)
    }

    /// Gets an item by name.
    ///
    /// # Errors
    ///
    /// Returns `LedgerError::NotFound` if the item does not exist.
    pub async fn get(&self, item: &str) -> Result<inventory::Model, LedgerError> {
        self.find(item)
            .await?
            .ok_or_else(|| LedgerError::NotFound(item.trim().to_string()))
    }

    /// Lists the whole catalog ordered by item name.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list(&self) -> Result<Vec<inventory::Model>, LedgerError> {
        inventory::Entity::find()
            .order_by_asc(inventory::Column::Item)
            .all(&self.db)
            .await
            .map_err(ledger_db_err)
    }

    /// Items that are in stock but at or below their threshold.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_low_stock(&self) -> Result<Vec<inventory::Model>, LedgerError> {
        let items = inventory::Entity::find()
            .filter(inventory::Column::Quantity.gt(0))
            .order_by_asc(inventory::Column::Quantity)
            .order_by_asc(inventory::Column::Item)
            .all(&self.db)
            .await
            .map_err(ledger_db_err)?;

        Ok(items
            .into_iter()
            .filter(|i| is_low_stock(i.quantity, i.low_stock_limit))
            .collect())
    }

    /// Deletes an item. Recorded transactions keep its name.
    ///
    /// # Errors
    ///
    /// Returns `LedgerError::NotFound` if the item does not exist.
    pub async fn delete(&self, item: &str) -> Result<(), LedgerError> {
        let item = item.trim();
        let result = inventory::Entity::delete_by_id(item.to_string())
            .exec(&self.db)
            .await
            .map_err(ledger_db_err)?;

        if result.rows_affected == 0 {
            return Err(LedgerError::NotFound(item.to_string()));
        }
        info!(item, "inventory item deleted");
        Ok(())
    }

    /// Adds `delta` to an item's quantity and returns the new quantity.
    ///
    /// The update only matches while the result stays non-negative, so two
    /// writers can never both spend the same units.
    ///
    /// # Errors
    ///
    /// - `LedgerError::NotFound` if the item does not exist
    /// - `LedgerError::InsufficientStock` if the quantity would go negative
    pub async fn adjust_quantity<C>(conn: &C, item: &str, delta: i64) -> Result<i64, LedgerError>
    where
        C: ConnectionTrait,
    {
        let current = Self::quantity_on(conn, item).await?;
        apply_delta(item, current, delta)?;

        let mut update = inventory::Entity::update_many()
            .col_expr(
                inventory::Column::Quantity,
                Expr::col(inventory::Column::Quantity).add(delta),
            )
            .filter(inventory::Column::Item.eq(item));
        if delta < 0 {
            update = update.filter(inventory::Column::Quantity.gte(delta.saturating_neg()));
        }
        let result = update.exec(conn).await.map_err(ledger_db_err)?;

        let next = Self::quantity_on(conn, item).await?;
        if result.rows_affected == 0 {
            debug!(item, delta, available = next, "stock adjustment lost a race");
            return Err(LedgerError::InsufficientStock {
                item: item.to_string(),
                requested: delta.saturating_neg(),
                available: next,
            });
        }

        Ok(next)
    }

    async fn quantity_on<C>(conn: &C, item: &str) -> Result<i64, LedgerError>
    where
        C: ConnectionTrait,
    {
        inventory::Entity::find_by_id(item.to_string())
            .one(conn)
            .await
            .map_err(ledger_db_err)?
            .map(|row| row.quantity)
            .ok_or_else(|| LedgerError::NotFound(item.to_string()))
    }
}
