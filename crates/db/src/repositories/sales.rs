//! Sales repository: records sales and returns against the stock ledger.
//!
//! The stock change and the log row are written in one database
//! transaction. Either both land or neither does.

use chrono::{SubsecRound, Utc};
use nursery_core::ledger::{
    ItemSnapshot, LedgerError, StockMovement, TransactionAction, plan_return, plan_sale,
    validate_quantity,
};
use nursery_core::reports::LedgerRecord;
use sea_orm::{
    ActiveModelTrait, DatabaseConnection, DatabaseTransaction, EntityTrait, NotSet, QuerySelect,
    Set, TransactionTrait,
};
use serde::Serialize;
use tracing::{info, warn};

use super::{InventoryRepository, ledger_db_err};
use crate::entities::{inventory, transactions};

/// Outcome of a recorded sale or return.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecordedMovement {
    /// The log row that was written.
    pub transaction: LedgerRecord,
    /// Item quantity after the movement.
    pub new_quantity: i64,
}

/// Sales repository for the transaction log.
#[derive(Debug, Clone)]
pub struct SalesRepository {
    db: DatabaseConnection,
}

impl SalesRepository {
    /// Creates a new sales repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Sells `qty` units of `item` on behalf of `username`.
    ///
    /// # Errors
    ///
    /// - `LedgerError::Validation` if `qty <= 0`
    /// - `LedgerError::NotFound` if the item does not exist
    /// - `LedgerError::PriceNotSet` if the item has no selling price
    /// - `LedgerError::InsufficientStock` if `qty` exceeds the stock on hand
    pub async fn record_sale(
        &self,
        item: &str,
        qty: i64,
        username: &str,
    ) -> Result<RecordedMovement, LedgerError> {
        self.record(item, qty, username, TransactionAction::Sale).await
    }

    /// Takes back `qty` units of `item` on behalf of `username`.
    ///
    /// Returns are not checked against earlier sales.
    ///
    /// # Errors
    ///
    /// - `LedgerError::Validation` if `qty <= 0`
    /// - `LedgerError::NotFound` if the item does not exist
    pub async fn record_return(
        &self,
        item: &str,
        qty: i64,
        username: &str,
    ) -> Result<RecordedMovement, LedgerError> {
        self.record(item, qty, username, TransactionAction::Return).await
    }

    /// Loads one log row by id.
    ///
    /// # Errors
    ///
    /// Returns `LedgerError::TransactionNotFound` if no row has this id.
    pub async fn find_by_id(&self, id: i64) -> Result<LedgerRecord, LedgerError> {
        transactions::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(ledger_db_err)?
            .ok_or(LedgerError::TransactionNotFound(id))?
            .try_into()
    }

    async fn record(
        &self,
        item: &str,
        qty: i64,
        username: &str,
        action: TransactionAction,
    ) -> Result<RecordedMovement, LedgerError> {
        validate_quantity(qty)?;
        let item = item.trim();

        let txn = self.db.begin().await.map_err(ledger_db_err)?;

        let row = inventory::Entity::find_by_id(item.to_string())
            .lock_exclusive()
            .one(&txn)
            .await
            .map_err(ledger_db_err)?
            .ok_or_else(|| LedgerError::NotFound(item.to_string()))?;

        let snapshot = ItemSnapshot {
            item: row.item,
            quantity: row.quantity,
            cost_price: row.cost_price,
            sell_price: row.sell_price,
        };
        let movement = match action {
            TransactionAction::Sale => plan_sale(&snapshot, qty),
            TransactionAction::Return => plan_return(&snapshot, qty),
        };
        let movement = match movement {
            Ok(movement) => movement,
            Err(err) => {
                warn!(item, qty, username, %action, error = %err, "movement refused");
                return Err(err);
            }
        };

        let new_quantity =
            InventoryRepository::adjust_quantity(&txn, &movement.item, movement.delta).await?;
        let transaction = Self::insert_log_row(&txn, &movement, username).await?;

        txn.commit().await.map_err(ledger_db_err)?;

        info!(
            id = transaction.id,
            item = %transaction.item,
            qty,
            username,
            %action,
            total = %transaction.total,
            new_quantity,
            "movement recorded"
        );

        Ok(RecordedMovement {
            transaction,
            new_quantity,
        })
    }

    async fn insert_log_row(
        txn: &DatabaseTransaction,
        movement: &StockMovement,
        username: &str,
    ) -> Result<LedgerRecord, LedgerError> {
        let row = transactions::ActiveModel {
            id: NotSet,
            item: Set(movement.item.clone()),
            quantity: Set(movement.quantity),
            total: Set(movement.total),
            cost: Set(movement.cost),
            username: Set(username.to_string()),
            action: Set(movement.action.as_str().to_string()),
            recorded_at: Set(Utc::now().trunc_subsecs(0)),
        };

        row.insert(txn).await.map_err(ledger_db_err)?.try_into()
    }
}
