//! Repository abstractions for data access.
//!
//! Repositories provide a clean interface for database operations,
//! hiding the `SeaORM` implementation details from the rest of the application.
//! Failures come back as the core error types so callers never see `DbErr`.

pub mod inventory;
pub mod report;
pub mod sales;
pub mod user;

pub use inventory::InventoryRepository;
pub use report::{ReportQueryError, ReportRepository};
pub use sales::{RecordedMovement, SalesRepository};
pub use user::UserRepository;

use nursery_core::auth::AuthError;
use nursery_core::ledger::{LedgerError, TransactionAction};
use nursery_core::reports::LedgerRecord;
use sea_orm::DbErr;
use tracing::error;

use crate::entities::transactions;

pub(crate) fn ledger_db_err(err: DbErr) -> LedgerError {
    error!(error = %err, "ledger query failed");
    LedgerError::Database(err.to_string())
}

pub(crate) fn auth_db_err(err: DbErr) -> AuthError {
    error!(error = %err, "credential query failed");
    AuthError::Database(err.to_string())
}

impl TryFrom<transactions::Model> for LedgerRecord {
    type Error = LedgerError;

    fn try_from(model: transactions::Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: model.id,
            action: model.action.parse::<TransactionAction>()?,
            item: model.item,
            quantity: model.quantity,
            total: model.total,
            cost: model.cost,
            username: model.username,
            recorded_at: model.recorded_at,
        })
    }
}

pub(crate) fn into_records(
    models: Vec<transactions::Model>,
) -> Result<Vec<LedgerRecord>, LedgerError> {
    models.into_iter().map(LedgerRecord::try_from).collect()
}
