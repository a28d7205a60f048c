//! Stock ledger rules.
//!
//! This module implements the arithmetic behind sales and returns:
//! - Transaction actions and their sign convention
//! - Planning a movement from an item snapshot
//! - Applying a quantity delta without going negative
//! - Error types for ledger operations

pub mod error;
pub mod movement;

#[cfg(test)]
mod movement_props;

pub use error::LedgerError;
pub use movement::{
    ItemSnapshot, StockMovement, TransactionAction, apply_delta, plan_return, plan_sale,
    validate_quantity,
};
