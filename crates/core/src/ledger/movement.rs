//! Sale and return planning.
//!
//! A movement is computed from a snapshot of the item before anything is
//! written. Sales carry positive `total`/`cost`, returns carry negative ones,
//! so every aggregate over the log is a plain sum.

use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::error::LedgerError;

/// Kind of stock movement recorded in the log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TransactionAction {
    /// Units leave the shop.
    Sale,
    /// Units come back.
    Return,
}

impl TransactionAction {
    /// Stored name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Sale => "SALE",
            Self::Return => "RETURN",
        }
    }
}

impl fmt::Display for TransactionAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransactionAction {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "SALE" => Ok(Self::Sale),
            "RETURN" => Ok(Self::Return),
            other => Err(LedgerError::Validation(format!("unknown action '{other}'"))),
        }
    }
}

/// The fields of an inventory row that a movement depends on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemSnapshot {
    /// Item name.
    pub item: String,
    /// Units on hand.
    pub quantity: i64,
    /// Unit cost.
    pub cost_price: Decimal,
    /// Unit selling price.
    pub sell_price: Decimal,
}

/// A planned stock change and the log row that goes with it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StockMovement {
    /// Item name.
    pub item: String,
    /// Sale or return.
    pub action: TransactionAction,
    /// Units moved, always positive.
    pub quantity: i64,
    /// Signed change applied to the item's quantity.
    pub delta: i64,
    /// Signed revenue.
    pub total: Decimal,
    /// Signed cost of goods.
    pub cost: Decimal,
}

impl StockMovement {
    /// `total - cost`.
    #[must_use]
    pub fn profit(&self) -> Decimal {
        self.total - self.cost
    }
}

/// Rejects non-positive quantities.
///
/// # Errors
///
/// Returns `LedgerError::Validation` when `qty <= 0`.
pub fn validate_quantity(qty: i64) -> Result<(), LedgerError> {
    if qty <= 0 {
        return Err(LedgerError::Validation(
            "quantity must be greater than zero".to_string(),
        ));
    }
    Ok(())
}

/// Plans a sale of `qty` units.
///
/// Checks run in a fixed order: quantity, selling price, stock.
///
/// # Errors
///
/// - `Validation` when `qty <= 0`
/// - `PriceNotSet` when the selling price is zero or negative
/// - `InsufficientStock` when nothing is on hand or `qty` exceeds it
pub fn plan_sale(snapshot: &ItemSnapshot, qty: i64) -> Result<StockMovement, LedgerError> {
    validate_quantity(qty)?;

    if snapshot.sell_price <= Decimal::ZERO {
        return Err(LedgerError::PriceNotSet(snapshot.item.clone()));
    }
    if snapshot.quantity <= 0 || qty > snapshot.quantity {
        return Err(LedgerError::InsufficientStock {
            item: snapshot.item.clone(),
            requested: qty,
            available: snapshot.quantity,
        });
    }

    let (total, cost) = amounts(snapshot, qty)?;
    Ok(StockMovement {
        item: snapshot.item.clone(),
        action: TransactionAction::Sale,
        quantity: qty,
        delta: -qty,
        total,
        cost,
    })
}

/// Plans a return of `qty` units. There is no upper bound.
///
/// # Errors
///
/// Returns `Validation` when `qty <= 0`.
pub fn plan_return(snapshot: &ItemSnapshot, qty: i64) -> Result<StockMovement, LedgerError> {
    validate_quantity(qty)?;

    let (total, cost) = amounts(snapshot, qty)?;
    Ok(StockMovement {
        item: snapshot.item.clone(),
        action: TransactionAction::Return,
        quantity: qty,
        delta: qty,
        total: -total,
        cost: -cost,
    })
}

/// Applies `delta` to `current` and returns the new quantity.
///
/// # Errors
///
/// Returns `InsufficientStock` when the result would be negative.
pub fn apply_delta(item: &str, current: i64, delta: i64) -> Result<i64, LedgerError> {
    let insufficient = || LedgerError::InsufficientStock {
        item: item.to_string(),
        requested: delta.saturating_neg(),
        available: current,
    };

    match current.checked_add(delta) {
        Some(next) if next >= 0 => Ok(next),
        Some(_) => Err(insufficient()),
        None => Err(LedgerError::Validation("quantity out of range".to_string())),
    }
}

/// Largest amount the log's `total`/`cost` columns hold (`numeric(14, 2)`).
fn max_amount() -> Decimal {
    Decimal::new(99_999_999_999_999, 2)
}

fn amounts(snapshot: &ItemSnapshot, qty: i64) -> Result<(Decimal, Decimal), LedgerError> {
    let units = Decimal::from(qty);
    let overflow = || LedgerError::Validation("amount out of range".to_string());
    let checked = |price: Decimal| {
        units
            .checked_mul(price)
            .filter(|amount| amount.abs() <= max_amount())
            .ok_or_else(overflow)
    };

    Ok((checked(snapshot.sell_price)?, checked(snapshot.cost_price)?))
}
