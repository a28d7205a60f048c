//! Report data types.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::error::ReportError;
use crate::auth::Principal;
use crate::ledger::TransactionAction;

/// One row of the transaction log, as reports see it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerRecord {
    /// Transaction id.
    pub id: i64,
    /// Item name at the time of the movement.
    pub item: String,
    /// Units moved.
    pub quantity: i64,
    /// Signed revenue.
    pub total: Decimal,
    /// Signed cost.
    pub cost: Decimal,
    /// Acting user.
    pub username: String,
    /// Sale or return.
    pub action: TransactionAction,
    /// When the movement was recorded.
    pub recorded_at: DateTime<Utc>,
}

impl LedgerRecord {
    /// `total - cost`.
    #[must_use]
    pub fn profit(&self) -> Decimal {
        self.total - self.cost
    }
}

/// Whose transactions a report may include.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Scope {
    /// Every user.
    All,
    /// A single user.
    User(String),
}

impl Scope {
    /// Admins see everything, everyone else sees only their own rows.
    #[must_use]
    pub fn for_viewer(viewer: &Principal) -> Self {
        if viewer.role.can_view_all_transactions() {
            Self::All
        } else {
            Self::User(viewer.username.clone())
        }
    }

    /// Returns true if `username` is visible under this scope.
    #[must_use]
    pub fn includes(&self, username: &str) -> bool {
        match self {
            Self::All => true,
            Self::User(only) => only == username,
        }
    }

    /// The single user this scope is pinned to, if any.
    #[must_use]
    pub fn username(&self) -> Option<&str> {
        match self {
            Self::All => None,
            Self::User(name) => Some(name),
        }
    }
}

/// Criteria for the transaction history view.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionFilter {
    /// Only this user's rows.
    pub username: Option<String>,
    /// First business day included.
    pub from: Option<NaiveDate>,
    /// Last business day included.
    pub to: Option<NaiveDate>,
}

impl TransactionFilter {
    /// Builds the effective filter for `viewer`.
    ///
    /// Staff are always pinned to their own username whatever they asked for.
    ///
    /// # Errors
    ///
    /// Returns `ReportError::InvalidDateRange` when `from` is after `to`.
    pub fn for_viewer(
        viewer: &Principal,
        username: Option<String>,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    ) -> Result<Self, ReportError> {
        if let (Some(start), Some(end)) = (from, to)
            && start > end
        {
            return Err(ReportError::InvalidDateRange { start, end });
        }

        let username = match Scope::for_viewer(viewer) {
            Scope::All => username.filter(|name| !name.trim().is_empty()),
            Scope::User(own) => Some(own),
        };

        Ok(Self { username, from, to })
    }
}

/// Sales for one user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserSales {
    /// Username.
    pub username: String,
    /// Sum of totals.
    pub total: Decimal,
}

/// Sales for one business day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailySales {
    /// Business day.
    pub date: NaiveDate,
    /// Sum of totals.
    pub total: Decimal,
}

/// Dashboard metrics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dashboard {
    /// Sum of totals.
    pub total_sales: Decimal,
    /// Sum of `total - cost`.
    pub total_profit: Decimal,
    /// Per-user sums, ordered by username.
    pub sales_by_user: Vec<UserSales>,
    /// Per-day sums, oldest first.
    pub daily_sales: Vec<DailySales>,
}

/// One user's line in a daily closing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserClosing {
    /// Username.
    pub username: String,
    /// Sum of sale totals.
    pub total_sale: Decimal,
    /// Magnitude of return totals.
    pub total_return: Decimal,
    /// Sum of `total - cost`.
    pub net_profit: Decimal,
}

/// End-of-day report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyClosing {
    /// Business day.
    pub date: NaiveDate,
    /// Sum of sale totals.
    pub total_sale: Decimal,
    /// Magnitude of return totals.
    pub total_return: Decimal,
    /// Sum of `total - cost`.
    pub net_profit: Decimal,
    /// Per-user breakdown, ordered by username.
    pub per_user: Vec<UserClosing>,
    /// The day's transactions, newest first.
    pub transactions: Vec<LedgerRecord>,
}

/// Totals of a filtered history.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionSummary {
    /// Number of rows.
    pub count: usize,
    /// Sum of totals.
    pub total_sales: Decimal,
    /// Sum of `total - cost`.
    pub total_profit: Decimal,
}

/// Filtered history with its totals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionHistory {
    /// Filter that was applied.
    pub filter: TransactionFilter,
    /// Totals over `transactions`.
    pub summary: TransactionSummary,
    /// Matching rows, newest first.
    pub transactions: Vec<LedgerRecord>,
}
