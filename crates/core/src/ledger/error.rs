//! Ledger error types for inventory and sale/return failures.

use thiserror::Error;

use crate::catalog::CatalogError;

/// Errors that can occur during ledger operations.
#[derive(Debug, Error)]
pub enum LedgerError {
    // ========== Validation Errors ==========
    /// Malformed request, such as a zero quantity.
    #[error("Validation error: {0}")]
    Validation(String),

    /// Item fields rejected by the catalog rules.
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    // ========== Item Errors ==========
    /// Item does not exist.
    #[error("Item not found: {0}")]
    NotFound(String),

    /// Item has no selling price yet.
    #[error("Selling price not set for {0}")]
    PriceNotSet(String),

    /// Not enough units on hand.
    #[error("Insufficient stock for {item}: requested {requested}, available {available}")]
    InsufficientStock {
        /// Item name.
        item: String,
        /// Units requested.
        requested: i64,
        /// Units on hand.
        available: i64,
    },

    /// Transaction id does not exist.
    #[error("Transaction not found: {0}")]
    TransactionNotFound(i64),

    // ========== Database Errors ==========
    /// Database error.
    #[error("Database error: {0}")]
    Database(String),
}

impl LedgerError {
    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::Validation(_) | Self::Catalog(_) => "VALIDATION_ERROR",
            Self::NotFound(_) => "NOT_FOUND",
            Self::PriceNotSet(_) => "PRICE_NOT_SET",
            Self::InsufficientStock { .. } => "INSUFFICIENT_STOCK",
            Self::TransactionNotFound(_) => "TRANSACTION_NOT_FOUND",
            Self::Database(_) => "DATABASE_ERROR",
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn http_status_code(&self) -> u16 {
        match self {
            // 400 Bad Request - validation errors
            Self::Validation(_) | Self::Catalog(_) => 400,

            // 404 Not Found
            Self::NotFound(_) | Self::TransactionNotFound(_) => 404,

            // 422 Unprocessable - stock rules
            Self::PriceNotSet(_) | Self::InsufficientStock { .. } => 422,

            // 500 Internal Server Error
            Self::Database(_) => 500,
        }
    }
}
