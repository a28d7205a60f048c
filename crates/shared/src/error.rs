//! Application-wide error types.

use thiserror::Error;

/// Result type alias using `AppError`.
pub type AppResult<T> = Result<T, AppError>;

/// Application error types.
///
/// Domain crates keep their own error enums; this is the envelope the API
/// layer renders for anything that does not come from a domain operation.
#[derive(Debug, Error)]
pub enum AppError {
    /// Authentication failed (bad credentials, bad passcode, bad token).
    #[error("Authentication failed: {0}")]
    Unauthorized(String),

    /// Authenticated but the role does not allow the operation.
    #[error("Access denied: {0}")]
    Forbidden(String),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Malformed input.
    #[error("Validation error: {0}")]
    Validation(String),

    /// Duplicate entry.
    #[error("Already exists: {0}")]
    AlreadyExists(String),

    /// Not enough stock to cover a sale.
    #[error("Insufficient stock: {0}")]
    InsufficientStock(String),

    /// Item cannot be sold until a selling price is set.
    #[error("Selling price not set: {0}")]
    PriceNotSet(String),

    /// Notification channel failure.
    #[error("Delivery failed: {0}")]
    Delivery(String),

    /// Database error.
    #[error("Database error: {0}")]
    Database(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn status_code(&self) -> u16 {
        match self {
            Self::Unauthorized(_) => 401,
            Self::Forbidden(_) => 403,
            Self::NotFound(_) => 404,
            Self::Validation(_) => 400,
            Self::AlreadyExists(_) => 409,
            Self::InsufficientStock(_) | Self::PriceNotSet(_) => 422,
            Self::Delivery(_) => 502,
            Self::Database(_) | Self::Internal(_) => 500,
        }
    }

    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::Unauthorized(_) => "UNAUTHORIZED",
            Self::Forbidden(_) => "FORBIDDEN",
            Self::NotFound(_) => "NOT_FOUND",
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::AlreadyExists(_) => "ALREADY_EXISTS",
            Self::InsufficientStock(_) => "INSUFFICIENT_STOCK",
            Self::PriceNotSet(_) => "PRICE_NOT_SET",
            Self::Delivery(_) => "DELIVERY_ERROR",
            Self::Database(_) => "DATABASE_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }
}
