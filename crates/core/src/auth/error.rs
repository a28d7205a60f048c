//! Errors raised by the credential store and the login flow.

use thiserror::Error;

use super::password::PasswordError;

/// Errors that can occur during authentication and account management.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Unknown username or wrong password.
    #[error("Invalid username or password")]
    InvalidCredentials,

    /// Passcode missing, wrong, expired or already used.
    #[error("Invalid or expired passcode")]
    InvalidOtp,

    /// The session is not in a state that allows the requested step.
    #[error("Cannot {action} while session is in step '{step}'")]
    InvalidStep {
        /// Current step name.
        step: &'static str,
        /// Attempted action.
        action: &'static str,
    },

    /// Login session is unknown or has been torn down.
    #[error("Login session not found or expired")]
    SessionNotFound,

    /// Malformed input (empty username, password mismatch, bad role).
    #[error("Validation error: {0}")]
    Validation(String),

    /// Username does not exist.
    #[error("User not found: {0}")]
    UserNotFound(String),

    /// Username already taken.
    #[error("User already exists: {0}")]
    UserExists(String),

    /// Passcode could not be delivered.
    #[error("Could not deliver passcode: {0}")]
    Delivery(String),

    /// Hashing failure.
    #[error(transparent)]
    Password(#[from] PasswordError),

    /// Database error.
    #[error("Database error: {0}")]
    Database(String),
}

impl AuthError {
    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidCredentials => "INVALID_CREDENTIALS",
            Self::InvalidOtp => "INVALID_OTP",
            Self::InvalidStep { .. } => "INVALID_STEP",
            Self::SessionNotFound => "SESSION_NOT_FOUND",
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::UserNotFound(_) => "USER_NOT_FOUND",
            Self::UserExists(_) => "USER_EXISTS",
            Self::Delivery(_) => "DELIVERY_ERROR",
            Self::Password(_) => "PASSWORD_ERROR",
            Self::Database(_) => "DATABASE_ERROR",
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn http_status_code(&self) -> u16 {
        match self {
            Self::InvalidCredentials | Self::InvalidOtp | Self::SessionNotFound => 401,
            Self::Validation(_) => 400,
            Self::UserNotFound(_) => 404,
            Self::UserExists(_) | Self::InvalidStep { .. } => 409,
            Self::Delivery(_) => 502,
            Self::Password(_) | Self::Database(_) => 500,
        }
    }
}
