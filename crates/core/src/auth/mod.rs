//! Authentication and authorization.
//!
//! This module provides:
//! - Password hashing with Argon2id
//! - User role definitions
//! - One-time passcode slots
//! - The login session state machine

mod error;
mod otp;
mod password;
mod session;

pub use error::AuthError;
pub use otp::{
    DEFAULT_OTP_TTL_SECS, MAX_OTP_ATTEMPTS, OTP_LENGTH, OtpSlot, OtpSlots, PendingCode,
    generate_code,
};
pub use password::{
    PasswordError, check_new_password, hash_password, verify_dummy_password, verify_password,
};
pub use session::{AuthSession, AuthStep, PasswordFlow, Principal};

use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// User roles in the shop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    /// Owner/manager: full access.
    Admin,
    /// Counter staff: sales and returns, own history only.
    Staff,
}

impl UserRole {
    /// Returns true if this role can add, update or delete catalog items.
    #[must_use]
    pub const fn can_manage_inventory(&self) -> bool {
        matches!(self, Self::Admin)
    }

    /// Returns true if this role can create user accounts.
    #[must_use]
    pub const fn can_manage_users(&self) -> bool {
        matches!(self, Self::Admin)
    }

    /// Returns true if this role may see other users' transactions.
    #[must_use]
    pub const fn can_view_all_transactions(&self) -> bool {
        matches!(self, Self::Admin)
    }

    /// Lowercase name as stored and carried in tokens.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Staff => "staff",
        }
    }
}

impl std::fmt::Display for UserRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UserRole {
    type Err = AuthError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "admin" => Ok(Self::Admin),
            "staff" => Ok(Self::Staff),
            other => Err(AuthError::Validation(format!("unknown role '{other}'"))),
        }
    }
}
