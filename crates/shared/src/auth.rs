//! Authentication payloads and JWT claims.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// JWT claims for access tokens.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (username).
    pub sub: String,
    /// Login session the token was minted for.
    pub sid: Uuid,
    /// User's role.
    pub role: String,
    /// Issued at timestamp.
    pub iat: i64,
    /// Expiration timestamp.
    pub exp: i64,
}

impl Claims {
    /// Creates new claims for a user.
    #[must_use]
    pub fn new(username: &str, session_id: Uuid, role: &str, expires_at: DateTime<Utc>) -> Self {
        let now = Utc::now();
        Self {
            sub: username.to_string(),
            sid: session_id,
            role: role.to_string(),
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
        }
    }

    /// Returns the username from claims.
    #[must_use]
    pub fn username(&self) -> &str {
        &self.sub
    }

    /// Returns the login session ID from claims.
    #[must_use]
    pub const fn session_id(&self) -> Uuid {
        self.sid
    }
}

/// Login request payload.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    /// Username.
    pub username: String,
    /// Password.
    pub password: String,
}

/// Submits the passcode for a pending login.
#[derive(Debug, Clone, Deserialize)]
pub struct VerifyOtpRequest {
    /// Session returned by the login step.
    pub session_id: Uuid,
    /// Six digit passcode.
    pub code: String,
}

/// Refers to a pending login session.
#[derive(Debug, Clone, Deserialize)]
pub struct SessionRequest {
    /// Session returned by the login step.
    pub session_id: Uuid,
}

/// Starts the change-password branch.
#[derive(Debug, Clone, Deserialize)]
pub struct ChangePasswordStartRequest {
    /// Username.
    pub username: String,
    /// Current password.
    pub old_password: String,
}

/// Starts the forgot-password branch.
#[derive(Debug, Clone, Deserialize)]
pub struct ForgotPasswordRequest {
    /// Username.
    pub username: String,
}

/// Completes a change or reset with the password passcode.
#[derive(Debug, Clone, Deserialize)]
pub struct CompletePasswordRequest {
    /// Session returned by the start step.
    pub session_id: Uuid,
    /// Six digit passcode.
    pub otp: String,
    /// New password.
    pub new_password: String,
    /// Confirmation of the new password.
    pub confirm_password: String,
}

/// Response for any step that leaves a passcode pending.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PendingOtpResponse {
    /// Session to quote on the next step.
    pub session_id: Uuid,
    /// Current step of the session.
    pub step: String,
    /// Human readable hint.
    pub message: String,
}

/// Response once the login passcode is accepted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    /// Username.
    pub username: String,
    /// Role.
    pub role: String,
    /// Access token.
    pub access_token: String,
    /// Token expiration in seconds.
    pub expires_in: i64,
}

/// Admin request to add a user.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateUserRequest {
    /// Username.
    pub username: String,
    /// Initial password.
    pub password: String,
    /// `admin` or `staff`.
    pub role: String,
}
