//! Login session state machine.
//!
//! ```text
//! login ──credentials──▶ otp ──code──▶ authenticated
//!   │  ◀────── back ──────┘
//!   ├──▶ password_change ──code──▶ login
//!   └──▶ password_reset  ──code──▶ login
//! ```
//!
//! Every transition is a method that either moves the session forward or
//! returns an error and leaves the step untouched.

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use uuid::Uuid;

use super::{AuthError, OtpSlot, OtpSlots, UserRole};

/// Identity attached to a session once credentials check out.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Principal {
    /// Username.
    pub username: String,
    /// Role.
    pub role: UserRole,
}

impl Principal {
    /// Creates a principal.
    #[must_use]
    pub fn new(username: impl Into<String>, role: UserRole) -> Self {
        Self {
            username: username.into(),
            role,
        }
    }
}

/// Where a session is in the login flow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthStep {
    /// Waiting for username and password.
    Login,
    /// Password accepted, waiting for the login passcode.
    Otp(Principal),
    /// Fully signed in.
    Authenticated(Principal),
    /// Old password accepted, waiting for the password passcode.
    PasswordChange {
        /// Account being changed.
        username: String,
    },
    /// Forgot-password, waiting for the password passcode.
    PasswordReset {
        /// Account being reset.
        username: String,
    },
}

impl AuthStep {
    /// Short name used in responses and errors.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Login => "login",
            Self::Otp(_) => "otp",
            Self::Authenticated(_) => "authenticated",
            Self::PasswordChange { .. } => "password_change",
            Self::PasswordReset { .. } => "password_reset",
        }
    }
}

/// Which password branch a verified passcode completed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PasswordFlow {
    /// Change with the old password known.
    Change {
        /// Account.
        username: String,
    },
    /// Reset without the old password.
    Reset {
        /// Account.
        username: String,
    },
}

impl PasswordFlow {
    /// Account the flow applies to.
    #[must_use]
    pub fn username(&self) -> &str {
        match self {
            Self::Change { username } | Self::Reset { username } => username,
        }
    }
}

/// Server-side state of one login attempt.
#[derive(Debug, Clone)]
pub struct AuthSession {
    /// Session identifier handed to the client.
    pub id: Uuid,
    /// When the session was opened.
    pub created_at: DateTime<Utc>,
    step: AuthStep,
    otp: OtpSlots,
}

impl AuthSession {
    /// Opens a session in the `login` step.
    #[must_use]
    pub fn new(otp_ttl: Duration, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            created_at: now,
            step: AuthStep::Login,
            otp: OtpSlots::new(otp_ttl),
        }
    }

    /// Current step.
    #[must_use]
    pub const fn step(&self) -> &AuthStep {
        &self.step
    }

    /// Signed-in identity, if the session is authenticated.
    #[must_use]
    pub const fn principal(&self) -> Option<&Principal> {
        match &self.step {
            AuthStep::Authenticated(principal) => Some(principal),
            _ => None,
        }
    }

    /// Returns true once the login passcode has been accepted.
    #[must_use]
    pub const fn is_authenticated(&self) -> bool {
        matches!(self.step, AuthStep::Authenticated(_))
    }

    /// `login → otp`. Returns the login code to deliver.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidStep` outside the `login` step.
    pub fn credentials_accepted(
        &mut self,
        principal: Principal,
        now: DateTime<Utc>,
    ) -> Result<String, AuthError> {
        self.expect_login("accept credentials")?;
        let code = self.otp.issue(OtpSlot::Login, now);
        self.step = AuthStep::Otp(principal);
        Ok(code)
    }

    /// `otp → authenticated` on a matching code.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidOtp` on a wrong or expired code; the session
    /// stays in `otp`. Returns `AuthError::InvalidStep` outside `otp`.
    pub fn submit_login_otp(
        &mut self,
        submitted: &str,
        now: DateTime<Utc>,
    ) -> Result<Principal, AuthError> {
        let AuthStep::Otp(principal) = &self.step else {
            return Err(self.invalid("verify passcode"));
        };
        let principal = principal.clone();
        if !self.otp.verify(OtpSlot::Login, submitted, now) {
            return Err(AuthError::InvalidOtp);
        }

        self.step = AuthStep::Authenticated(principal.clone());
        Ok(principal)
    }

    /// Issues a fresh code for the current pending step.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidStep` when no passcode is awaited.
    pub fn reissue(&mut self, now: DateTime<Utc>) -> Result<String, AuthError> {
        let slot = match self.step {
            AuthStep::Otp(_) => OtpSlot::Login,
            AuthStep::PasswordChange { .. } | AuthStep::PasswordReset { .. } => OtpSlot::Password,
            AuthStep::Login | AuthStep::Authenticated(_) => {
                return Err(self.invalid("resend passcode"));
            }
        };
        Ok(self.otp.issue(slot, now))
    }

    /// Returns to `login` from any pending step and clears both codes.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidStep` from `authenticated`, which only
    /// logout leaves.
    pub fn back(&mut self) -> Result<(), AuthError> {
        if self.is_authenticated() {
            return Err(self.invalid("go back"));
        }
        self.otp.clear(OtpSlot::Login);
        self.otp.clear(OtpSlot::Password);
        self.step = AuthStep::Login;
        Ok(())
    }

    /// `login → password_change`. Returns the password code to deliver.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidStep` outside `login`.
    pub fn begin_password_change(
        &mut self,
        username: impl Into<String>,
        now: DateTime<Utc>,
    ) -> Result<String, AuthError> {
        self.expect_login("change password")?;
        let code = self.otp.issue(OtpSlot::Password, now);
        self.step = AuthStep::PasswordChange {
            username: username.into(),
        };
        Ok(code)
    }

    /// `login → password_reset`. Returns the password code to deliver.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidStep` outside `login`.
    pub fn begin_password_reset(
        &mut self,
        username: impl Into<String>,
        now: DateTime<Utc>,
    ) -> Result<String, AuthError> {
        self.expect_login("reset password")?;
        let code = self.otp.issue(OtpSlot::Password, now);
        self.step = AuthStep::PasswordReset {
            username: username.into(),
        };
        Ok(code)
    }

    /// Verifies the password code and returns to `login`.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidOtp` on a wrong or expired code (step
    /// unchanged), `AuthError::InvalidStep` outside a password branch.
    pub fn complete_password_flow(
        &mut self,
        submitted: &str,
        now: DateTime<Utc>,
    ) -> Result<PasswordFlow, AuthError> {
        let flow = match &self.step {
            AuthStep::PasswordChange { username } => PasswordFlow::Change {
                username: username.clone(),
            },
            AuthStep::PasswordReset { username } => PasswordFlow::Reset {
                username: username.clone(),
            },
            _ => return Err(self.invalid("complete password update")),
        };
        if !self.otp.verify(OtpSlot::Password, submitted, now) {
            return Err(AuthError::InvalidOtp);
        }

        self.step = AuthStep::Login;
        Ok(flow)
    }

    fn expect_login(&self, action: &'static str) -> Result<(), AuthError> {
        if matches!(self.step, AuthStep::Login) {
            Ok(())
        } else {
            Err(self.invalid(action))
        }
    }

    const fn invalid(&self, action: &'static str) -> AuthError {
        AuthError::InvalidStep {
            step: self.step.name(),
            action,
        }
    }
}
