//! One-time passcodes.
//!
//! A session holds two independent slots, one for the login second factor and
//! one for password change/reset. Issuing a code overwrites whatever was
//! pending in that slot. A code is accepted at most once and only within its
//! time-to-live, and is dropped after `MAX_OTP_ATTEMPTS` wrong guesses.

use chrono::{DateTime, Duration, Utc};
use rand::Rng;

/// Number of digits in a passcode.
pub const OTP_LENGTH: usize = 6;

/// Default lifetime of an issued passcode, in seconds.
pub const DEFAULT_OTP_TTL_SECS: i64 = 300;

/// Wrong guesses a pending code survives before it is dropped.
pub const MAX_OTP_ATTEMPTS: u32 = 5;

/// Generates a uniformly random six-digit code.
#[must_use]
pub fn generate_code() -> String {
    rand::rng().random_range(100_000..=999_999u32).to_string()
}

/// Which verification context a code belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OtpSlot {
    /// Second factor after a correct password.
    Login,
    /// Password change or forgot-password reset.
    Password,
}

/// A code waiting to be verified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingCode {
    /// The digits sent to the user.
    pub code: String,
    /// When the code was issued.
    pub issued_at: DateTime<Utc>,
    /// Wrong guesses so far.
    pub attempts: u32,
}

impl PendingCode {
    /// Returns true once `ttl` has elapsed since issue.
    #[must_use]
    pub fn is_expired(&self, now: DateTime<Utc>, ttl: Duration) -> bool {
        now - self.issued_at > ttl
    }
}

/// The two passcode slots of a login session.
#[derive(Debug, Clone)]
pub struct OtpSlots {
    ttl: Duration,
    login: Option<PendingCode>,
    password: Option<PendingCode>,
}

impl Default for OtpSlots {
    fn default() -> Self {
        Self::new(Duration::seconds(DEFAULT_OTP_TTL_SECS))
    }
}

impl OtpSlots {
    /// Creates empty slots whose codes live for `ttl`.
    #[must_use]
    pub const fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            login: None,
            password: None,
        }
    }

    /// Generates a fresh code for `slot`, replacing any pending one.
    pub fn issue(&mut self, slot: OtpSlot, now: DateTime<Utc>) -> String {
        let code = generate_code();
        self.store(slot, code.clone(), now);
        code
    }

    /// Places a known code in `slot`, replacing any pending one.
    pub fn store(&mut self, slot: OtpSlot, code: String, now: DateTime<Utc>) {
        *self.slot_mut(slot) = Some(PendingCode {
            code,
            issued_at: now,
            attempts: 0,
        });
    }

    /// Checks `submitted` against the pending code for `slot`.
    ///
    /// A match within the TTL consumes the code. A wrong code leaves it in
    /// place for a retry until `MAX_OTP_ATTEMPTS` misses; an expired code is
    /// dropped.
    pub fn verify(&mut self, slot: OtpSlot, submitted: &str, now: DateTime<Utc>) -> bool {
        let ttl = self.ttl;
        let pending = self.slot_mut(slot);

        let Some(code) = pending.as_mut() else {
            return false;
        };
        if code.is_expired(now, ttl) {
            *pending = None;
            return false;
        }
        if code.code != submitted.trim() {
            code.attempts += 1;
            if code.attempts >= MAX_OTP_ATTEMPTS {
                *pending = None;
            }
            return false;
        }

        *pending = None;
        true
    }

    /// Drops the pending code for `slot`.
    pub fn clear(&mut self, slot: OtpSlot) {
        *self.slot_mut(slot) = None;
    }

    /// Returns true if `slot` holds a code.
    #[must_use]
    pub const fn is_pending(&self, slot: OtpSlot) -> bool {
        match slot {
            OtpSlot::Login => self.login.is_some(),
            OtpSlot::Password => self.password.is_some(),
        }
    }

    const fn slot_mut(&mut self, slot: OtpSlot) -> &mut Option<PendingCode> {
        match slot {
            OtpSlot::Login => &mut self.login,
            OtpSlot::Password => &mut self.password,
        }
    }
}
