//! Password hashing with Argon2id.
//!
//! Every hash carries its own random salt inside the PHC string, so two users
//! with the same password never share a stored hash.

use std::sync::LazyLock;

use argon2::{
    Argon2, PasswordHash,
    password_hash::{PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use thiserror::Error;

use super::AuthError;

/// Errors that can occur during password operations.
#[derive(Debug, Error)]
pub enum PasswordError {
    /// Failed to hash password.
    #[error("failed to hash password: {0}")]
    HashError(String),

    /// Failed to verify password.
    #[error("failed to verify password: {0}")]
    VerifyError(String),

    /// Invalid password hash format.
    #[error("invalid password hash format")]
    InvalidHash,
}

/// Hashes a password using Argon2id with a fresh salt.
///
/// # Errors
///
/// Returns `PasswordError::HashError` if hashing fails.
///
/// # Example
///
/// ```
/// use nursery_core::auth::hash_password;
///
/// let hash = hash_password("admin123").unwrap();
/// assert!(hash.starts_with("$argon2id$"));
/// ```
pub fn hash_password(password: &str) -> Result<String, PasswordError> {
    let salt = SaltString::generate(&mut OsRng);

    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| PasswordError::HashError(e.to_string()))
}

/// Verifies a password against a stored PHC hash.
///
/// # Errors
///
/// Returns `PasswordError::InvalidHash` if the hash format is invalid.
/// Returns `PasswordError::VerifyError` if verification fails unexpectedly.
pub fn verify_password(password: &str, hash: &str) -> Result<bool, PasswordError> {
    let parsed_hash = PasswordHash::new(hash).map_err(|_| PasswordError::InvalidHash)?;

    match Argon2::default().verify_password(password.as_bytes(), &parsed_hash) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(e) => Err(PasswordError::VerifyError(e.to_string())),
    }
}

/// Hash checked when no account matches, built once on first use.
static DUMMY_HASH: LazyLock<Option<String>> =
    LazyLock::new(|| hash_password("no-such-account-placeholder").ok());

/// Runs a full Argon2 verification against a throwaway hash.
///
/// Call it when the account does not exist, so an unknown username costs
/// as much as a wrong password. The result is never a match for a real
/// login.
///
/// # Errors
///
/// Returns `PasswordError::HashError` if the throwaway hash could not be built.
pub fn verify_dummy_password(password: &str) -> Result<bool, PasswordError> {
    let hash = DUMMY_HASH
        .as_deref()
        .ok_or_else(|| PasswordError::HashError("dummy hash unavailable".to_string()))?;
    verify_password(password, hash)
}

/// Checks a new password and its confirmation before it replaces a hash.
///
/// # Errors
///
/// Returns `AuthError::Validation` when the password is empty or the two
/// entries differ.
pub fn check_new_password(new_password: &str, confirm_password: &str) -> Result<(), AuthError> {
    if new_password.is_empty() {
        return Err(AuthError::Validation("new password is required".to_string()));
    }
    if new_password != confirm_password {
        return Err(AuthError::Validation("password mismatch".to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify() {
        let hash = hash_password("correct_password").unwrap();

        assert!(hash.starts_with("$argon2id$"));
        assert!(verify_password("correct_password", &hash).unwrap());
        assert!(!verify_password("wrong_password", &hash).unwrap());
    }

    #[test]
    fn test_same_password_gets_distinct_salts() {
        let hash1 = hash_password("admin123").unwrap();
        let hash2 = hash_password("admin123").unwrap();

        assert_ne!(hash1, hash2);
    }

    #[test]
    fn test_invalid_hash_format() {
        // legacy unsalted sha256 hex digests are not accepted
        let legacy = "240be518fabd2724ddb6f04eeb1da5967448d7e831c08c8fa822809f74c720a9";
        let result = verify_password("admin123", legacy);
        assert!(matches!(result, Err(PasswordError::InvalidHash)));
    }

    #[test]
    fn test_dummy_verification_runs_argon2() {
        assert!(!verify_dummy_password("admin123").unwrap());
        assert!(DUMMY_HASH.as_deref().unwrap().starts_with("$argon2id$"));
    }

    #[test]
    fn test_check_new_password() {
        assert!(check_new_password("s3cret", "s3cret").is_ok());
        assert!(matches!(
            check_new_password("s3cret", "s3cre7"),
            Err(AuthError::Validation(_))
        ));
        assert!(matches!(
            check_new_password("", ""),
            Err(AuthError::Validation(_))
        ));
    }
}
