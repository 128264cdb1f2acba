//! Password hashing.
//!
//! Passwords are hashed with Argon2id and stored as PHC strings, which embed
//! the salt and parameters alongside the hash.

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use thiserror::Error;

/// Errors that can occur while hashing or verifying a password.
#[derive(Debug, Error)]
pub enum PasswordError {
    /// The hasher rejected the input.
    #[error("password hashing error")]
    Hash,

    /// The password does not match the stored hash.
    #[error("invalid credentials")]
    InvalidCredentials,
}

/// Hash a password using Argon2id.
///
/// Any string is accepted, including the empty string.
///
/// # Errors
///
/// Returns `PasswordError::Hash` if the hasher fails.
pub fn hash_password(password: &str) -> Result<String, PasswordError> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| PasswordError::Hash)
}

/// Verify a password against a stored hash.
///
/// # Errors
///
/// Returns `PasswordError::InvalidCredentials` if the hash is malformed or
/// the password does not match.
pub fn verify_password(password: &str, hash: &str) -> Result<(), PasswordError> {
    let parsed_hash = PasswordHash::new(hash).map_err(|_| PasswordError::InvalidCredentials)?;
    let argon2 = Argon2::default();

    argon2
        .verify_password(password.as_bytes(), &parsed_hash)
        .map_err(|_| PasswordError::InvalidCredentials)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_differs_from_plaintext_and_verifies() {
        let hash = hash_password("hunter22").unwrap();
        assert_ne!(hash, "hunter22");
        assert!(hash.starts_with("$argon2id$"));
        assert!(verify_password("hunter22", &hash).is_ok());
    }

    #[test]
    fn test_wrong_password_is_rejected() {
        let hash = hash_password("hunter22").unwrap();
        assert!(matches!(
            verify_password("hunter23", &hash),
            Err(PasswordError::InvalidCredentials)
        ));
    }

    #[test]
    fn test_same_password_gets_fresh_salt() {
        let first = hash_password("same").unwrap();
        let second = hash_password("same").unwrap();
        assert_ne!(first, second);
    }

    #[test]
    fn test_empty_password_is_hashed() {
        let hash = hash_password("").unwrap();
        assert!(verify_password("", &hash).is_ok());
    }

    #[test]
    fn test_malformed_hash_is_rejected() {
        assert!(verify_password("anything", "not-a-phc-string").is_err());
    }
}
