//! Password hashing and verification using Argon2.
//!
//! Hashes are stored as PHC strings, which embed the salt and parameters.

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};

use crate::error::GatewayError;

/// Hashes a password using Argon2id with default parameters.
///
/// # Errors
///
/// Returns [`GatewayError::Internal`] if hashing fails.
pub fn hash_password(password: &str) -> Result<String, GatewayError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| GatewayError::Internal(format!("failed to hash password: {e}")))
}

/// Verifies a password against a stored PHC hash.
///
/// # Errors
///
/// Returns [`GatewayError::Internal`] if `hash` is not a valid PHC string.
pub fn verify_password(password: &str, hash: &str) -> Result<bool, GatewayError> {
    let parsed = PasswordHash::new(hash)
        .map_err(|e| GatewayError::Internal(format!("invalid password hash: {e}")))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok())
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn hash_then_verify() {
        let Ok(hash) = hash_password("correct-horse") else {
            panic!("hashing failed");
        };
        assert!(hash.starts_with("$argon2"));
        assert_eq!(verify_password("correct-horse", &hash).ok(), Some(true));
        assert_eq!(verify_password("wrong-horse", &hash).ok(), Some(false));
    }

    #[test]
    fn salts_differ_between_hashes() {
        let (Ok(a), Ok(b)) = (hash_password("same"), hash_password("same")) else {
            panic!("hashing failed");
        };
        assert_ne!(a, b);
    }

    #[test]
    fn garbage_hash_is_an_error() {
        assert!(verify_password("pw", "not-a-phc-string").is_err());
    }
}
