//! The single operator account allowed to sign in.

use super::password;
use crate::error::GatewayError;

/// Operator credentials held in memory for the lifetime of the process.
#[derive(Debug, Clone)]
pub struct OperatorAccount {
    id: u32,
    username: String,
    password_hash: String,
}

impl OperatorAccount {
    /// Creates an account from an existing Argon2 PHC hash.
    #[must_use]
    pub fn new(id: u32, username: impl Into<String>, password_hash: String) -> Self {
        Self {
            id,
            username: username.into(),
            password_hash,
        }
    }

    /// Creates an account by hashing a plaintext password.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::Internal`] if hashing fails.
    pub fn with_password(
        id: u32,
        username: impl Into<String>,
        password: &str,
    ) -> Result<Self, GatewayError> {
        Ok(Self::new(id, username, password::hash_password(password)?))
    }

    /// Operator id, carried as the token subject.
    #[must_use]
    pub const fn id(&self) -> u32 {
        self.id
    }

    /// Login name.
    #[must_use]
    pub fn username(&self) -> &str {
        &self.username
    }

    /// Returns `true` if both the username and the password match.
    ///
    /// The password hash is checked even for an unknown username so the
    /// response time does not reveal which field was wrong.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::Internal`] if the stored hash is malformed.
    pub fn verify(&self, username: &str, password: &str) -> Result<bool, GatewayError> {
        let password_ok = password::verify_password(password, &self.password_hash)?;
        Ok(password_ok && username == self.username)
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn verify_requires_both_fields() {
        let Ok(account) = OperatorAccount::with_password(1, "admin", "password123") else {
            panic!("hashing failed");
        };
        assert_eq!(account.verify("admin", "password123").ok(), Some(true));
        assert_eq!(account.verify("admin", "nope").ok(), Some(false));
        assert_eq!(account.verify("root", "password123").ok(), Some(false));
    }
}
