//! Bearer token issuing and validation.
//!
//! Tokens are HS256-signed JWTs carrying the operator id and username.
//! Validation rejects bad signatures and tokens past `exp` (with the
//! library's default 60 s leeway).

use std::fmt;

use chrono::Utc;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

use super::OperatorAccount;
use crate::error::GatewayError;

/// Payload stored in every bearer token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Operator id.
    pub sub: String,
    /// Operator login name, used to attribute activity log lines.
    pub username: String,
    /// Issued at (Unix seconds).
    pub iat: u64,
    /// Expiry (Unix seconds).
    pub exp: u64,
}

/// Signs and verifies bearer tokens with a shared HMAC secret.
#[derive(Clone)]
pub struct JwtManager {
    secret: String,
    expiry_secs: u64,
}

impl fmt::Debug for JwtManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JwtManager")
            .field("secret", &"<redacted>")
            .field("expiry_secs", &self.expiry_secs)
            .finish()
    }
}

impl JwtManager {
    /// Creates a manager signing with `secret`; tokens live `expiry_secs`.
    #[must_use]
    pub fn new(secret: impl Into<String>, expiry_secs: u64) -> Self {
        Self {
            secret: secret.into(),
            expiry_secs,
        }
    }

    /// Issues a token for the operator, valid from now.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::Internal`] if signing fails.
    pub fn issue(&self, operator: &OperatorAccount) -> Result<String, GatewayError> {
        self.issue_at(operator, unix_now())
    }

    fn issue_at(&self, operator: &OperatorAccount, now: u64) -> Result<String, GatewayError> {
        let claims = Claims {
            sub: operator.id().to_string(),
            username: operator.username().to_string(),
            iat: now,
            exp: now.saturating_add(self.expiry_secs),
        };
        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )
        .map_err(|e| GatewayError::Internal(format!("failed to sign token: {e}")))
    }

    /// Verifies a token and returns its claims.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::Unauthorized`] if the token is malformed,
    /// forged or expired.
    pub fn verify(&self, token: &str) -> Result<Claims, GatewayError> {
        decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &Validation::default(),
        )
        .map(|data| data.claims)
        .map_err(|err| {
            let reason = match err.kind() {
                ErrorKind::ExpiredSignature => "token expired",
                ErrorKind::InvalidSignature => "invalid signature",
                _ => "invalid token",
            };
            GatewayError::Unauthorized(reason.to_string())
        })
    }
}

fn unix_now() -> u64 {
    u64::try_from(Utc::now().timestamp()).unwrap_or(0)
}
