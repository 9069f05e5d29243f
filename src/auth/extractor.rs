//! Axum extractor for bearer-token authentication.

use axum::extract::{FromRequestParts, OptionalFromRequestParts};
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;

use super::Claims;
use crate::app_state::AppState;
use crate::error::GatewayError;

/// The operator behind a request carrying a valid
/// `Authorization: Bearer <token>` header.
///
/// Use it as a handler argument to require authentication, or as
/// `Option<AuthenticatedUser>` to accept anonymous requests while still
/// rejecting invalid tokens.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    /// Verified token claims.
    pub claims: Claims,
}

impl AuthenticatedUser {
    /// Operator login name.
    #[must_use]
    pub fn username(&self) -> &str {
        &self.claims.username
    }
}

impl FromRequestParts<AppState> for AuthenticatedUser {
    type Rejection = GatewayError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(AUTHORIZATION)
            .ok_or_else(|| GatewayError::Unauthorized("missing bearer token".to_string()))?;
        authenticate(header.to_str().ok(), state)
    }
}

impl OptionalFromRequestParts<AppState> for AuthenticatedUser {
    type Rejection = GatewayError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Option<Self>, Self::Rejection> {
        match parts.headers.get(AUTHORIZATION) {
            None => Ok(None),
            Some(header) => authenticate(header.to_str().ok(), state).map(Some),
        }
    }
}

fn authenticate(header: Option<&str>, state: &AppState) -> Result<AuthenticatedUser, GatewayError> {
    let token = bearer_token(header)
        .ok_or_else(|| GatewayError::Unauthorized("malformed authorization header".to_string()))?;
    let claims = state.auth_service.verify_token(token)?;
    Ok(AuthenticatedUser { claims })
}

/// Extracts the token from a `Bearer <token>` header value.
#[must_use]
pub fn bearer_token(header: Option<&str>) -> Option<&str> {
    let token = header?.strip_prefix("Bearer ")?.trim();
    (!token.is_empty()).then_some(token)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bearer_prefix_is_required() {
        assert_eq!(bearer_token(Some("Bearer abc.def")), Some("abc.def"));
        assert_eq!(bearer_token(Some("Basic abc")), None);
        assert_eq!(bearer_token(Some("Bearer   ")), None);
        assert_eq!(bearer_token(None), None);
    }
}
