//! Gateway error types with HTTP status code mapping.
//!
//! [`GatewayError`] is the central error type for the gateway. Each variant
//! maps to a specific HTTP status code and structured JSON error response.

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use utoipa::ToSchema;

/// Structured JSON error response body.
///
/// All error responses follow this shape:
/// ```json
/// {
///   "error": {
///     "code": 1002,
///     "message": "missing parameters",
///     "details": null
///   }
/// }
/// ```
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    /// Structured error payload.
    pub error: ErrorBody,
}

/// Inner error body with numeric code and human-readable message.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorBody {
    /// Numeric error code (see code ranges on [`GatewayError`]).
    pub code: u32,
    /// Human-readable error message.
    pub message: String,
    /// Optional additional details.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

/// Server-side error enum with HTTP status code mapping.
///
/// # Error Code Ranges
///
/// | Range     | Category        | HTTP Status                |
/// |-----------|-----------------|----------------------------|
/// | 1000–1999 | Validation      | 400 Bad Request            |
/// | 2000–2999 | Authentication  | 401 Unauthorized           |
/// | 3000–3999 | Server          | 500 / 502                  |
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    /// Request validation failed.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// A required request field was absent or empty.
    #[error("missing parameters")]
    MissingParameters,

    /// An observation with no text was submitted.
    #[error("observation is empty")]
    EmptyObservation,

    /// Uploaded image exceeds the configured limit.
    #[error("image exceeds the {limit} byte upload limit")]
    PayloadTooLarge {
        /// Maximum accepted image size in bytes.
        limit: usize,
    },

    /// Unsupported `alert_type` on a notification.
    #[error("invalid alert type: {0}")]
    InvalidAlertType(String),

    /// Bearer token missing, malformed, forged or expired.
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// Login rejected.
    #[error("invalid username or password")]
    InvalidCredentials,

    /// Database failure.
    #[error("persistence error: {0}")]
    PersistenceError(String),

    /// The relay microcontroller could not be reached or refused the command.
    #[error("relay server request failed for {ip}")]
    RelayUnreachable {
        /// Target device address.
        ip: String,
        /// Underlying transport or HTTP error.
        details: String,
    },

    /// Local file storage failure (notifications, uploads, activity log).
    #[error("storage error: {0}")]
    StorageError(String),

    /// Internal server error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl GatewayError {
    /// Returns the numeric error code for this variant.
    #[must_use]
    pub const fn error_code(&self) -> u32 {
        match self {
            Self::InvalidRequest(_) => 1001,
            Self::MissingParameters => 1002,
            Self::EmptyObservation => 1003,
            Self::PayloadTooLarge { .. } => 1004,
            Self::InvalidAlertType(_) => 1005,
            Self::Unauthorized(_) => 2001,
            Self::InvalidCredentials => 2002,
            Self::Internal(_) => 3000,
            Self::PersistenceError(_) => 3001,
            Self::RelayUnreachable { .. } => 3002,
            Self::StorageError(_) => 3003,
        }
    }

    /// Returns the HTTP status code for this variant.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidRequest(_)
            | Self::MissingParameters
            | Self::EmptyObservation
            | Self::PayloadTooLarge { .. }
            | Self::InvalidAlertType(_) => StatusCode::BAD_REQUEST,
            Self::Unauthorized(_) | Self::InvalidCredentials => StatusCode::UNAUTHORIZED,
            Self::RelayUnreachable { .. } => StatusCode::BAD_GATEWAY,
            Self::PersistenceError(_) | Self::StorageError(_) | Self::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Returns extra detail exposed to the client, if any.
    #[must_use]
    pub fn details(&self) -> Option<String> {
        match self {
            Self::RelayUnreachable { details, .. } => Some(details.clone()),
            _ => None,
        }
    }
}

impl From<JsonRejection> for GatewayError {
    fn from(rejection: JsonRejection) -> Self {
        Self::InvalidRequest(rejection.body_text())
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(code = self.error_code(), error = %self, "request failed");
        }
        let body = ErrorResponse {
            error: ErrorBody {
                code: self.error_code(),
                message: self.to_string(),
                details: self.details(),
            },
        };
        let mut response = axum::Json(body).into_response();
        *response.status_mut() = status;
        response
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn validation_errors_are_bad_request() {
        assert_eq!(
            GatewayError::MissingParameters.status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            GatewayError::PayloadTooLarge { limit: 10 }.status_code(),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn relay_failure_is_bad_gateway_with_details() {
        let err = GatewayError::RelayUnreachable {
            ip: "10.0.0.7".to_string(),
            details: "connection refused".to_string(),
        };
        assert_eq!(err.status_code(), StatusCode::BAD_GATEWAY);
        assert_eq!(err.error_code(), 3002);
        assert_eq!(err.details().as_deref(), Some("connection refused"));
    }

    #[tokio::test]
    async fn error_envelope_nests_code_and_message() {
        let response = GatewayError::MissingParameters.into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let Ok(bytes) = axum::body::to_bytes(response.into_body(), usize::MAX).await else {
            panic!("body read failed");
        };
        let Ok(body) = serde_json::from_slice::<serde_json::Value>(&bytes) else {
            panic!("body is not json");
        };
        assert_eq!(
            body,
            serde_json::json!({"error": {"code": 1002, "message": "missing parameters"}})
        );
    }

    #[test]
    fn credentials_error_hides_which_field_was_wrong() {
        let err = GatewayError::InvalidCredentials;
        assert_eq!(err.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(err.to_string(), "invalid username or password");
    }
}
