//! Operator sign-in DTOs.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Request body for `POST /login`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct LoginRequest {
    /// Operator login name.
    #[serde(default)]
    pub username: String,
    /// Operator password.
    #[serde(default)]
    pub password: String,
}

/// Response body for a successful `POST /login`.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct LoginResponse {
    /// Bearer token for the `Authorization` header.
    pub token: String,
}
