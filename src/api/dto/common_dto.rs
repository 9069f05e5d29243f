//! Shared DTO types used across multiple endpoints.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Plain acknowledgement body: `{"status": "success"}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct StatusResponse {
    /// Always `"success"`.
    pub status: String,
}

impl StatusResponse {
    /// The success acknowledgement.
    #[must_use]
    pub fn success() -> Self {
        Self {
            status: SUCCESS.to_string(),
        }
    }
}

/// Value of the `status` field on every successful acknowledgement.
pub const SUCCESS: &str = "success";
