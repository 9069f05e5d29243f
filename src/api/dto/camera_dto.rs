//! Camera DTOs.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Response body for `GET /camera-stream-url`.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct StreamUrlResponse {
    /// Websocket URL of the live video relay.
    #[serde(rename = "wsUrl")]
    pub ws_url: String,
}
