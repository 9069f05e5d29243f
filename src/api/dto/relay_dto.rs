//! Relay control DTOs.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Request body for `POST /control-relay`.
///
/// Every field is optional at the serde level so a missing one maps to
/// `400 missing parameters` rather than a JSON rejection.
#[derive(Debug, Deserialize, ToSchema)]
pub struct RelayRequest {
    /// Host name or IPv4 address of the camera's microcontroller.
    #[serde(default)]
    pub ip: Option<String>,
    /// Relay index on the controller.
    #[serde(default)]
    pub relay: Option<u32>,
    /// Target state.
    #[serde(default)]
    pub state: Option<u32>,
}

/// Response body after the controller accepted a command.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct RelayResponse {
    /// Always `"success"`.
    pub status: String,
    /// Body returned by the controller.
    pub message: String,
}
