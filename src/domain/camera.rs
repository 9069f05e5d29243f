//! Camera catalogue entries shown on the dashboard grid.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// A camera with its relay microcontroller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Camera {
    /// Dashboard-local identifier.
    pub id: u32,
    /// Display name.
    pub name: String,
    /// Address of the camera's microcontroller, as the UI passes it back to
    /// `POST /control-relay`.
    pub ip: String,
}
