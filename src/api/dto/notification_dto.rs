//! Notification intake DTOs.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::NotificationId;

/// Multipart form accepted by `POST /notify`. Documentation only; the
/// handler reads the fields from the multipart stream.
#[derive(Debug, ToSchema)]
pub struct NotifyForm {
    /// Visitor or device name.
    pub name: Option<String>,
    /// Device-side event time.
    pub time: Option<String>,
    /// Message text.
    pub message: Option<String>,
    /// Event location.
    pub location: Option<String>,
    /// `info` (default), `warning` or `emergency`.
    pub alert_type: Option<String>,
    /// Optional photo.
    #[schema(format = Binary)]
    pub image: Option<String>,
}

/// Response body for a successful `POST /notify`.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct NotifyResponse {
    /// Always `"success"`.
    pub status: String,
    /// Identifier of the stored notification.
    pub id: NotificationId,
}
