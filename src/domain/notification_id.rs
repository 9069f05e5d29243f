//! Type-safe notification identifier.
//!
//! [`NotificationId`] is a newtype wrapper around [`uuid::Uuid`] (v4). The
//! same value names the stored record and its uploaded image file.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Unique identifier for a visitor notification.
///
/// Generated once when a device posts a notification and immutable
/// thereafter. Clients use it to de-duplicate events replayed by the SSE
/// stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(transparent)]
pub struct NotificationId(uuid::Uuid);

impl NotificationId {
    /// Creates a new random `NotificationId` (UUID v4).
    #[must_use]
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4())
    }
}

impl Default for NotificationId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for NotificationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
