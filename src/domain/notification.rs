//! Visitor notifications posted by doorbell and camera devices.
//!
//! A [`Notification`] is appended to the JSON store, broadcast through the
//! [`super::EventBus`] and replayed to every SSE client.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};
use utoipa::ToSchema;

use super::NotificationId;
use crate::error::GatewayError;

/// Severity the dashboard uses to pick the toast style.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum AlertType {
    /// Routine event (doorbell ring, motion).
    #[default]
    Info,
    /// Needs the operator's attention.
    Warning,
    /// Requires immediate action.
    Emergency,
}

impl AlertType {
    /// Returns the wire name of the alert type.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Info => "info",
            Self::Warning => "warning",
            Self::Emergency => "emergency",
        }
    }
}

impl fmt::Display for AlertType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AlertType {
    type Err = GatewayError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "" | "info" => Ok(Self::Info),
            "warning" => Ok(Self::Warning),
            "emergency" => Ok(Self::Emergency),
            other => Err(GatewayError::InvalidAlertType(other.to_string())),
        }
    }
}

/// A stored visitor notification.
///
/// Field names and `null` handling match the JSON file written to disk, so
/// the record is serialized as-is for both the store and the SSE stream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Notification {
    /// Unique identifier; also the stem of the image file name.
    pub id: NotificationId,
    /// Visitor or device name reported by the device.
    pub name: Option<String>,
    /// Device-side time of the event, passed through verbatim.
    pub time: Option<String>,
    /// Free-text message shown in the toast.
    pub message: Option<String>,
    /// Where the event happened (e.g. `"front gate"`).
    pub location: Option<String>,
    /// Relative URL of the uploaded photo (`uploads/<file>`), if any.
    pub image: Option<String>,
    /// Severity. Stored values outside the known set read back as `info`.
    #[serde(default, deserialize_with = "lenient_alert_type")]
    pub alert_type: AlertType,
}

fn lenient_alert_type<'de, D>(deserializer: D) -> Result<AlertType, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw
        .as_deref()
        .and_then(|s| s.parse().ok())
        .unwrap_or_default())
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn alert_type_parses_case_insensitively() {
        assert_eq!("WARNING".parse::<AlertType>().ok(), Some(AlertType::Warning));
        assert_eq!(" emergency ".parse::<AlertType>().ok(), Some(AlertType::Emergency));
        assert_eq!("".parse::<AlertType>().ok(), Some(AlertType::Info));
    }

    #[test]
    fn unknown_alert_type_is_rejected() {
        let Err(err) = "panic".parse::<AlertType>() else {
            panic!("expected an error");
        };
        assert_eq!(err.error_code(), 1005);
    }

    #[test]
    fn missing_fields_serialize_as_null() {
        let notification = Notification {
            id: NotificationId::new(),
            name: Some("Front door".to_string()),
            time: None,
            message: Some("Someone rang".to_string()),
            location: None,
            image: None,
            alert_type: AlertType::Warning,
        };
        let Ok(value) = serde_json::to_value(&notification) else {
            panic!("serialization failed");
        };
        assert_eq!(value["alert_type"], "warning");
        assert!(value["image"].is_null());
        assert!(value["time"].is_null());
    }

    #[test]
    fn legacy_record_without_alert_type_defaults_to_info() {
        let json = format!(
            r#"{{"id":"{}","name":null,"time":null,"message":"hi","location":null,"image":null}}"#,
            uuid::Uuid::new_v4()
        );
        let Ok(parsed) = serde_json::from_str::<Notification>(&json) else {
            panic!("deserialization failed");
        };
        assert_eq!(parsed.alert_type, AlertType::Info);
    }

    #[test]
    fn stored_unknown_or_null_alert_type_reads_as_info() {
        for raw in [r#""alert""#, "null", r#""WARNING""#] {
            let json = format!(
                r#"{{"id":"{}","name":"x","time":null,"message":null,"location":null,"image":null,"alert_type":{raw}}}"#,
                uuid::Uuid::new_v4()
            );
            let Ok(parsed) = serde_json::from_str::<Notification>(&json) else {
                panic!("deserialization failed for {raw}");
            };
            let expected = if raw == r#""WARNING""# {
                AlertType::Warning
            } else {
                AlertType::Info
            };
            assert_eq!(parsed.alert_type, expected);
        }
    }
}
