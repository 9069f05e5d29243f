//! Domain layer: notifications, cameras, activity log entries and the
//! notification event bus.

pub mod camera;
pub mod event_bus;
pub mod log_entry;
pub mod notification;
pub mod notification_id;

pub use camera::Camera;
pub use event_bus::EventBus;
pub use log_entry::{LogEntry, LogLevel, LogParseError};
pub use notification::{AlertType, Notification};
pub use notification_id::NotificationId;
