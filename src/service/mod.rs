//! Service layer: orchestration between the HTTP handlers, the stores and
//! the activity log.

pub mod auth_service;
pub mod camera_service;
pub mod log_ingest;
pub mod notification_service;
pub mod observation_service;
pub mod relay_service;

pub use auth_service::AuthService;
pub use camera_service::CameraService;
pub use notification_service::{NewNotification, NotificationService, UploadedImage};
pub use observation_service::{ObservationService, ObservationSink};
pub use relay_service::{RelayCommand, RelayReply, RelayService};
