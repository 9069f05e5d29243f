//! Notification intake: image upload, JSON store append and broadcast.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use axum::body::Bytes;
use tokio::sync::broadcast;

use crate::domain::{AlertType, EventBus, LogLevel, Notification, NotificationId};
use crate::error::GatewayError;
use crate::persistence::{ActivityLog, NotificationStore};

/// URL prefix under which the uploads directory is served.
pub const UPLOADS_URL_PREFIX: &str = "uploads";

const DEFAULT_IMAGE_EXTENSION: &str = ".jpg";
const MAX_EXTENSION_LEN: usize = 5;

/// Photo attached to a notification.
#[derive(Debug, Clone)]
pub struct UploadedImage {
    /// File name reported by the device, used only for its extension.
    pub file_name: Option<String>,
    /// Raw image bytes.
    pub bytes: Bytes,
}

/// Notification fields as posted by a device.
#[derive(Debug, Clone, Default)]
pub struct NewNotification {
    /// Visitor or device name.
    pub name: Option<String>,
    /// Device-side event time.
    pub time: Option<String>,
    /// Message text.
    pub message: Option<String>,
    /// Event location.
    pub location: Option<String>,
    /// Severity.
    pub alert_type: AlertType,
    /// Optional photo.
    pub image: Option<UploadedImage>,
}

/// Accepts, stores and broadcasts visitor notifications.
#[derive(Debug)]
pub struct NotificationService {
    store: NotificationStore,
    uploads_dir: PathBuf,
    max_upload_bytes: usize,
    event_bus: EventBus,
    activity_log: Arc<ActivityLog>,
}

impl NotificationService {
    /// Creates a new `NotificationService`.
    #[must_use]
    pub fn new(
        store: NotificationStore,
        uploads_dir: impl Into<PathBuf>,
        max_upload_bytes: usize,
        event_bus: EventBus,
        activity_log: Arc<ActivityLog>,
    ) -> Self {
        Self {
            store,
            uploads_dir: uploads_dir.into(),
            max_upload_bytes,
            event_bus,
            activity_log,
        }
    }

    /// Largest accepted image in bytes.
    #[must_use]
    pub const fn max_upload_bytes(&self) -> usize {
        self.max_upload_bytes
    }


    /// Stores a new notification and pushes it to live subscribers.
    ///
    /// The image, if any, is written first; if the store append then fails
    /// the image is removed again.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::PayloadTooLarge`] if the image exceeds the
    /// limit, or a [`GatewayError::StorageError`] if the image or the
    /// notification list cannot be written.
    pub async fn create(&self, new: NewNotification) -> Result<Notification, GatewayError> {
        let id = NotificationId::new();

        let saved_image = match new.image.filter(|img| !img.bytes.is_empty()) {
            Some(image) => Some(self.save_image(id, &image).await?),
            None => None,
        };

        let notification = Notification {
            id,
            name: new.name,
            time: new.time,
            message: new.message,
            location: new.location,
            image: saved_image.as_ref().map(|(url, _)| url.clone()),
            alert_type: new.alert_type,
        };

        if let Err(e) = self.store.append(notification.clone()).await {
            if let Some((_, path)) = &saved_image
                && let Err(rm) = tokio::fs::remove_file(path).await
            {
                tracing::warn!(
                    path = %path.display(),
                    error = %rm,
                    "failed to remove orphaned image"
                );
            }
            return Err(e);
        }

        let receivers = self.event_bus.publish(notification.clone());
        tracing::info!(
            %id,
            alert_type = %notification.alert_type,
            has_image = notification.image.is_some(),
            receivers,
            "notification received"
        );

        let source = notification.name.as_deref().unwrap_or("device");
        self.activity_log
            .record(
                LogLevel::Info,
                source,
                &format!(
                    "posted {} notification {id}: {}",
                    notification.alert_type,
                    notification.message.as_deref().unwrap_or("")
                ),
            )
            .await;

        Ok(notification)
    }

    /// Returns every stored notification in arrival order.
    ///
    /// # Errors
    ///
    /// Returns a [`GatewayError::StorageError`] if the store is unreadable.
    pub async fn list(&self) -> Result<Vec<Notification>, GatewayError> {
        self.store.load_all().await
    }

    /// Subscribes to notifications created from now on.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<Notification> {
        self.event_bus.subscribe()
    }

    /// Writes the image and returns its public URL path and file path.
    async fn save_image(
        &self,
        id: NotificationId,
        image: &UploadedImage,
    ) -> Result<(String, PathBuf), GatewayError> {
        if image.bytes.len() > self.max_upload_bytes {
            return Err(GatewayError::PayloadTooLarge {
                limit: self.max_upload_bytes,
            });
        }

        let file_name = format!("{id}{}", image_extension(image.file_name.as_deref()));
        let path = self.uploads_dir.join(&file_name);

        tokio::fs::create_dir_all(&self.uploads_dir)
            .await
            .map_err(|e| {
                GatewayError::StorageError(format!("{}: {e}", self.uploads_dir.display()))
            })?;
        tokio::fs::write(&path, &image.bytes)
            .await
            .map_err(|e| GatewayError::StorageError(format!("{}: {e}", path.display())))?;

        Ok((format!("{UPLOADS_URL_PREFIX}/{file_name}"), path))
    }
}

/// Picks the stored file extension from the uploaded file name: lower-case,
/// alphanumeric, at most five characters, `.jpg` otherwise.
#[must_use]
pub fn image_extension(file_name: Option<&str>) -> String {
    file_name
        .and_then(|name| Path::new(name).extension())
        .and_then(|ext| ext.to_str())
        .filter(|ext| {
            !ext.is_empty()
                && ext.len() <= MAX_EXTENSION_LEN
                && ext.chars().all(|c| c.is_ascii_alphanumeric())
        })
        .map_or_else(
            || DEFAULT_IMAGE_EXTENSION.to_string(),
            |ext| format!(".{}", ext.to_ascii_lowercase()),
        )
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    fn make_service(dir: &Path, max_upload_bytes: usize) -> NotificationService {
        NotificationService::new(
            NotificationStore::new(dir.join("notifications.json")),
            dir.join("uploads"),
            max_upload_bytes,
            EventBus::new(16),
            Arc::new(ActivityLog::new(dir.join("system_log.log"))),
        )
    }

    fn with_image(file_name: &str, bytes: &'static [u8]) -> NewNotification {
        NewNotification {
            name: Some("Doorbell".to_string()),
            message: Some("Visitor".to_string()),
            alert_type: AlertType::Warning,
            image: Some(UploadedImage {
                file_name: Some(file_name.to_string()),
                bytes: Bytes::from_static(bytes),
            }),
            ..NewNotification::default()
        }
    }

    #[test]
    fn extension_rules() {
        assert_eq!(image_extension(Some("snap.PNG")), ".png");
        assert_eq!(image_extension(Some("snap")), ".jpg");
        assert_eq!(image_extension(None), ".jpg");
        assert_eq!(image_extension(Some("x.toolongext")), ".jpg");
        assert_eq!(image_extension(Some("x.j$g")), ".jpg");
    }

    #[tokio::test]
    async fn create_saves_image_and_publishes() {
        let Ok(dir) = tempfile::tempdir() else {
            panic!("tempdir failed");
        };
        let service = make_service(dir.path(), 1024);
        let mut rx = service.subscribe();

        let Ok(created) = service.create(with_image("door.png", b"\x89PNG")).await else {
            panic!("create failed");
        };
        let expected_url = format!("uploads/{}.png", created.id);
        assert_eq!(created.image.as_deref(), Some(expected_url.as_str()));
        assert!(dir.path().join(format!("uploads/{}.png", created.id)).exists());

        let Ok(event) = rx.recv().await else {
            panic!("no broadcast");
        };
        assert_eq!(event, created);

        let Ok(all) = service.list().await else {
            panic!("list failed");
        };
        assert_eq!(all, vec![created]);
    }

    #[tokio::test]
    async fn oversized_image_is_rejected_without_side_effects() {
        let Ok(dir) = tempfile::tempdir() else {
            panic!("tempdir failed");
        };
        let service = make_service(dir.path(), 4);
        let result = service.create(with_image("big.jpg", b"12345")).await;
        assert!(matches!(result, Err(GatewayError::PayloadTooLarge { limit: 4 })));
        assert_eq!(service.list().await.ok().map(|v| v.len()), Some(0));
        assert!(!dir.path().join("uploads").exists());
    }

    #[tokio::test]
    async fn empty_file_field_means_no_image() {
        let Ok(dir) = tempfile::tempdir() else {
            panic!("tempdir failed");
        };
        let service = make_service(dir.path(), 1024);
        let Ok(created) = service.create(with_image("", b"")).await else {
            panic!("create failed");
        };
        assert!(created.image.is_none());
    }
}
