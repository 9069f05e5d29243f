//! Camera catalogue and live stream endpoint lookup.

use std::path::PathBuf;

use crate::domain::Camera;
use crate::error::GatewayError;
use crate::persistence::camera_catalog;

/// Serves the configured camera list.
#[derive(Debug, Clone)]
pub struct CameraService {
    cameras_file: PathBuf,
    stream_url: String,
}

impl CameraService {
    /// Creates a service reading `cameras_file` on every request.
    #[must_use]
    pub fn new(cameras_file: impl Into<PathBuf>, stream_url: impl Into<String>) -> Self {
        Self {
            cameras_file: cameras_file.into(),
            stream_url: stream_url.into(),
        }
    }

    /// Returns the current camera list.
    ///
    /// # Errors
    ///
    /// Returns a [`GatewayError::StorageError`] if the catalogue file is
    /// unreadable or invalid.
    pub async fn list(&self) -> Result<Vec<Camera>, GatewayError> {
        camera_catalog::load_cameras(&self.cameras_file).await
    }

    /// Websocket URL of the live video relay.
    #[must_use]
    pub fn stream_url(&self) -> &str {
        &self.stream_url
    }
}
