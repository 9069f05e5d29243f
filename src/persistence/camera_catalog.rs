//! Camera catalogue read from a JSON file.

use std::io::ErrorKind;
use std::path::Path;

use crate::domain::Camera;
use crate::error::GatewayError;

/// Reads the camera list. A missing file means no cameras are configured.
///
/// # Errors
///
/// Returns a [`GatewayError::StorageError`] if the file cannot be read or
/// is not a JSON array of cameras.
pub async fn load_cameras(path: &Path) -> Result<Vec<Camera>, GatewayError> {
    let bytes = match tokio::fs::read(path).await {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => {
            return Err(GatewayError::StorageError(format!("{}: {e}", path.display())));
        }
    };
    serde_json::from_slice(&bytes)
        .map_err(|e| GatewayError::StorageError(format!("{}: {e}", path.display())))
}
