//! JSON-file notification store.
//!
//! The whole list lives in one pretty-printed JSON array. Every insert
//! rewrites the file through a temporary sibling and an atomic rename, and
//! inserts are serialized by an async mutex so concurrent device posts
//! cannot lose each other's records.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde_json::ser::{PrettyFormatter, Serializer};
use tokio::sync::Mutex;

use crate::domain::Notification;
use crate::error::GatewayError;

/// File-backed list of every received notification.
#[derive(Debug)]
pub struct NotificationStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl NotificationStore {
    /// Creates a store backed by the file at `path`. The file is created on
    /// the first insert.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    /// Location of the backing file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns all stored notifications in insertion order.
    ///
    /// A missing or blank file is an empty list.
    ///
    /// # Errors
    ///
    /// Returns a [`GatewayError::StorageError`] if the file cannot be read
    /// or does not contain a JSON array of notifications.
    pub async fn load_all(&self) -> Result<Vec<Notification>, GatewayError> {
        read_list(&self.path).await
    }

    /// Appends a notification and rewrites the file. Returns the new number
    /// of stored notifications.
    ///
    /// A corrupt file is never overwritten.
    ///
    /// # Errors
    ///
    /// Returns a [`GatewayError::StorageError`] if the existing file is
    /// unreadable or corrupt, or the new contents cannot be written.
    pub async fn append(&self, notification: Notification) -> Result<usize, GatewayError> {
        let _guard = self.write_lock.lock().await;
        let mut all = read_list(&self.path).await?;
        all.push(notification);
        write_list(&self.path, &all).await?;
        Ok(all.len())
    }
}

async fn read_list(path: &Path) -> Result<Vec<Notification>, GatewayError> {
    let bytes = match tokio::fs::read(path).await {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(storage_error(path, &e)),
    };
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(Vec::new());
    }
    serde_json::from_slice(&bytes).map_err(|e| {
        GatewayError::StorageError(format!("{} is not a notification list: {e}", path.display()))
    })
}

async fn write_list(path: &Path, all: &[Notification]) -> Result<(), GatewayError> {
    let mut buf = Vec::new();
    let formatter = PrettyFormatter::with_indent(b"    ");
    let mut serializer = Serializer::with_formatter(&mut buf, formatter);
    all.serialize(&mut serializer)
        .map_err(|e| GatewayError::Internal(format!("failed to encode notifications: {e}")))?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| storage_error(parent, &e))?;
    }

    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);
    tokio::fs::write(&tmp, &buf)
        .await
        .map_err(|e| storage_error(&tmp, &e))?;
    tokio::fs::rename(&tmp, path)
        .await
        .map_err(|e| storage_error(path, &e))
}

fn storage_error(path: &Path, err: &std::io::Error) -> GatewayError {
    GatewayError::StorageError(format!("{}: {err}", path.display()))
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::domain::{AlertType, NotificationId};

    fn sample(message: &str) -> Notification {
        Notification {
            id: NotificationId::new(),
            name: Some("Doorbell".to_string()),
            time: Some("2024-05-01T10:00:00".to_string()),
            message: Some(message.to_string()),
            location: Some("front door".to_string()),
            image: None,
            alert_type: AlertType::Info,
        }
    }

    #[tokio::test]
    async fn missing_and_blank_files_are_empty() {
        let Ok(dir) = tempfile::tempdir() else {
            panic!("tempdir failed");
        };
        let store = NotificationStore::new(dir.path().join("notifications.json"));
        assert_eq!(store.load_all().await.ok().map(|v| v.len()), Some(0));

        let Ok(()) = tokio::fs::write(store.path(), "  \n").await else {
            panic!("write failed");
        };
        assert_eq!(store.load_all().await.ok().map(|v| v.len()), Some(0));
    }

    #[tokio::test]
    async fn append_preserves_order_and_indents_four_spaces() {
        let Ok(dir) = tempfile::tempdir() else {
            panic!("tempdir failed");
        };
        let store = NotificationStore::new(dir.path().join("notifications.json"));
        let first = sample("first");
        let second = sample("second");
        assert_eq!(store.append(first.clone()).await.ok(), Some(1));
        assert_eq!(store.append(second.clone()).await.ok(), Some(2));

        let Ok(all) = store.load_all().await else {
            panic!("load failed");
        };
        assert_eq!(all, vec![first, second]);

        let Ok(raw) = tokio::fs::read_to_string(store.path()).await else {
            panic!("read failed");
        };
        assert!(raw.starts_with("[\n    {\n        \"id\""));
    }

    #[tokio::test]
    async fn corrupt_file_is_reported_and_left_untouched() {
        let Ok(dir) = tempfile::tempdir() else {
            panic!("tempdir failed");
        };
        let store = NotificationStore::new(dir.path().join("notifications.json"));
        let Ok(()) = tokio::fs::write(store.path(), "{not json").await else {
            panic!("write failed");
        };

        let Err(err) = store.append(sample("lost?")).await else {
            panic!("append over a corrupt file succeeded");
        };
        assert_eq!(err.error_code(), 3003);

        let Ok(raw) = tokio::fs::read_to_string(store.path()).await else {
            panic!("read failed");
        };
        assert_eq!(raw, "{not json");
    }

    #[tokio::test]
    async fn legacy_file_with_free_form_alert_type_stays_usable() {
        let Ok(dir) = tempfile::tempdir() else {
            panic!("tempdir failed");
        };
        let store = NotificationStore::new(dir.path().join("notifications.json"));
        let legacy = r#"[
    {
        "id": "6f1c2a9e-3b7d-4c1e-9a55-0d2f8e4b7c10",
        "name": "x",
        "time": "2024-05-01T10:00:00",
        "message": "gate",
        "location": "front",
        "image": null,
        "alert_type": "alert"
    }
]"#;
        let Ok(()) = tokio::fs::write(store.path(), legacy).await else {
            panic!("write failed");
        };

        let Ok(all) = store.load_all().await else {
            panic!("legacy file rejected");
        };
        assert_eq!(all.first().map(|n| n.alert_type), Some(AlertType::Info));
        assert_eq!(store.append(sample("next")).await.ok(), Some(2));
    }

    #[tokio::test]
    async fn concurrent_appends_keep_every_record() {
        let Ok(dir) = tempfile::tempdir() else {
            panic!("tempdir failed");
        };
        let store = Arc::new(NotificationStore::new(dir.path().join("notifications.json")));

        let mut handles = Vec::new();
        for i in 0..16 {
            let store = Arc::clone(&store);
            handles.push(tokio::spawn(async move {
                store.append(sample(&format!("visitor {i}"))).await
            }));
        }
        for handle in handles {
            let Ok(Ok(_)) = handle.await else {
                panic!("append failed");
            };
        }

        assert_eq!(store.load_all().await.ok().map(|v| v.len()), Some(16));
    }
}
