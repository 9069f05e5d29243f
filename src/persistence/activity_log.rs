//! Append-only operator activity file.
//!
//! Appends and the ingestion job share one async mutex: while an
//! [`ActivityLogGuard`] is alive no line can be written, so truncating after
//! a successful upload never drops an entry written in between.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tokio::io::AsyncWriteExt;
use tokio::sync::{Mutex, MutexGuard};

use crate::domain::{LogEntry, LogLevel};
use crate::error::GatewayError;

/// Handle to the activity log file.
#[derive(Debug)]
pub struct ActivityLog {
    path: PathBuf,
    lock: Mutex<()>,
}

/// Entries read back from the file.
#[derive(Debug, Default)]
pub struct ParsedLog {
    /// Successfully parsed entries, in file order.
    pub entries: Vec<LogEntry>,
    /// Non-empty lines that could not be parsed.
    pub skipped: usize,
}

/// Exclusive access to the file, held for the duration of an ingestion run.
#[derive(Debug)]
pub struct ActivityLogGuard<'a> {
    path: &'a Path,
    _guard: MutexGuard<'a, ()>,
}

impl ActivityLog {
    /// Creates a handle for the file at `path`. The file is created on the
    /// first append.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    /// Location of the file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Appends one entry as a single line.
    ///
    /// # Errors
    ///
    /// Returns a [`GatewayError::StorageError`] if the file cannot be
    /// opened or written.
    pub async fn append(&self, entry: &LogEntry) -> Result<(), GatewayError> {
        let _guard = self.lock.lock().await;
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| storage_error(&self.path, &e))?;
        }
        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await
            .map_err(|e| storage_error(&self.path, &e))?;
        let mut line = entry.to_line();
        line.push('\n');
        file.write_all(line.as_bytes())
            .await
            .map_err(|e| storage_error(&self.path, &e))?;
        file.flush().await.map_err(|e| storage_error(&self.path, &e))
    }

    /// Records an operator action. Write failures are logged, not returned.
    pub async fn record(&self, level: LogLevel, user: &str, action: &str) {
        let entry = LogEntry::now(level, user, action);
        tracing::info!(
            target: "activity",
            severity = %entry.level,
            user = %entry.user,
            action = %entry.action
        );
        if let Err(e) = self.append(&entry).await {
            tracing::warn!(error = %e, "failed to write activity log");
        }
    }

    /// Takes exclusive access to the file, blocking appends until the guard
    /// is dropped.
    pub async fn lock(&self) -> ActivityLogGuard<'_> {
        ActivityLogGuard {
            path: &self.path,
            _guard: self.lock.lock().await,
        }
    }
}

impl ActivityLogGuard<'_> {
    /// Reads and parses every line. A missing file yields no entries.
    ///
    /// # Errors
    ///
    /// Returns a [`GatewayError::StorageError`] if the file exists but
    /// cannot be read.
    pub async fn read_entries(&self) -> Result<ParsedLog, GatewayError> {
        let contents = match tokio::fs::read_to_string(self.path).await {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(ParsedLog::default()),
            Err(e) => return Err(storage_error(self.path, &e)),
        };

        let mut parsed = ParsedLog::default();
        for (index, line) in contents.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            match LogEntry::parse_line(line) {
                Ok(entry) => parsed.entries.push(entry),
                Err(e) => {
                    parsed.skipped = parsed.skipped.saturating_add(1);
                    tracing::warn!(
                        line = index.saturating_add(1),
                        error = %e,
                        "skipping activity log line"
                    );
                }
            }
        }
        Ok(parsed)
    }

    /// Empties the file. A missing file is left missing.
    ///
    /// # Errors
    ///
    /// Returns a [`GatewayError::StorageError`] if the file cannot be
    /// truncated.
    pub async fn truncate(&self) -> Result<(), GatewayError> {
        match tokio::fs::OpenOptions::new()
            .write(true)
            .truncate(true)
            .open(self.path)
            .await
        {
            Ok(_) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(storage_error(self.path, &e)),
        }
    }
}

fn storage_error(path: &Path, err: &std::io::Error) -> GatewayError {
    GatewayError::StorageError(format!("{}: {err}", path.display()))
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn appended_entries_read_back_in_order() {
        let Ok(dir) = tempfile::tempdir() else {
            panic!("tempdir failed");
        };
        let log = ActivityLog::new(dir.path().join("system_log.log"));
        log.record(LogLevel::Info, "admin", "signed in").await;
        log.record(LogLevel::Warning, "admin", "empty observation").await;

        let guard = log.lock().await;
        let Ok(parsed) = guard.read_entries().await else {
            panic!("read failed");
        };
        assert_eq!(parsed.entries.len(), 2);
        assert_eq!(parsed.skipped, 0);
        assert_eq!(parsed.entries.first().map(|e| e.action.as_str()), Some("signed in"));
        assert_eq!(parsed.entries.last().map(|e| e.level), Some(LogLevel::Warning));
    }

    #[tokio::test]
    async fn malformed_lines_are_counted_not_fatal() {
        let Ok(dir) = tempfile::tempdir() else {
            panic!("tempdir failed");
        };
        let path = dir.path().join("system_log.log");
        let contents = "2024-05-01 10:00:00,000 - INFO - admin - signed in\n\
                        garbage\n\
                        \n\
                        2024-05-01 10:00:01,000 - INFO - logs uploaded\n";
        let Ok(()) = tokio::fs::write(&path, contents).await else {
            panic!("write failed");
        };

        let log = ActivityLog::new(path);
        let guard = log.lock().await;
        let Ok(parsed) = guard.read_entries().await else {
            panic!("read failed");
        };
        assert_eq!(parsed.entries.len(), 1);
        assert_eq!(parsed.skipped, 2);
    }

    #[tokio::test]
    async fn missing_file_reads_empty_and_truncates_cleanly() {
        let Ok(dir) = tempfile::tempdir() else {
            panic!("tempdir failed");
        };
        let log = ActivityLog::new(dir.path().join("absent.log"));
        let guard = log.lock().await;
        let Ok(parsed) = guard.read_entries().await else {
            panic!("read failed");
        };
        assert!(parsed.entries.is_empty());
        assert!(guard.truncate().await.is_ok());
        assert!(!log.path().exists());
    }

    #[tokio::test]
    async fn truncate_empties_the_file() {
        let Ok(dir) = tempfile::tempdir() else {
            panic!("tempdir failed");
        };
        let log = ActivityLog::new(dir.path().join("system_log.log"));
        log.record(LogLevel::Info, "admin", "signed in").await;
        {
            let guard = log.lock().await;
            assert!(guard.truncate().await.is_ok());
        }
        let Ok(contents) = tokio::fs::read_to_string(log.path()).await else {
            panic!("read failed");
        };
        assert!(contents.is_empty());
    }
}
