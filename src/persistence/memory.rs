//! In-memory [`LogSink`] for tests.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::Mutex;

use super::LogSink;
use crate::domain::LogEntry;
use crate::error::GatewayError;

/// Collects inserted entries; can be switched into a failing state.
#[derive(Debug, Default)]
pub struct MemorySink {
    rows: Mutex<Vec<LogEntry>>,
    fail: AtomicBool,
}

impl MemorySink {
    /// A fresh, working sink.
    pub fn shared() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Makes every following insert fail (or succeed again).
    pub fn set_failing(&self, failing: bool) {
        self.fail.store(failing, Ordering::SeqCst);
    }

    /// Everything inserted so far.
    pub async fn rows(&self) -> Vec<LogEntry> {
        self.rows.lock().await.clone()
    }
}

impl LogSink for Arc<MemorySink> {
    async fn insert_entries(&self, entries: &[LogEntry]) -> Result<u64, GatewayError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(GatewayError::PersistenceError("database down".to_string()));
        }
        self.rows.lock().await.extend_from_slice(entries);
        Ok(entries.len() as u64)
    }
}
