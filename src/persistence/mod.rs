//! Persistence layer: PostgreSQL activity log table, the JSON-file
//! notification store, the line-oriented activity log file and the camera
//! catalogue.
//!
//! Database writes go through the [`LogSink`] trait so the ingestion job can
//! run against any backing store. The concrete implementation uses
//! `sqlx::PgPool` for async PostgreSQL access.

pub mod activity_log;
pub mod camera_catalog;
#[cfg(test)]
pub(crate) mod memory;
pub mod notification_store;
pub mod postgres;

use std::future::Future;

use crate::domain::LogEntry;
use crate::error::GatewayError;

pub use activity_log::{ActivityLog, ActivityLogGuard, ParsedLog};
pub use notification_store::NotificationStore;
pub use postgres::PostgresPersistence;

/// Durable destination for activity log entries.
pub trait LogSink: Send + Sync {
    /// Inserts all entries atomically, returning the number of rows written.
    ///
    /// # Errors
    ///
    /// Returns a [`GatewayError::PersistenceError`] if nothing could be
    /// written. Implementations must not leave a partial batch behind.
    fn insert_entries(
        &self,
        entries: &[LogEntry],
    ) -> impl Future<Output = Result<u64, GatewayError>> + Send;
}
