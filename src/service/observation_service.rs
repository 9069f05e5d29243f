//! Free-text operator observations.

use std::sync::Arc;

use crate::domain::{LogEntry, LogLevel};
use crate::error::GatewayError;
use crate::persistence::{ActivityLog, LogSink, PostgresPersistence};

/// Where an observation ended up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObservationSink {
    /// Inserted straight into the database.
    Database,
    /// Appended to the activity file; reaches the database at the next
    /// ingestion run.
    ActivityFile,
}

/// Records operator observations, each producing exactly one log row.
#[derive(Debug)]
pub struct ObservationService<S = PostgresPersistence> {
    activity_log: Arc<ActivityLog>,
    persistence: Option<S>,
}

impl<S: LogSink> ObservationService<S> {
    /// Creates a new `ObservationService`. Without `persistence`, every
    /// observation goes to the activity file.
    #[must_use]
    pub fn new(activity_log: Arc<ActivityLog>, persistence: Option<S>) -> Self {
        Self {
            activity_log,
            persistence,
        }
    }

    /// Records `observation` for `user`.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::EmptyObservation`] if the text is missing or
    /// blank, or a [`GatewayError::StorageError`] if neither the database
    /// nor the activity file accepted the entry.
    pub async fn record(
        &self,
        user: &str,
        observation: Option<&str>,
    ) -> Result<ObservationSink, GatewayError> {
        let Some(text) = observation.map(str::trim).filter(|t| !t.is_empty()) else {
            tracing::warn!(user, "empty observation rejected");
            self.activity_log
                .record(LogLevel::Warning, user, "tried to save an empty observation")
                .await;
            return Err(GatewayError::EmptyObservation);
        };

        let entry = LogEntry::now(LogLevel::Info, user, &format!("recorded observation: {text}"));

        if let Some(db) = &self.persistence {
            match db.insert_entries(std::slice::from_ref(&entry)).await {
                Ok(rows) => {
                    tracing::info!(user, rows, "observation stored");
                    return Ok(ObservationSink::Database);
                }
                Err(e) => {
                    tracing::warn!(user, error = %e, "database unavailable, queueing observation");
                }
            }
        }

        self.activity_log.append(&entry).await?;
        tracing::info!(user, "observation queued for ingestion");
        Ok(ObservationSink::ActivityFile)
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::persistence::memory::MemorySink;

    async fn file_entries(log: &ActivityLog) -> Vec<LogEntry> {
        let guard = log.lock().await;
        let Ok(parsed) = guard.read_entries().await else {
            panic!("read failed");
        };
        parsed.entries
    }

    #[tokio::test]
    async fn reachable_database_takes_the_observation() {
        let Ok(dir) = tempfile::tempdir() else {
            panic!("tempdir failed");
        };
        let log = Arc::new(ActivityLog::new(dir.path().join("system_log.log")));
        let sink = MemorySink::shared();
        let service = ObservationService::new(Arc::clone(&log), Some(Arc::clone(&sink)));

        let stored = service.record("admin", Some("gate left open")).await;
        assert_eq!(stored.ok(), Some(ObservationSink::Database));

        let rows = sink.rows().await;
        assert_eq!(rows.len(), 1);
        assert_eq!(
            rows.first().map(|e| e.action.as_str()),
            Some("recorded observation: gate left open")
        );
        assert!(file_entries(&log).await.is_empty());
    }

    #[tokio::test]
    async fn failing_database_falls_back_to_activity_file() {
        let Ok(dir) = tempfile::tempdir() else {
            panic!("tempdir failed");
        };
        let log = Arc::new(ActivityLog::new(dir.path().join("system_log.log")));
        let sink = MemorySink::shared();
        sink.set_failing(true);
        let service = ObservationService::new(Arc::clone(&log), Some(Arc::clone(&sink)));

        let stored = service.record("admin", Some("dog barking")).await;
        assert_eq!(stored.ok(), Some(ObservationSink::ActivityFile));
        assert!(sink.rows().await.is_empty());

        let entries = file_entries(&log).await;
        assert_eq!(entries.len(), 1);
        assert_eq!(
            entries.first().map(|e| e.action.as_str()),
            Some("recorded observation: dog barking")
        );
    }

    #[tokio::test]
    async fn without_database_observation_lands_in_activity_file() {
        let Ok(dir) = tempfile::tempdir() else {
            panic!("tempdir failed");
        };
        let log = Arc::new(ActivityLog::new(dir.path().join("system_log.log")));
        let service: ObservationService = ObservationService::new(Arc::clone(&log), None);

        let sink = service.record("admin", Some("  courier left a parcel  ")).await;
        assert_eq!(sink.ok(), Some(ObservationSink::ActivityFile));

        let guard = log.lock().await;
        let Ok(parsed) = guard.read_entries().await else {
            panic!("read failed");
        };
        assert_eq!(parsed.entries.len(), 1);
        assert_eq!(
            parsed.entries.first().map(|e| e.action.as_str()),
            Some("recorded observation: courier left a parcel")
        );
    }

    #[tokio::test]
    async fn blank_observation_is_rejected_and_audited() {
        let Ok(dir) = tempfile::tempdir() else {
            panic!("tempdir failed");
        };
        let log = Arc::new(ActivityLog::new(dir.path().join("system_log.log")));
        let service: ObservationService = ObservationService::new(Arc::clone(&log), None);

        assert!(matches!(
            service.record("admin", Some("   ")).await,
            Err(GatewayError::EmptyObservation)
        ));
        assert!(matches!(
            service.record("admin", None).await,
            Err(GatewayError::EmptyObservation)
        ));

        let guard = log.lock().await;
        let Ok(parsed) = guard.read_entries().await else {
            panic!("read failed");
        };
        assert_eq!(parsed.entries.len(), 2);
        assert!(parsed.entries.iter().all(|e| e.level == LogLevel::Warning));
    }
}
