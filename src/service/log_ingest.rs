//! Scheduled upload of the activity log file into the database.
//!
//! Each run holds the activity log lock, reads every line, inserts the
//! parsed entries in one batch and truncates the file. A failed insert
//! leaves the file untouched so the next run retries the same lines.
//! Unparsable lines are dropped at truncation time.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};

use crate::error::GatewayError;
use crate::persistence::{ActivityLog, LogSink};

/// Outcome of one ingestion run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IngestReport {
    /// Rows written to the sink.
    pub inserted: u64,
    /// Lines that could not be parsed.
    pub skipped: usize,
}

/// Runs a single ingestion pass.
///
/// # Errors
///
/// Returns the sink's error if the insert fails (the file is kept), or a
/// [`GatewayError::StorageError`] if the file cannot be read or truncated.
pub async fn ingest_once<S: LogSink>(
    log: &ActivityLog,
    sink: &S,
) -> Result<IngestReport, GatewayError> {
    let guard = log.lock().await;
    let parsed = guard.read_entries().await?;

    let inserted = if parsed.entries.is_empty() {
        0
    } else {
        sink.insert_entries(&parsed.entries).await?
    };

    guard.truncate().await?;
    Ok(IngestReport {
        inserted,
        skipped: parsed.skipped,
    })
}

/// Spawns the periodic ingestion task. The first run happens one `period`
/// after the call.
pub fn spawn_ingest_job<S>(log: Arc<ActivityLog>, sink: S, period: Duration) -> JoinHandle<()>
where
    S: LogSink + 'static,
{
    let period = period.max(Duration::from_secs(1));
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        tracing::info!(
            period_secs = period.as_secs(),
            file = %log.path().display(),
            "activity log ingestion scheduled"
        );

        loop {
            ticker.tick().await;
            match ingest_once(&log, &sink).await {
                Ok(report) => {
                    tracing::info!(
                        inserted = report.inserted,
                        skipped = report.skipped,
                        "activity log ingested"
                    );
                }
                Err(e) => {
                    tracing::error!(error = %e, "activity log ingestion failed, will retry");
                }
            }
        }
    })
}
