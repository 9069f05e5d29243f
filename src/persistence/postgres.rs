//! PostgreSQL implementation of the persistence layer.

use std::time::Duration;

use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;

use super::LogSink;
use crate::config::GatewayConfig;
use crate::domain::LogEntry;
use crate::error::GatewayError;

/// PostgreSQL-backed persistence layer using `sqlx::PgPool`.
#[derive(Debug, Clone)]
pub struct PostgresPersistence {
    pool: PgPool,
}

impl PostgresPersistence {
    /// Creates a new persistence layer with the given connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Builds a lazily connecting pool from the configuration.
    ///
    /// No connection is attempted until the first query, so the gateway
    /// starts even when the database is down.
    ///
    /// # Errors
    ///
    /// Returns a [`GatewayError::PersistenceError`] if `DATABASE_URL` is
    /// not a valid connection string.
    pub fn connect_lazy(config: &GatewayConfig) -> Result<Self, GatewayError> {
        let pool = PgPoolOptions::new()
            .max_connections(config.database_max_connections)
            .min_connections(config.database_min_connections)
            .acquire_timeout(Duration::from_secs(config.database_connect_timeout_secs))
            .connect_lazy(&config.database_url)
            .map_err(|e| GatewayError::PersistenceError(e.to_string()))?;
        Ok(Self::new(pool))
    }

    /// Applies the embedded schema migrations.
    ///
    /// # Errors
    ///
    /// Returns a [`GatewayError::PersistenceError`] if the database is
    /// unreachable or a migration fails.
    pub async fn migrate(&self) -> Result<(), GatewayError> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| GatewayError::PersistenceError(e.to_string()))
    }

    /// Inserts a batch of entries in one transaction.
    ///
    /// # Errors
    ///
    /// Returns a [`GatewayError::PersistenceError`] on database failure;
    /// the transaction is rolled back and no row is kept.
    pub async fn save_entries(&self, entries: &[LogEntry]) -> Result<u64, GatewayError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| GatewayError::PersistenceError(e.to_string()))?;

        let mut inserted = 0u64;
        for entry in entries {
            let result = sqlx::query(
                "INSERT INTO activity_logs (logged_at, log_level, username, action) \
                 VALUES ($1, $2, $3, $4)",
            )
            .bind(entry.logged_at)
            .bind(entry.level.as_str())
            .bind(&entry.user)
            .bind(&entry.action)
            .execute(&mut *tx)
            .await
            .map_err(|e| GatewayError::PersistenceError(e.to_string()))?;
            inserted = inserted.saturating_add(result.rows_affected());
        }

        tx.commit()
            .await
            .map_err(|e| GatewayError::PersistenceError(e.to_string()))?;
        Ok(inserted)
    }

    /// Returns `true` if the database answers a trivial query.
    pub async fn is_reachable(&self) -> bool {
        sqlx::query("SELECT 1").execute(&self.pool).await.is_ok()
    }
}

impl LogSink for PostgresPersistence {
    async fn insert_entries(&self, entries: &[LogEntry]) -> Result<u64, GatewayError> {
        self.save_entries(entries).await
    }
}
