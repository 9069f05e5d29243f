//! Shared application state injected into all Axum handlers.

use std::sync::Arc;
use std::time::Duration;

use crate::config::GatewayConfig;
use crate::domain::EventBus;
use crate::error::GatewayError;
use crate::persistence::{ActivityLog, NotificationStore, PostgresPersistence};
use crate::service::{
    AuthService, CameraService, NotificationService, ObservationService, RelayService,
};

/// Shared application state available to all handlers via Axum's
/// `State` extractor.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Operator sign-in and token checks.
    pub auth_service: Arc<AuthService>,
    /// Relay command forwarding.
    pub relay_service: Arc<RelayService>,
    /// Notification intake and history.
    pub notification_service: Arc<NotificationService>,
    /// Operator observations.
    pub observation_service: Arc<ObservationService>,
    /// Camera catalogue.
    pub camera_service: Arc<CameraService>,
    /// Operator activity file, shared with the ingestion job.
    pub activity_log: Arc<ActivityLog>,
    /// Database handle, `None` when persistence is disabled.
    pub persistence: Option<PostgresPersistence>,
    /// Period between SSE keep-alive comments.
    pub sse_keepalive: Duration,
}

impl AppState {
    /// Wires every service from the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::Internal`] if the operator password cannot
    /// be hashed or the relay HTTP client cannot be built.
    pub fn from_config(
        config: &GatewayConfig,
        persistence: Option<PostgresPersistence>,
    ) -> Result<Self, GatewayError> {
        let activity_log = Arc::new(ActivityLog::new(config.activity_log_file.clone()));
        let event_bus = EventBus::new(config.event_bus_capacity);

        let auth_service = Arc::new(AuthService::from_config(config, Arc::clone(&activity_log))?);
        let relay_service = Arc::new(RelayService::new(
            config.relay_port,
            Duration::from_secs(config.relay_timeout_secs),
            Arc::clone(&activity_log),
        )?);
        let notification_service = Arc::new(NotificationService::new(
            NotificationStore::new(config.notifications_file.clone()),
            config.uploads_dir.clone(),
            config.max_upload_bytes,
            event_bus,
            Arc::clone(&activity_log),
        ));
        let observation_service = Arc::new(ObservationService::new(
            Arc::clone(&activity_log),
            persistence.clone(),
        ));
        let camera_service = Arc::new(CameraService::new(
            config.cameras_file.clone(),
            config.camera_stream_url.clone(),
        ));

        Ok(Self {
            auth_service,
            relay_service,
            notification_service,
            observation_service,
            camera_service,
            activity_log,
            persistence,
            sse_keepalive: Duration::from_secs(config.sse_keepalive_secs.max(1)),
        })
    }
}
