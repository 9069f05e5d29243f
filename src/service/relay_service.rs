//! Relay command forwarding to the camera microcontrollers.
//!
//! Each camera has a small HTTP server on `RELAY_PORT` that switches its
//! relays. The gateway validates the target host, forwards the command and
//! relays the controller's answer back to the dashboard.

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;

use crate::domain::LogLevel;
use crate::error::GatewayError;
use crate::persistence::ActivityLog;

/// Body sent to the microcontroller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RelayCommand {
    /// Zero-based relay index on the controller.
    pub relay: u32,
    /// Target state as understood by the controller firmware.
    pub state: u32,
}

/// Successful controller answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelayReply {
    /// HTTP status returned by the controller.
    pub status: u16,
    /// Raw response body.
    pub body: String,
}

/// Forwards relay commands over HTTP.
#[derive(Debug)]
pub struct RelayService {
    http: reqwest::Client,
    port: u16,
    activity_log: Arc<ActivityLog>,
}

impl RelayService {
    /// Creates a forwarder targeting `port` on each controller, with a
    /// per-request `timeout`.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::Internal`] if the HTTP client cannot be
    /// built.
    pub fn new(
        port: u16,
        timeout: Duration,
        activity_log: Arc<ActivityLog>,
    ) -> Result<Self, GatewayError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| GatewayError::Internal(format!("failed to build http client: {e}")))?;
        Ok(Self {
            http,
            port,
            activity_log,
        })
    }

    /// URL of the relay endpoint on the controller at `host`.
    #[must_use]
    pub fn relay_url(&self, host: &str) -> String {
        format!("http://{host}:{}/control-relay", self.port)
    }

    /// Sends `command` to the controller at `host` on behalf of `user`.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::InvalidRequest`] if `host` is not a bare
    /// host name or IPv4 address, and [`GatewayError::RelayUnreachable`]
    /// if the controller cannot be reached or answers with a non-2xx
    /// status.
    pub async fn forward(
        &self,
        user: &str,
        host: &str,
        command: RelayCommand,
    ) -> Result<RelayReply, GatewayError> {
        validate_host(host)?;
        let url = self.relay_url(host);

        match self.send(&url, command).await {
            Ok(reply) => {
                tracing::info!(
                    host,
                    relay = command.relay,
                    state = command.state,
                    status = reply.status,
                    "relay command forwarded"
                );
                self.activity_log
                    .record(
                        LogLevel::Info,
                        user,
                        &format!(
                            "set relay {} on {host} to {} (controller answered {})",
                            command.relay, command.state, reply.status
                        ),
                    )
                    .await;
                Ok(reply)
            }
            Err(details) => {
                tracing::error!(
                    host,
                    relay = command.relay,
                    error = %details,
                    "relay command failed"
                );
                self.activity_log
                    .record(
                        LogLevel::Error,
                        user,
                        &format!("relay {} on {host} failed: {details}", command.relay),
                    )
                    .await;
                Err(GatewayError::RelayUnreachable {
                    ip: host.to_string(),
                    details,
                })
            }
        }
    }

    async fn send(&self, url: &str, command: RelayCommand) -> Result<RelayReply, String> {
        let response = self
            .http
            .post(url)
            .json(&command)
            .send()
            .await
            .map_err(|e| e.to_string())?;
        let status = response.status();
        let body = response.text().await.map_err(|e| e.to_string())?;
        if !status.is_success() {
            return Err(format!("controller answered {status}: {body}"));
        }
        Ok(RelayReply {
            status: status.as_u16(),
            body,
        })
    }
}

/// Accepts bare host names and IPv4 addresses only: ASCII alphanumerics,
/// `.` and `-`. Anything that could smuggle a scheme, port, credentials or
/// path into the forwarded URL is rejected.
///
/// # Errors
///
/// Returns [`GatewayError::InvalidRequest`] for any other input.
pub fn validate_host(host: &str) -> Result<(), GatewayError> {
    let valid = !host.is_empty()
        && host.len() <= 253
        && !host.starts_with(['.', '-'])
        && host
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '.' || c == '-');
    if valid {
        Ok(())
    } else {
        Err(GatewayError::InvalidRequest(format!("invalid relay host: {host}")))
    }
}
