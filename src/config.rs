//! Gateway configuration loaded from environment variables.
//!
//! Follows 12-factor style: all settings come from environment variables
//! (or a `.env` file via `dotenvy`). Unset keys fall back to the values
//! in [`GatewayConfig::default`].

use std::net::SocketAddr;
use std::path::PathBuf;

/// Development signing key used when `JWT_SECRET` is not set.
pub const DEV_JWT_SECRET: &str = "porter-gateway-dev-secret-do-not-deploy";

/// Top-level gateway configuration.
///
/// Loaded once at startup via [`GatewayConfig::from_env`].
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// Socket address to bind the HTTP server to (e.g. `0.0.0.0:5000`).
    pub listen_addr: SocketAddr,

    /// HMAC secret for bearer tokens. `None` selects [`DEV_JWT_SECRET`].
    pub jwt_secret: Option<String>,

    /// Token lifetime in seconds.
    pub jwt_expiry_secs: u64,

    /// Login name of the single operator account.
    pub operator_username: String,

    /// Argon2 PHC hash of the operator password. Takes precedence over
    /// [`Self::operator_password`].
    pub operator_password_hash: Option<String>,

    /// Plaintext operator password, hashed once at startup.
    pub operator_password: String,

    /// JSON array file holding every received notification.
    pub notifications_file: PathBuf,

    /// Directory where notification images are written.
    pub uploads_dir: PathBuf,

    /// Maximum accepted image size in bytes.
    pub max_upload_bytes: usize,

    /// JSON file listing the cameras shown on the dashboard.
    pub cameras_file: PathBuf,

    /// Websocket URL of the live video relay.
    pub camera_stream_url: String,

    /// Directory of static front-end assets.
    pub public_dir: PathBuf,

    /// TCP port the relay microcontrollers listen on.
    pub relay_port: u16,

    /// Timeout in seconds for a relay command round trip.
    pub relay_timeout_secs: u64,

    /// Line-oriented operator activity log.
    pub activity_log_file: PathBuf,

    /// Seconds between activity log ingestion runs.
    pub log_ingest_interval_secs: u64,

    /// PostgreSQL connection string.
    pub database_url: String,

    /// Maximum number of database connections in the pool.
    pub database_max_connections: u32,

    /// Minimum idle connections in the pool.
    pub database_min_connections: u32,

    /// Timeout in seconds for acquiring a database connection.
    pub database_connect_timeout_secs: u64,

    /// Master switch for the persistence layer.
    pub persistence_enabled: bool,

    /// Capacity of the notification broadcast channel.
    pub event_bus_capacity: usize,

    /// Seconds between SSE keep-alive comments.
    pub sse_keepalive_secs: u64,

    /// Emit tracing output as JSON lines instead of the pretty format.
    pub log_json: bool,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            listen_addr: SocketAddr::from(([0, 0, 0, 0], 5000)),
            jwt_secret: None,
            jwt_expiry_secs: 3600,
            operator_username: "admin".to_string(),
            operator_password_hash: None,
            operator_password: "password123".to_string(),
            notifications_file: PathBuf::from("notifications.json"),
            uploads_dir: PathBuf::from("uploads"),
            max_upload_bytes: 5 * 1024 * 1024,
            cameras_file: PathBuf::from("cameras.json"),
            camera_stream_url: "ws://127.0.0.1:9999".to_string(),
            public_dir: PathBuf::from("public"),
            relay_port: 3000,
            relay_timeout_secs: 5,
            activity_log_file: PathBuf::from("system_log.log"),
            log_ingest_interval_secs: 3600,
            database_url: "postgres://postgres@localhost:5430/postgres".to_string(),
            database_max_connections: 5,
            database_min_connections: 0,
            database_connect_timeout_secs: 5,
            persistence_enabled: true,
            event_bus_capacity: 1024,
            sse_keepalive_secs: 15,
            log_json: false,
        }
    }
}

impl GatewayConfig {
    /// Loads configuration from environment variables.
    ///
    /// Falls back to [`GatewayConfig::default`] when a variable is not set.
    /// Calls `dotenvy::dotenv().ok()` to optionally load a `.env` file.
    ///
    /// # Errors
    ///
    /// Returns an error if `LISTEN_ADDR` is set but cannot be parsed as
    /// a [`SocketAddr`], or if `JWT_SECRET` is set but shorter than 32
    /// characters.
    pub fn from_env() -> Result<Self, Box<dyn std::error::Error>> {
        dotenvy::dotenv().ok();
        let defaults = Self::default();

        let listen_addr: SocketAddr = match std::env::var("LISTEN_ADDR") {
            Ok(raw) => raw.parse()?,
            Err(_) => defaults.listen_addr,
        };

        let jwt_secret = std::env::var("JWT_SECRET").ok().filter(|s| !s.is_empty());
        if let Some(secret) = &jwt_secret
            && secret.len() < 32
        {
            return Err("JWT_SECRET must be at least 32 characters".into());
        }

        Ok(Self {
            listen_addr,
            jwt_secret,
            jwt_expiry_secs: parse_env("JWT_EXPIRY_SECS", defaults.jwt_expiry_secs),
            operator_username: env_or("OPERATOR_USERNAME", defaults.operator_username),
            operator_password_hash: std::env::var("OPERATOR_PASSWORD_HASH").ok(),
            operator_password: env_or("OPERATOR_PASSWORD", defaults.operator_password),
            notifications_file: path_env("NOTIFICATIONS_FILE", defaults.notifications_file),
            uploads_dir: path_env("UPLOADS_DIR", defaults.uploads_dir),
            max_upload_bytes: parse_env("MAX_UPLOAD_BYTES", defaults.max_upload_bytes),
            cameras_file: path_env("CAMERAS_FILE", defaults.cameras_file),
            camera_stream_url: env_or("CAMERA_STREAM_URL", defaults.camera_stream_url),
            public_dir: path_env("PUBLIC_DIR", defaults.public_dir),
            relay_port: parse_env("RELAY_PORT", defaults.relay_port),
            relay_timeout_secs: parse_env("RELAY_TIMEOUT_SECS", defaults.relay_timeout_secs),
            activity_log_file: path_env("ACTIVITY_LOG_FILE", defaults.activity_log_file),
            log_ingest_interval_secs: parse_env(
                "LOG_INGEST_INTERVAL_SECS",
                defaults.log_ingest_interval_secs,
            ),
            database_url: env_or("DATABASE_URL", defaults.database_url),
            database_max_connections: parse_env(
                "DATABASE_MAX_CONNECTIONS",
                defaults.database_max_connections,
            ),
            database_min_connections: parse_env(
                "DATABASE_MIN_CONNECTIONS",
                defaults.database_min_connections,
            ),
            database_connect_timeout_secs: parse_env(
                "DATABASE_CONNECT_TIMEOUT_SECS",
                defaults.database_connect_timeout_secs,
            ),
            persistence_enabled: parse_env_bool(
                "PERSISTENCE_ENABLED",
                defaults.persistence_enabled,
            ),
            event_bus_capacity: parse_env("EVENT_BUS_CAPACITY", defaults.event_bus_capacity),
            sse_keepalive_secs: parse_env("SSE_KEEPALIVE_SECS", defaults.sse_keepalive_secs),
            log_json: std::env::var("LOG_FORMAT").is_ok_and(|v| v.eq_ignore_ascii_case("json")),
        })
    }

    /// Returns the signing secret, falling back to the development key.
    #[must_use]
    pub fn jwt_secret_or_dev(&self) -> &str {
        self.jwt_secret.as_deref().unwrap_or(DEV_JWT_SECRET)
    }
}

/// Parses an environment variable as `T`, returning `default` on missing
/// or invalid values.
fn parse_env<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

/// Parses an environment variable as a boolean. Accepts `"true"`, `"1"`,
/// `"false"`, `"0"` (case-insensitive). Returns `default` otherwise.
fn parse_env_bool(key: &str, default: bool) -> bool {
    match std::env::var(key).ok().as_deref().map(str::to_ascii_lowercase).as_deref() {
        Some("true" | "1") => true,
        Some("false" | "0") => false,
        _ => default,
    }
}

fn env_or(key: &str, default: String) -> String {
    std::env::var(key).unwrap_or(default)
}

fn path_env(key: &str, default: PathBuf) -> PathBuf {
    std::env::var_os(key).map_or(default, PathBuf::from)
}
