//! Server-Sent Events delivery of visitor notifications.
//!
//! A dashboard opens `GET /notifications` once. It first receives every
//! stored notification, one `data:` event each, and then every
//! notification posted while it stays connected. Keep-alive comments keep
//! proxies from closing an idle stream.

pub mod handler;

use axum::Router;
use axum::routing::get;

use crate::app_state::AppState;

pub use handler::notifications_stream;

/// SSE routes.
pub fn routes() -> Router<AppState> {
    Router::new().route("/notifications", get(notifications_stream))
}
