//! REST endpoint handlers organized by resource.

pub mod auth;
pub mod cameras;
pub mod notifications;
pub mod observations;
pub mod relay;
pub mod system;

use axum::Router;

use crate::app_state::AppState;

/// Composes all resource routes at the root, where the dashboard expects
/// them.
pub fn routes(max_upload_bytes: usize) -> Router<AppState> {
    Router::new()
        .merge(auth::routes())
        .merge(relay::routes())
        .merge(observations::routes())
        .merge(notifications::routes(max_upload_bytes))
        .merge(cameras::routes())
        .merge(system::routes())
}
