//! REST API layer: route handlers, DTOs, OpenAPI document and router
//! composition.
//!
//! All endpoints are mounted at the root. Uploaded images are served under
//! `/uploads` and any other path falls through to the static front end.

pub mod docs;
pub mod dto;
pub mod handlers;

use std::time::Duration;

use axum::Router;
use axum::http::StatusCode;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::app_state::AppState;
use crate::config::GatewayConfig;
use crate::service::notification_service::UPLOADS_URL_PREFIX;

/// Upper bound on producing a response head. SSE bodies are not affected.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Builds the complete API router with all REST endpoints.
pub fn build_router(config: &GatewayConfig) -> Router<AppState> {
    Router::new()
        .merge(handlers::routes(config.max_upload_bytes))
        .merge(crate::sse::routes())
}

/// Builds the full application: API routes, SSE, uploaded images, static
/// front end and the HTTP middleware stack.
pub fn build_app(state: AppState, config: &GatewayConfig) -> Router {
    let router = build_router(config)
        .nest_service(
            &format!("/{UPLOADS_URL_PREFIX}"),
            ServeDir::new(&config.uploads_dir),
        )
        .fallback_service(ServeDir::new(&config.public_dir));

    #[cfg(feature = "swagger-ui")]
    let router = router.merge(docs::swagger_ui());

    router
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            REQUEST_TIMEOUT,
        ))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
