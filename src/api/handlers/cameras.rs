//! Camera catalogue handlers.

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};

use crate::api::dto::StreamUrlResponse;
use crate::app_state::AppState;
use crate::auth::AuthenticatedUser;
use crate::domain::Camera;
use crate::error::{ErrorResponse, GatewayError};

/// `GET /cameras`: List the configured cameras.
///
/// # Errors
///
/// Returns [`GatewayError::StorageError`] if the catalogue is unreadable.
#[utoipa::path(
    get,
    path = "/cameras",
    tag = "Cameras",
    summary = "List cameras",
    description = "Returns the camera catalogue. An absent catalogue file yields an empty list.",
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Camera list", body = Vec<Camera>),
        (status = 401, description = "Missing or invalid bearer token", body = ErrorResponse),
        (status = 500, description = "Catalogue unreadable", body = ErrorResponse),
    )
)]
pub async fn list_cameras(
    State(state): State<AppState>,
    _user: AuthenticatedUser,
) -> Result<Json<Vec<Camera>>, GatewayError> {
    Ok(Json(state.camera_service.list().await?))
}

/// `GET /camera-stream-url`: Websocket URL of the live video relay.
#[utoipa::path(
    get,
    path = "/camera-stream-url",
    tag = "Cameras",
    summary = "Live stream endpoint",
    responses(
        (status = 200, description = "Stream URL", body = StreamUrlResponse),
    )
)]
pub async fn camera_stream_url(State(state): State<AppState>) -> Json<StreamUrlResponse> {
    Json(StreamUrlResponse {
        ws_url: state.camera_service.stream_url().to_string(),
    })
}

/// Camera routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/cameras", get(list_cameras))
        .route("/camera-stream-url", get(camera_stream_url))
}
