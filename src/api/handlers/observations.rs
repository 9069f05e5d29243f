//! Operator observation handler.

use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::routing::post;
use axum::{Json, Router};

use crate::api::dto::{ObservationRequest, StatusResponse};
use crate::app_state::AppState;
use crate::auth::AuthenticatedUser;
use crate::error::{ErrorResponse, GatewayError};

/// `POST /logs`: Record a free-text observation.
///
/// # Errors
///
/// Returns [`GatewayError::EmptyObservation`] for a blank observation and
/// [`GatewayError::Unauthorized`] without a valid bearer token.
#[utoipa::path(
    post,
    path = "/logs",
    tag = "Observations",
    summary = "Record an observation",
    description = "Stores the observation as an activity log entry attributed to the signed-in operator. The entry goes straight to the database when it is reachable, otherwise to the activity file for the next ingestion run.",
    request_body = ObservationRequest,
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Observation recorded", body = StatusResponse),
        (status = 400, description = "Observation is empty", body = ErrorResponse),
        (status = 401, description = "Missing or invalid bearer token", body = ErrorResponse),
    )
)]
pub async fn record_observation(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    payload: Result<Json<ObservationRequest>, JsonRejection>,
) -> Result<Json<StatusResponse>, GatewayError> {
    let Json(req) = payload?;
    state
        .observation_service
        .record(user.username(), req.observation.as_deref())
        .await?;
    Ok(Json(StatusResponse::success()))
}

/// Observation routes.
pub fn routes() -> Router<AppState> {
    Router::new().route("/logs", post(record_observation))
}
