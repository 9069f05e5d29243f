//! Relay control handler.

use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::post;
use axum::{Json, Router};

use crate::api::dto::{RelayRequest, RelayResponse, SUCCESS};
use crate::app_state::AppState;
use crate::auth::AuthenticatedUser;
use crate::error::{ErrorResponse, GatewayError};
use crate::service::RelayCommand;

/// Activity log name for relay commands sent without a token.
const ANONYMOUS: &str = "anonymous";

/// `POST /control-relay`: Switch a relay on a camera's microcontroller.
///
/// # Errors
///
/// Returns [`GatewayError::MissingParameters`] if a field is absent,
/// [`GatewayError::InvalidRequest`] for a malformed host, or
/// [`GatewayError::RelayUnreachable`] if the controller fails.
#[utoipa::path(
    post,
    path = "/control-relay",
    tag = "Relay",
    summary = "Switch a relay",
    description = "Forwards `{relay, state}` to the microcontroller at `ip` and returns its answer. A bearer token is optional and only used to attribute the command in the activity log.",
    request_body = RelayRequest,
    responses(
        (status = 200, description = "Controller accepted the command", body = RelayResponse),
        (status = 400, description = "Missing or invalid parameters", body = ErrorResponse),
        (status = 401, description = "Invalid bearer token", body = ErrorResponse),
        (status = 502, description = "Controller unreachable or failed", body = ErrorResponse),
    )
)]
pub async fn control_relay(
    State(state): State<AppState>,
    user: Option<AuthenticatedUser>,
    payload: Result<Json<RelayRequest>, JsonRejection>,
) -> Result<impl IntoResponse, GatewayError> {
    let Json(req) = payload?;
    let (Some(ip), Some(relay), Some(target)) = (
        req.ip.as_deref().map(str::trim).filter(|ip| !ip.is_empty()),
        req.relay,
        req.state,
    ) else {
        return Err(GatewayError::MissingParameters);
    };

    let username = user.as_ref().map_or(ANONYMOUS, AuthenticatedUser::username);
    let reply = state
        .relay_service
        .forward(
            username,
            ip,
            RelayCommand {
                relay,
                state: target,
            },
        )
        .await?;

    let status = StatusCode::from_u16(reply.status).unwrap_or(StatusCode::OK);
    Ok((
        status,
        Json(RelayResponse {
            status: SUCCESS.to_string(),
            message: reply.body,
        }),
    ))
}

/// Relay routes.
pub fn routes() -> Router<AppState> {
    Router::new().route("/control-relay", post(control_relay))
}
