//! Operator sign-in handler.

use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::routing::post;
use axum::{Json, Router};

use crate::api::dto::{LoginRequest, LoginResponse};
use crate::app_state::AppState;
use crate::error::{ErrorResponse, GatewayError};

/// `POST /login`: Exchange operator credentials for a bearer token.
///
/// # Errors
///
/// Returns [`GatewayError::InvalidCredentials`] on a wrong username or
/// password.
#[utoipa::path(
    post,
    path = "/login",
    tag = "Auth",
    summary = "Operator sign-in",
    description = "Verifies the operator credentials and returns a signed bearer token. Both successful and failed attempts are written to the activity log.",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Signed in", body = LoginResponse),
        (status = 400, description = "Malformed body", body = ErrorResponse),
        (status = 401, description = "Invalid username or password", body = ErrorResponse),
    )
)]
pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<LoginResponse>, GatewayError> {
    let Json(req) = payload?;
    let token = state.auth_service.login(&req.username, &req.password).await?;
    Ok(Json(LoginResponse { token }))
}

/// Auth routes.
pub fn routes() -> Router<AppState> {
    Router::new().route("/login", post(login))
}
