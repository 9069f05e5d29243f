//! Notification intake and history handlers.
//!
//! The live stream lives in [`crate::sse`].

use axum::extract::multipart::{Field, MultipartError};
use axum::extract::{DefaultBodyLimit, Multipart, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};

use crate::api::dto::{NotifyForm, NotifyResponse, SUCCESS};
use crate::app_state::AppState;
use crate::domain::Notification;
use crate::error::{ErrorResponse, GatewayError};
use crate::service::{NewNotification, UploadedImage};

/// Room left for the text fields and multipart framing on top of the image.
const FORM_OVERHEAD_BYTES: usize = 64 * 1024;

/// `POST /notify`: Accept a notification from a device.
///
/// # Errors
///
/// Returns [`GatewayError::PayloadTooLarge`] for an oversized image,
/// [`GatewayError::InvalidAlertType`] for an unknown `alert_type`, or a
/// storage error if the notification cannot be saved.
#[utoipa::path(
    post,
    path = "/notify",
    tag = "Notifications",
    summary = "Post a notification",
    description = "Stores a visitor notification with an optional photo and pushes it to every connected dashboard.",
    request_body(content = NotifyForm, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Notification stored", body = NotifyResponse),
        (status = 400, description = "Invalid form, alert type or image too large", body = ErrorResponse),
        (status = 500, description = "Notification store unwritable", body = ErrorResponse),
    )
)]
pub async fn notify(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<NotifyResponse>, GatewayError> {
    let limit = state.notification_service.max_upload_bytes();
    let mut new = NewNotification::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| multipart_error(&e, limit))?
    {
        let Some(name) = field.name().map(str::to_string) else {
            continue;
        };
        match name.as_str() {
            "name" => new.name = Some(text(field, limit).await?),
            "time" => new.time = Some(text(field, limit).await?),
            "message" => new.message = Some(text(field, limit).await?),
            "location" => new.location = Some(text(field, limit).await?),
            "alert_type" => new.alert_type = text(field, limit).await?.parse()?,
            "image" => {
                let file_name = field.file_name().map(str::to_string);
                let bytes = field.bytes().await.map_err(|e| multipart_error(&e, limit))?;
                new.image = Some(UploadedImage { file_name, bytes });
            }
            other => tracing::debug!(field = other, "ignoring unknown form field"),
        }
    }

    let notification = state.notification_service.create(new).await?;
    Ok(Json(NotifyResponse {
        status: SUCCESS.to_string(),
        id: notification.id,
    }))
}

/// `GET /notifications/history`: Every stored notification.
///
/// # Errors
///
/// Returns [`GatewayError::StorageError`] if the store is unreadable.
#[utoipa::path(
    get,
    path = "/notifications/history",
    tag = "Notifications",
    summary = "Notification history",
    description = "Returns every stored notification in arrival order.",
    responses(
        (status = 200, description = "Stored notifications", body = Vec<Notification>),
        (status = 500, description = "Notification store unreadable", body = ErrorResponse),
    )
)]
pub async fn notification_history(
    State(state): State<AppState>,
) -> Result<Json<Vec<Notification>>, GatewayError> {
    Ok(Json(state.notification_service.list().await?))
}

async fn text(field: Field<'_>, limit: usize) -> Result<String, GatewayError> {
    field.text().await.map_err(|e| multipart_error(&e, limit))
}

fn multipart_error(err: &MultipartError, limit: usize) -> GatewayError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        GatewayError::PayloadTooLarge { limit }
    } else {
        GatewayError::InvalidRequest(err.body_text())
    }
}

/// Notification routes. The body limit on `/notify` follows the
/// configured image limit.
pub fn routes(max_upload_bytes: usize) -> Router<AppState> {
    Router::new()
        .route(
            "/notify",
            post(notify).layer(DefaultBodyLimit::max(
                max_upload_bytes.saturating_add(FORM_OVERHEAD_BYTES),
            )),
        )
        .route("/notifications/history", get(notification_history))
}
