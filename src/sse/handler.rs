//! `GET /notifications` stream handler.

use std::convert::Infallible;

use axum::extract::State;
use axum::response::Sse;
use axum::response::sse::{Event, KeepAlive};
use futures_util::{Stream, StreamExt, stream};
use tokio_stream::wrappers::BroadcastStream;

use crate::app_state::AppState;
use crate::domain::Notification;
use crate::error::GatewayError;

/// `GET /notifications`: Replay stored notifications, then stream new ones.
///
/// The live subscription is taken before the history is read, so a
/// notification posted in between shows up at least once. Clients
/// de-duplicate by `id`.
///
/// # Errors
///
/// Returns [`GatewayError::StorageError`] if the stored history is
/// unreadable.
#[utoipa::path(
    get,
    path = "/notifications",
    tag = "Notifications",
    summary = "Notification stream",
    description = "Server-Sent Events stream. Each event's data is one notification as JSON. Stored notifications are replayed on connect.",
    responses(
        (status = 200, description = "Event stream", content_type = "text/event-stream", body = Notification),
        (status = 500, description = "Notification store unreadable", body = crate::error::ErrorResponse),
    )
)]
pub async fn notifications_stream(
    State(state): State<AppState>,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>>>, GatewayError> {
    let live = state.notification_service.subscribe();
    let history = state.notification_service.list().await?;
    tracing::debug!(replayed = history.len(), "notification stream opened");

    let live = BroadcastStream::new(live).filter_map(|msg| async move {
        match msg {
            Ok(notification) => Some(notification),
            Err(lagged) => {
                tracing::warn!(error = %lagged, "notification stream lagged, skipping");
                None
            }
        }
    });

    let events = stream::iter(history)
        .chain(live)
        .filter_map(|notification| async move { to_event(&notification).map(Ok::<_, Infallible>) });

    Ok(Sse::new(events).keep_alive(KeepAlive::new().interval(state.sse_keepalive)))
}

fn to_event(notification: &Notification) -> Option<Event> {
    match serde_json::to_string(notification) {
        Ok(json) => Some(Event::default().data(json)),
        Err(e) => {
            tracing::error!(id = %notification.id, error = %e, "failed to encode notification");
            None
        }
    }
}
