//! OpenAPI document, served by the swagger UI when the `swagger-ui` feature
//! is enabled.

use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use super::dto::{
    LoginRequest, LoginResponse, NotifyForm, NotifyResponse, ObservationRequest, RelayRequest,
    RelayResponse, StatusResponse, StreamUrlResponse,
};
use super::handlers;
use crate::domain::{AlertType, Camera, Notification, NotificationId};
use crate::error::{ErrorBody, ErrorResponse};

/// OpenAPI description of every gateway endpoint.
#[derive(Debug, OpenApi)]
#[openapi(
    info(
        title = "porter-gateway",
        description = "Home-security dashboard backend: operator sign-in, relay control, visitor notifications, cameras and observations."
    ),
    paths(
        handlers::auth::login,
        handlers::relay::control_relay,
        handlers::observations::record_observation,
        handlers::notifications::notify,
        handlers::notifications::notification_history,
        crate::sse::handler::notifications_stream,
        handlers::cameras::list_cameras,
        handlers::cameras::camera_stream_url,
        handlers::system::health_handler,
    ),
    components(schemas(
        LoginRequest,
        LoginResponse,
        RelayRequest,
        RelayResponse,
        ObservationRequest,
        StatusResponse,
        NotifyForm,
        NotifyResponse,
        StreamUrlResponse,
        Notification,
        NotificationId,
        AlertType,
        Camera,
        ErrorResponse,
        ErrorBody,
        handlers::system::HealthResponse,
    )),
    modifiers(&BearerAuth),
    tags(
        (name = "Auth", description = "Operator sign-in"),
        (name = "Relay", description = "Camera relay control"),
        (name = "Observations", description = "Operator observations"),
        (name = "Notifications", description = "Visitor notifications from devices"),
        (name = "Cameras", description = "Camera catalogue"),
        (name = "System", description = "Health"),
    )
)]
pub struct ApiDoc;

#[derive(Debug)]
struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

/// Swagger UI at `/swagger-ui`, backed by `/api-docs/openapi.json`.
#[cfg(feature = "swagger-ui")]
#[must_use]
pub fn swagger_ui() -> utoipa_swagger_ui::SwaggerUi {
    utoipa_swagger_ui::SwaggerUi::new("/swagger-ui")
        .url("/api-docs/openapi.json", ApiDoc::openapi())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_lists_every_route() {
        let doc = ApiDoc::openapi();
        for path in [
            "/login",
            "/control-relay",
            "/logs",
            "/notify",
            "/notifications",
            "/notifications/history",
            "/cameras",
            "/camera-stream-url",
            "/health",
        ] {
            assert!(doc.paths.paths.contains_key(path), "missing {path}");
        }
    }
}
