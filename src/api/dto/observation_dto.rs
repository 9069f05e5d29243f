//! Observation DTOs.

use serde::Deserialize;
use utoipa::ToSchema;

/// Request body for `POST /logs`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct ObservationRequest {
    /// Free-text observation. Missing or blank is rejected.
    #[serde(default)]
    pub observation: Option<String>,
}
