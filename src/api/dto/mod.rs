//! Data Transfer Objects for REST request/response serialization.
//!
//! Field names match what the dashboard front end and the devices already
//! send, so a few of them are camelCase on the wire.

pub mod auth_dto;
pub mod camera_dto;
pub mod common_dto;
pub mod notification_dto;
pub mod observation_dto;
pub mod relay_dto;

pub use auth_dto::*;
pub use camera_dto::*;
pub use common_dto::*;
pub use notification_dto::*;
pub use observation_dto::*;
pub use relay_dto::*;
