//! # porter-gateway
//!
//! Backend for a home-security dashboard. Operators sign in, switch the
//! relays on the camera microcontrollers, record observations and watch
//! visitor notifications posted by doorbell and camera devices arrive live.
//!
//! A separate binary, `porter-discover`, locates an ONVIF camera on the
//! local network by its MAC address.
//!
//! ## Architecture
//!
//! ```text
//! Dashboard, devices (HTTP, SSE)
//!     │
//!     ├── REST Handlers (api/)
//!     ├── SSE Stream (sse/)
//!     ├── Bearer Auth (auth/)
//!     │
//!     ├── Services (service/)
//!     ├── EventBus (domain/)
//!     │
//!     ├── Notification store, activity file, camera catalogue
//!     │
//!     └── PostgreSQL activity_logs (hourly ingestion)
//! ```

pub mod api;
pub mod app_state;
pub mod auth;
pub mod config;
pub mod domain;
pub mod error;
pub mod onvif;
pub mod persistence;
pub mod service;
pub mod sse;
