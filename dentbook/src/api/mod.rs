//! REST API surface.
//!
//! [`handlers`] holds the axum handlers and [`models`] the request and response bodies they
//! exchange. Every handler carries a `utoipa::path` annotation so it shows up in the
//! generated OpenAPI document served at `/api/docs`. [`extractors`] keeps malformed input on
//! the same `{message}` error format as everything else.

pub mod extractors;
pub mod handlers;
pub mod models;
