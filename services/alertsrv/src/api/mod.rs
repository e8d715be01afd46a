//! HTTP API for the alert service
//!
//! REST endpoints, request/response models, route definitions and the
//! generated OpenAPI document.

pub mod handlers;
pub mod models;
pub mod routes;

pub use routes::{create_router, AlertApiDoc};
