//! Shared building blocks for the visa alert services
//!
//! - logging bootstrap and the HTTP access-log middleware
//! - graceful shutdown signal handling

pub mod logging;
pub mod shutdown;
