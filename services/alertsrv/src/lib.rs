//! Visa Alert Service Library
//!
//! This module exports the public API for the alert service.

pub mod api;
pub mod config;
pub mod domain;
pub mod error;
pub mod store;

use std::sync::Arc;

pub use config::AlertConfig;
pub use domain::{
    Alert, AlertFilter, AlertPage, AlertPatch, AlertStatus, NewAlert, PageRequest, VisaType,
};
pub use error::{AlertError, Result};
pub use store::{open_store, AlertStore, MemoryAlertStore, SqliteAlertStore};

/// Application state
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn AlertStore>,
    pub config: Arc<AlertConfig>,
}

impl AppState {
    pub fn new(store: Arc<dyn AlertStore>, config: AlertConfig) -> Self {
        Self {
            store,
            config: Arc::new(config),
        }
    }
}
