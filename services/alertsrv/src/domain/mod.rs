//! Domain module for the alert service
//!
//! The alert entity, its validation rules, and the listing query model.

pub mod alert;
pub mod query;

pub use alert::{
    Alert, AlertPatch, AlertStatus, NewAlert, ValidatedAlert, ValidatedPatch, VisaType,
};
pub use query::{
    fold_country, AlertFilter, AlertPage, PageRequest, DEFAULT_LIMIT, DEFAULT_PAGE,
};
