//! API request and response models

use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::domain::{AlertPatch, NewAlert};

/// Response header carrying the total number of matching alerts
pub const TOTAL_COUNT_HEADER: &str = "x-total-count";

/// Health check endpoint response
pub const HEALTH_OK: &str = "ok";

/// Alert list query parameters
///
/// Kept as raw strings: unparseable paging values fall back to the defaults
/// instead of rejecting the request.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct AlertQuery {
    /// Case-insensitive substring of the country name
    pub country: Option<String>,
    /// Exact status (`Active`, `Booked` or `Expired`)
    pub status: Option<String>,
    /// 1-based page number, default 1
    pub page: Option<String>,
    /// Page size, default 50
    pub limit: Option<String>,
}

impl AlertQuery {
    /// Build from decoded query pairs; the first value of a repeated key wins
    /// and unknown keys are ignored
    pub fn from_pairs(pairs: Vec<(String, String)>) -> Self {
        let mut query = Self::default();
        for (key, value) in pairs {
            let slot = match key.as_str() {
                "country" => &mut query.country,
                "status" => &mut query.status,
                "page" => &mut query.page,
                "limit" => &mut query.limit,
                _ => continue,
            };
            if slot.is_none() {
                *slot = Some(value);
            }
        }
        query
    }
}

/// Create alert request
///
/// A `status` sent by the caller is ignored; new alerts are always `Active`.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateAlertRequest {
    pub country: Option<String>,
    pub city: Option<String>,
    pub visa_type: Option<String>,
}

impl CreateAlertRequest {
    /// All three fields present and non-empty
    pub fn into_new_alert(self) -> Option<NewAlert> {
        let present = |v: Option<String>| v.filter(|s| !s.is_empty());
        Some(NewAlert::new(
            present(self.country)?,
            present(self.city)?,
            present(self.visa_type)?,
        ))
    }
}

/// Update alert request; omitted fields stay unchanged
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateAlertRequest {
    pub status: Option<String>,
    pub country: Option<String>,
    pub city: Option<String>,
    pub visa_type: Option<String>,
}

impl From<UpdateAlertRequest> for AlertPatch {
    /// Empty strings count as omitted, like absent fields
    fn from(req: UpdateAlertRequest) -> Self {
        let present = |v: Option<String>| v.filter(|s| !s.is_empty());
        AlertPatch {
            status: present(req.status),
            country: present(req.country),
            city: present(req.city),
            visa_type: present(req.visa_type),
        }
    }
}

/// Plain confirmation message
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
}
