//! Filtering and pagination for alert listings

use crate::domain::alert::{Alert, AlertStatus};

pub const DEFAULT_PAGE: u32 = 1;
pub const DEFAULT_LIMIT: u32 = 50;

/// Case folding used for country matching, shared by every store
pub fn fold_country(country: &str) -> String {
    country.to_lowercase()
}

/// Listing filter
///
/// `country` is a case-insensitive substring match, `status` an exact match.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AlertFilter {
    pub country: Option<String>,
    pub status: Option<AlertStatus>,
}

impl AlertFilter {
    pub fn new() -> Self {
        Self::default()
    }

    /// An empty needle is treated as no country filter
    pub fn with_country(mut self, country: impl Into<String>) -> Self {
        let country = country.into();
        self.country = (!country.is_empty()).then_some(country);
        self
    }

    pub fn with_status(mut self, status: AlertStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn matches(&self, alert: &Alert) -> bool {
        let country_ok = self.country.as_deref().map_or(true, |needle| {
            fold_country(&alert.country).contains(&fold_country(needle))
        });
        let status_ok = self.status.map_or(true, |status| alert.status == status);
        country_ok && status_ok
    }
}

/// 1-based offset pagination
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    page: u32,
    limit: u32,
}

impl PageRequest {
    /// Zero page or limit falls back to the defaults
    pub fn new(page: u32, limit: u32) -> Self {
        Self {
            page: if page == 0 { DEFAULT_PAGE } else { page },
            limit: if limit == 0 { DEFAULT_LIMIT } else { limit },
        }
    }

    /// Build from raw query-string values; anything unparseable means "default"
    pub fn from_query(page: Option<&str>, limit: Option<&str>) -> Self {
        let parse = |raw: Option<&str>| {
            raw.and_then(|v| v.trim().parse::<u32>().ok())
                .unwrap_or(0)
        };
        Self::new(parse(page), parse(limit))
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn limit(&self) -> u32 {
        self.limit
    }

    pub fn offset(&self) -> u64 {
        u64::from(self.page - 1) * u64::from(self.limit)
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE, DEFAULT_LIMIT)
    }
}

/// One page of a listing plus the total number of matching alerts
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlertPage {
    pub alerts: Vec<Alert>,
    pub total: u64,
}
