//! Alert entity and its write-time validation rules

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::error::{AlertError, Result};

/// Visa category an alert watches for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub enum VisaType {
    Tourist,
    Business,
    Student,
}

impl VisaType {
    pub const ALL: [VisaType; 3] = [VisaType::Tourist, VisaType::Business, VisaType::Student];

    pub fn as_str(&self) -> &'static str {
        match self {
            VisaType::Tourist => "Tourist",
            VisaType::Business => "Business",
            VisaType::Student => "Student",
        }
    }
}

impl fmt::Display for VisaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for VisaType {
    type Err = AlertError;

    fn from_str(s: &str) -> Result<Self> {
        VisaType::ALL
            .into_iter()
            .find(|v| v.as_str() == s)
            .ok_or_else(|| AlertError::validation(format!("{} is not a valid visa type", s)))
    }
}

/// Alert lifecycle status
///
/// Any status may be set to any other; there is no enforced transition graph.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema,
)]
pub enum AlertStatus {
    #[default]
    Active,
    Booked,
    Expired,
}

impl AlertStatus {
    pub const ALL: [AlertStatus; 3] = [AlertStatus::Active, AlertStatus::Booked, AlertStatus::Expired];

    pub fn as_str(&self) -> &'static str {
        match self {
            AlertStatus::Active => "Active",
            AlertStatus::Booked => "Booked",
            AlertStatus::Expired => "Expired",
        }
    }
}

impl fmt::Display for AlertStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AlertStatus {
    type Err = AlertError;

    fn from_str(s: &str) -> Result<Self> {
        AlertStatus::ALL
            .into_iter()
            .find(|v| v.as_str() == s)
            .ok_or_else(|| AlertError::validation(format!("{} is not a valid status", s)))
    }
}

/// A visa appointment alert
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Alert {
    /// Store-assigned identifier
    pub id: Uuid,
    pub country: String,
    pub city: String,
    pub visa_type: VisaType,
    pub status: AlertStatus,
    /// Creation time, millisecond precision
    pub created_at: DateTime<Utc>,
}

impl Alert {
    /// Build a newly created alert: fresh id, `Active`, created now
    pub fn new(fields: ValidatedAlert) -> Self {
        Self {
            id: Uuid::new_v4(),
            country: fields.country,
            city: fields.city,
            visa_type: fields.visa_type,
            status: AlertStatus::Active,
            created_at: now_millis(),
        }
    }
}

fn now_millis() -> DateTime<Utc> {
    let now = Utc::now();
    DateTime::from_timestamp_millis(now.timestamp_millis()).unwrap_or(now)
}

/// Creation input, as received from the caller
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewAlert {
    pub country: String,
    pub city: String,
    pub visa_type: String,
}

impl NewAlert {
    pub fn new(
        country: impl Into<String>,
        city: impl Into<String>,
        visa_type: impl Into<String>,
    ) -> Self {
        Self {
            country: country.into(),
            city: city.into(),
            visa_type: visa_type.into(),
        }
    }

    /// Trim and check every field
    pub fn validate(&self) -> Result<ValidatedAlert> {
        Ok(ValidatedAlert {
            country: required_text(&self.country, "Country")?,
            city: required_text(&self.city, "City")?,
            visa_type: parse_visa_type(&self.visa_type)?,
        })
    }
}

/// Creation input that passed validation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedAlert {
    pub country: String,
    pub city: String,
    pub visa_type: VisaType,
}

/// Partial update input; `None` leaves the stored value untouched
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AlertPatch {
    pub status: Option<String>,
    pub country: Option<String>,
    pub city: Option<String>,
    pub visa_type: Option<String>,
}

impl AlertPatch {
    pub fn status(status: impl Into<String>) -> Self {
        Self {
            status: Some(status.into()),
            ..Default::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.status.is_none()
            && self.country.is_none()
            && self.city.is_none()
            && self.visa_type.is_none()
    }

    /// Check every supplied field; nothing is applied unless all of them pass
    pub fn validate(&self) -> Result<ValidatedPatch> {
        Ok(ValidatedPatch {
            status: self.status.as_deref().map(parse_status).transpose()?,
            country: self
                .country
                .as_deref()
                .map(|v| required_text(v, "Country"))
                .transpose()?,
            city: self
                .city
                .as_deref()
                .map(|v| required_text(v, "City"))
                .transpose()?,
            visa_type: self.visa_type.as_deref().map(parse_visa_type).transpose()?,
        })
    }
}

/// Partial update that passed validation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidatedPatch {
    pub status: Option<AlertStatus>,
    pub country: Option<String>,
    pub city: Option<String>,
    pub visa_type: Option<VisaType>,
}

impl ValidatedPatch {
    /// Overwrite the supplied fields of `alert`
    pub fn apply(&self, alert: &mut Alert) {
        if let Some(status) = self.status {
            alert.status = status;
        }
        if let Some(country) = &self.country {
            alert.country = country.clone();
        }
        if let Some(city) = &self.city {
            alert.city = city.clone();
        }
        if let Some(visa_type) = self.visa_type {
            alert.visa_type = visa_type;
        }
    }
}

fn required_text(value: &str, field: &str) -> Result<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(AlertError::validation(format!("{} is required", field)));
    }
    Ok(trimmed.to_string())
}

fn parse_visa_type(value: &str) -> Result<VisaType> {
    if value.is_empty() {
        return Err(AlertError::validation("Visa type is required"));
    }
    value.parse()
}

fn parse_status(value: &str) -> Result<AlertStatus> {
    if value.is_empty() {
        return Err(AlertError::validation("Status is required"));
    }
    value.parse()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_enum_parsing() {
        assert_eq!("Tourist".parse::<VisaType>().unwrap(), VisaType::Tourist);
        assert_eq!("Expired".parse::<AlertStatus>().unwrap(), AlertStatus::Expired);

        let err = "tourist".parse::<VisaType>().unwrap_err();
        assert_eq!(err.to_string(), "tourist is not a valid visa type");

        let err = "Closed".parse::<AlertStatus>().unwrap_err();
        assert_eq!(err.to_string(), "Closed is not a valid status");
    }

    #[test]
    fn test_new_alert_is_active() {
        let alert = Alert::new(NewAlert::new("France", "Paris", "Tourist").validate().unwrap());
        assert_eq!(alert.status, AlertStatus::Active);
        assert_eq!(alert.visa_type, VisaType::Tourist);
        assert_eq!(alert.created_at.timestamp_subsec_nanos() % 1_000_000, 0);
    }

    #[test]
    fn test_new_alert_trims_text() {
        let fields = NewAlert::new("  Germany ", "\tBerlin\n", "Business")
            .validate()
            .unwrap();
        assert_eq!(fields.country, "Germany");
        assert_eq!(fields.city, "Berlin");
    }

    #[test]
    fn test_new_alert_rejects_blank_fields() {
        let err = NewAlert::new("   ", "Paris", "Tourist").validate().unwrap_err();
        assert_eq!(err.to_string(), "Country is required");

        let err = NewAlert::new("France", "", "Tourist").validate().unwrap_err();
        assert_eq!(err.to_string(), "City is required");

        let err = NewAlert::new("France", "Paris", "").validate().unwrap_err();
        assert_eq!(err.to_string(), "Visa type is required");

        let err = NewAlert::new("France", "Paris", "Work").validate().unwrap_err();
        assert!(matches!(err, AlertError::Validation(_)));
    }

    #[test]
    fn test_patch_applies_only_supplied_fields() {
        let mut alert = Alert::new(NewAlert::new("France", "Paris", "Tourist").validate().unwrap());
        let before = alert.clone();

        AlertPatch::status("Booked").validate().unwrap().apply(&mut alert);

        assert_eq!(alert.status, AlertStatus::Booked);
        assert_eq!(alert.country, before.country);
        assert_eq!(alert.city, before.city);
        assert_eq!(alert.visa_type, before.visa_type);
        assert_eq!(alert.created_at, before.created_at);
    }

    #[test]
    fn test_patch_rejects_any_invalid_field() {
        let patch = AlertPatch {
            status: Some("Booked".to_string()),
            visa_type: Some("Diplomatic".to_string()),
            ..Default::default()
        };
        assert!(patch.validate().is_err());

        let patch = AlertPatch {
            city: Some("  ".to_string()),
            ..Default::default()
        };
        assert_eq!(patch.validate().unwrap_err().to_string(), "City is required");
    }

    #[test]
    fn test_any_status_transition_is_allowed() {
        let mut alert = Alert::new(NewAlert::new("Spain", "Madrid", "Student").validate().unwrap());
        for status in ["Expired", "Active", "Booked", "Expired"] {
            AlertPatch::status(status).validate().unwrap().apply(&mut alert);
            assert_eq!(alert.status.as_str(), status);
        }
    }

    #[test]
    fn test_empty_patch() {
        assert!(AlertPatch::default().is_empty());
        assert_eq!(AlertPatch::default().validate().unwrap(), ValidatedPatch::default());
        assert!(!AlertPatch::status("Active").is_empty());
    }

    #[test]
    fn test_json_shape() {
        let alert = Alert::new(NewAlert::new("France", "Paris", "Student").validate().unwrap());
        let value = serde_json::to_value(&alert).unwrap();
        assert_eq!(value["visaType"], "Student");
        assert_eq!(value["status"], "Active");
        assert!(value["createdAt"].is_string());
        assert!(value["id"].is_string());
        assert!(value.get("visa_type").is_none());
    }
}
