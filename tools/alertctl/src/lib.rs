//! HTTP client for the visa alert service

use alertsrv::{
    api::models::{CreateAlertRequest, HealthResponse, MessageResponse, UpdateAlertRequest},
    error::ErrorResponse,
    Alert,
};
use reqwest::{Client, Response};
use serde::{de::DeserializeOwned, Serialize};
use thiserror::Error;
use tracing::debug;

/// API base used when none is configured
pub const DEFAULT_API_BASE: &str = "http://localhost:3000/api";

/// Client-side failures
#[derive(Debug, Error)]
pub enum ClientError {
    /// Transport or decoding failure
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-success answer from the service
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },
}

impl ClientError {
    /// HTTP status of an API error
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Api { status, .. } => Some(*status),
            ClientError::Http(e) => e.status().map(|s| s.as_u16()),
        }
    }
}

pub type Result<T> = std::result::Result<T, ClientError>;

/// Listing parameters; unset fields are left off the query string
#[derive(Debug, Clone, Default, Serialize)]
pub struct ListParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
}

/// One page of alerts
#[derive(Debug, Clone)]
pub struct AlertList {
    pub alerts: Vec<Alert>,
    /// From the `x-total-count` header, when the server sent one
    pub total: Option<u64>,
}

pub struct AlertClient {
    client: Client,
    base_url: String,
}

impl AlertClient {
    /// `base_url` points at the API root, e.g. `http://localhost:3000/api`
    pub fn new(base_url: &str) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// The health endpoint lives next to the API root, not under it
    fn health_url(&self) -> String {
        let root = self.base_url.strip_suffix("/api").unwrap_or(&self.base_url);
        format!("{}/health", root)
    }

    pub async fn list(&self, params: &ListParams) -> Result<AlertList> {
        debug!("GET {} {:?}", self.url("alerts"), params);
        let response = self
            .client
            .get(self.url("alerts"))
            .query(params)
            .send()
            .await?;
        let response = check(response).await?;

        let total = response
            .headers()
            .get(alertsrv::api::models::TOTAL_COUNT_HEADER)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse().ok());
        let alerts = response.json().await?;
        Ok(AlertList { alerts, total })
    }

    pub async fn get(&self, id: &str) -> Result<Alert> {
        let response = self
            .client
            .get(self.url(&format!("alerts/{}", id)))
            .send()
            .await?;
        decode(response).await
    }

    pub async fn create(&self, country: &str, city: &str, visa_type: &str) -> Result<Alert> {
        let body = CreateAlertRequest {
            country: Some(country.to_string()),
            city: Some(city.to_string()),
            visa_type: Some(visa_type.to_string()),
        };
        let response = self
            .client
            .post(self.url("alerts"))
            .json(&body)
            .send()
            .await?;
        decode(response).await
    }

    pub async fn update(&self, id: &str, update: &UpdateAlertRequest) -> Result<Alert> {
        let response = self
            .client
            .put(self.url(&format!("alerts/{}", id)))
            .json(update)
            .send()
            .await?;
        decode(response).await
    }

    pub async fn set_status(&self, id: &str, status: &str) -> Result<Alert> {
        let update = UpdateAlertRequest {
            status: Some(status.to_string()),
            ..Default::default()
        };
        self.update(id, &update).await
    }

    pub async fn delete(&self, id: &str) -> Result<String> {
        let response = self
            .client
            .delete(self.url(&format!("alerts/{}", id)))
            .send()
            .await?;
        let body: MessageResponse = decode(response).await?;
        Ok(body.message)
    }

    pub async fn health(&self) -> Result<String> {
        let response = self.client.get(self.health_url()).send().await?;
        let body: HealthResponse = decode(response).await?;
        Ok(body.status)
    }
}

/// Turn a non-success response into [`ClientError::Api`]
async fn check(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let text = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ErrorResponse>(&text)
        .map(|body| body.error)
        .unwrap_or_else(|_| {
            if text.is_empty() {
                status.canonical_reason().unwrap_or("request failed").to_string()
            } else {
                text
            }
        });
    Err(ClientError::Api {
        status: status.as_u16(),
        message,
    })
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T> {
    Ok(check(response).await?.json().await?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_urls() {
        let client = AlertClient::new("http://localhost:3000/api/");
        assert_eq!(client.base_url(), "http://localhost:3000/api");
        assert_eq!(client.url("alerts"), "http://localhost:3000/api/alerts");
        assert_eq!(client.health_url(), "http://localhost:3000/health");

        let client = AlertClient::new("http://alerts.internal:8080");
        assert_eq!(client.health_url(), "http://alerts.internal:8080/health");
    }

    #[test]
    fn test_api_error_display() {
        let err = ClientError::Api {
            status: 404,
            message: "Alert not found".to_string(),
        };
        assert_eq!(err.to_string(), "API error (404): Alert not found");
        assert_eq!(err.status(), Some(404));
    }
}
