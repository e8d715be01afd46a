//! API handlers for the alert service

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    response::Json,
};
use tracing::{debug, info};
use uuid::Uuid;

use crate::api::models::*;
use crate::domain::{Alert, AlertFilter, AlertPatch, AlertStatus, PageRequest};
use crate::error::{AlertError, ErrorResponse, Result};
use crate::AppState;

/// Message returned when a create request lacks a field
pub const MISSING_FIELDS: &str = "Missing required fields: country, city, visaType";

/// Non-UUID ids can never name a stored alert
fn parse_id(raw: &str) -> Result<Uuid> {
    Uuid::parse_str(raw).map_err(|_| AlertError::not_found(raw))
}

fn json_body<T>(payload: std::result::Result<Json<T>, JsonRejection>) -> Result<T> {
    payload
        .map(|Json(body)| body)
        .map_err(|rejection| AlertError::validation(rejection.body_text()))
}

/// Health check endpoint
#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Service is up", body = HealthResponse,
            example = json!({"status": "ok"}))
    ),
    tag = "alertsrv"
)]
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: HEALTH_OK.to_string(),
    })
}

/// List alerts, newest first
#[utoipa::path(
    get,
    path = "/api/alerts",
    params(AlertQuery),
    responses(
        (status = 200, description = "One page of alerts", body = [Alert],
            headers(("x-total-count" = u64, description = "Number of alerts matching the filter"))
        ),
        (status = 500, description = "Store failure", body = ErrorResponse)
    ),
    tag = "alertsrv"
)]
pub async fn list_alerts(
    State(state): State<AppState>,
    query: std::result::Result<Query<Vec<(String, String)>>, QueryRejection>,
) -> Result<([(&'static str, String); 1], Json<Vec<Alert>>)> {
    // Listing never fails on the query string: repeated keys keep their first
    // value and an undecodable string means no filters
    let query = match query {
        Ok(Query(pairs)) => AlertQuery::from_pairs(pairs),
        Err(rejection) => {
            debug!("Ignoring query string: {}", rejection.body_text());
            AlertQuery::default()
        },
    };

    let mut filter = AlertFilter::new();
    if let Some(country) = query.country.as_deref() {
        filter = filter.with_country(country);
    }

    let page = PageRequest::from_query(query.page.as_deref(), query.limit.as_deref());

    if let Some(status) = query.status.as_deref().filter(|s| !s.is_empty()) {
        match status.parse::<AlertStatus>() {
            Ok(status) => filter = filter.with_status(status),
            Err(_) => {
                // No stored alert can carry an unknown status
                debug!("Unknown status filter '{}', returning no alerts", status);
                return Ok(([(TOTAL_COUNT_HEADER, "0".to_string())], Json(Vec::new())));
            },
        }
    }

    let result = state.store.list(&filter, page).await?;
    Ok((
        [(TOTAL_COUNT_HEADER, result.total.to_string())],
        Json(result.alerts),
    ))
}

/// Get a single alert
#[utoipa::path(
    get,
    path = "/api/alerts/{id}",
    params(("id" = String, Path, description = "Alert ID")),
    responses(
        (status = 200, description = "Alert found", body = Alert),
        (status = 404, description = "Alert not found", body = ErrorResponse)
    ),
    tag = "alertsrv"
)]
pub async fn get_alert(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Alert>> {
    let id = parse_id(&id)?;
    Ok(Json(state.store.get(id).await?))
}

/// Create a new alert
#[utoipa::path(
    post,
    path = "/api/alerts",
    request_body = CreateAlertRequest,
    responses(
        (status = 201, description = "Alert created", body = Alert),
        (status = 400, description = "Missing or invalid fields", body = ErrorResponse,
            example = json!({"error": "Missing required fields: country, city, visaType"}))
    ),
    tag = "alertsrv"
)]
pub async fn create_alert(
    State(state): State<AppState>,
    payload: std::result::Result<Json<CreateAlertRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Alert>)> {
    let input = json_body(payload)?
        .into_new_alert()
        .ok_or_else(|| AlertError::validation(MISSING_FIELDS))?;

    let alert = state.store.create(input).await?;
    info!(
        "Created alert {} ({} / {} / {})",
        alert.id, alert.country, alert.city, alert.visa_type
    );
    Ok((StatusCode::CREATED, Json(alert)))
}

/// Update an alert's status and/or other fields
#[utoipa::path(
    put,
    path = "/api/alerts/{id}",
    params(("id" = String, Path, description = "Alert ID")),
    request_body = UpdateAlertRequest,
    responses(
        (status = 200, description = "Alert updated", body = Alert),
        (status = 400, description = "Invalid field value", body = ErrorResponse,
            example = json!({"error": "Closed is not a valid status"})),
        (status = 404, description = "Alert not found", body = ErrorResponse)
    ),
    tag = "alertsrv"
)]
pub async fn update_alert(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: std::result::Result<Json<UpdateAlertRequest>, JsonRejection>,
) -> Result<Json<Alert>> {
    let patch = AlertPatch::from(json_body(payload)?);

    let id = match Uuid::parse_str(&id) {
        Ok(id) => id,
        Err(_) => {
            // Invalid input is reported before the missing alert
            patch.validate()?;
            return Err(AlertError::not_found(id));
        },
    };

    let alert = state.store.update(id, patch).await?;
    info!("Updated alert {} (status: {})", alert.id, alert.status);
    Ok(Json(alert))
}

/// Delete an alert
#[utoipa::path(
    delete,
    path = "/api/alerts/{id}",
    params(("id" = String, Path, description = "Alert ID")),
    responses(
        (status = 200, description = "Alert deleted", body = MessageResponse,
            example = json!({"message": "Alert deleted successfully"})),
        (status = 404, description = "Alert not found", body = ErrorResponse)
    ),
    tag = "alertsrv"
)]
pub async fn delete_alert(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>> {
    let id = parse_id(&id)?;
    state.store.delete(id).await?;
    info!("Deleted alert {}", id);
    Ok(Json(MessageResponse {
        message: "Alert deleted successfully".to_string(),
    }))
}
