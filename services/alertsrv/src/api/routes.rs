//! API routes configuration

use axum::{middleware, response::Json, routing::get, Router};
use tower_http::cors::CorsLayer;
use utoipa::OpenApi;

use crate::api::handlers::*;
use crate::AppState;

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::api::handlers::health_check,
        crate::api::handlers::list_alerts,
        crate::api::handlers::get_alert,
        crate::api::handlers::create_alert,
        crate::api::handlers::update_alert,
        crate::api::handlers::delete_alert
    ),
    components(
        schemas(
            crate::domain::Alert,
            crate::domain::VisaType,
            crate::domain::AlertStatus,
            crate::api::models::CreateAlertRequest,
            crate::api::models::UpdateAlertRequest,
            crate::api::models::MessageResponse,
            crate::api::models::HealthResponse,
            crate::error::ErrorResponse
        )
    ),
    tags(
        (name = "alertsrv", description = "Visa Alert Service API")
    )
)]
pub struct AlertApiDoc;

async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(AlertApiDoc::openapi())
}

/// Create API routes
pub fn create_router(state: AppState) -> Router {
    let api_config = &state.config.api;

    Router::new()
        .route("/health", get(health_check))
        .route(
            &api_config.build_path("alerts"),
            get(list_alerts).post(create_alert),
        )
        .route(
            &api_config.build_path("alerts/{id}"),
            get(get_alert).put(update_alert).delete(delete_alert),
        )
        .route("/api-docs/openapi.json", get(openapi_json))
        .with_state(state)
        .layer(middleware::from_fn(common::logging::http_request_logger))
        .layer(CorsLayer::permissive())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_lists_alert_paths() {
        let doc = AlertApiDoc::openapi();
        let paths: Vec<&String> = doc.paths.paths.keys().collect();
        assert!(paths.iter().any(|p| p.as_str() == "/api/alerts"));
        assert!(paths.iter().any(|p| p.as_str() == "/api/alerts/{id}"));
        assert!(paths.iter().any(|p| p.as_str() == "/health"));
    }
}
