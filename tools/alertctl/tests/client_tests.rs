//! Client tests against a live server on an ephemeral port

use std::sync::Arc;

use alertctl::{AlertClient, ClientError, ListParams};
use alertsrv::{api::create_router, AlertConfig, AlertStatus, AppState, MemoryAlertStore};

/// Serve a fresh in-memory alert service, returning its API base URL
async fn spawn_server() -> String {
    let state = AppState::new(Arc::new(MemoryAlertStore::new()), AlertConfig::default());
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    format!("http://{}/api", addr)
}

#[tokio::test]
async fn test_health() {
    let client = AlertClient::new(&spawn_server().await);
    assert_eq!(client.health().await.unwrap(), "ok");
}

#[tokio::test]
async fn test_create_update_delete() {
    let client = AlertClient::new(&spawn_server().await);

    let alert = client.create("France", "Paris", "Tourist").await.unwrap();
    assert_eq!(alert.status, AlertStatus::Active);

    let booked = client
        .set_status(&alert.id.to_string(), "Booked")
        .await
        .unwrap();
    assert_eq!(booked.status, AlertStatus::Booked);
    assert_eq!(booked.city, "Paris");

    let fetched = client.get(&alert.id.to_string()).await.unwrap();
    assert_eq!(fetched, booked);

    let message = client.delete(&alert.id.to_string()).await.unwrap();
    assert_eq!(message, "Alert deleted successfully");

    let list = client.list(&ListParams::default()).await.unwrap();
    assert!(list.alerts.iter().all(|a| a.id != alert.id));
}

#[tokio::test]
async fn test_list_with_params() {
    let client = AlertClient::new(&spawn_server().await);
    for city in ["Paris", "Lyon", "Nice"] {
        client.create("France", city, "Business").await.unwrap();
    }
    client.create("Germany", "Berlin", "Student").await.unwrap();

    let params = ListParams {
        country: Some("FRA".to_string()),
        page: Some(1),
        limit: Some(2),
        ..Default::default()
    };
    let list = client.list(&params).await.unwrap();

    assert_eq!(list.total, Some(3));
    assert_eq!(list.alerts.len(), 2);
    assert_eq!(list.alerts[0].city, "Nice");
    assert_eq!(list.alerts[1].city, "Lyon");
}

#[tokio::test]
async fn test_api_errors_carry_server_message() {
    let client = AlertClient::new(&spawn_server().await);

    let err = client.create("France", "Paris", "Work").await.unwrap_err();
    match err {
        ClientError::Api { status, message } => {
            assert_eq!(status, 400);
            assert_eq!(message, "Work is not a valid visa type");
        },
        other => panic!("unexpected error: {}", other),
    }

    let err = client
        .set_status("00000000-0000-0000-0000-000000000000", "Booked")
        .await
        .unwrap_err();
    assert_eq!(err.status(), Some(404));
    assert_eq!(err.to_string(), "API error (404): Alert not found");
}
