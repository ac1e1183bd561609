//! Router tests that never reach the store.
//!
//! The state is built on a disconnected pool, so these cover the checks
//! made before any query: actor headers, request validation and roles.

use std::time::Duration;

use axum::{
    Router,
    body::Body,
    http::{Method, Request, StatusCode},
};
use http_body_util::BodyExt;
use sea_orm::DatabaseConnection;
use serde_json::{Value, json};
use tower::ServiceExt;
use uuid::Uuid;

use feeledger_api::middleware::{ACTOR_ID_HEADER, ACTOR_ROLE_HEADER};
use feeledger_api::{AppState, create_router};
use feeledger_shared::AppConfig;
use feeledger_shared::config::{BillingConfig, DatabaseConfig, LedgerConfig, ServerConfig};

fn app() -> Router {
    let config = AppConfig {
        server: ServerConfig::default(),
        database: DatabaseConfig {
            url: "postgres://unused".to_string(),
            max_connections: 1,
            min_connections: 0,
            acquire_timeout_secs: 1,
            statement_timeout_ms: 1_000,
        },
        ledger: LedgerConfig::default(),
        billing: BillingConfig::default(),
    };
    let state = AppState::new(DatabaseConnection::default(), &config);
    create_router(state, Duration::from_secs(5))
}

fn request(method: Method, uri: &str, role: Option<&str>, body: Option<Value>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(role) = role {
        builder = builder
            .header(ACTOR_ID_HEADER, Uuid::now_v7().to_string())
            .header(ACTOR_ROLE_HEADER, role);
    }
    match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

async fn send(request: Request<Body>) -> (StatusCode, Value) {
    let response = app().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, json)
}

#[tokio::test]
async fn test_health_reports_database_down() {
    let (status, body) = send(request(Method::GET, "/api/v1/health", None, None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["database"], "down");
}

#[tokio::test]
async fn test_missing_actor_is_unauthorized() {
    let (status, body) = send(request(Method::GET, "/api/v1/grades", None, None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "UNAUTHORIZED");
}

#[tokio::test]
async fn test_viewer_cannot_record_payment() {
    let payload = json!({
        "pupil_id": Uuid::now_v7(),
        "term": 1,
        "year": 2024,
        "amount": "500.00"
    });
    let (status, body) = send(request(
        Method::POST,
        "/api/v1/payments",
        Some("viewer"),
        Some(payload),
    ))
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "FORBIDDEN");
}

#[tokio::test]
async fn test_non_positive_payment_is_rejected() {
    let payload = json!({
        "pupil_id": Uuid::now_v7(),
        "term": 1,
        "year": 2024,
        "amount": "0"
    });
    let (status, _) = send(request(
        Method::POST,
        "/api/v1/payments",
        Some("clerk"),
        Some(payload),
    ))
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_amounts_finer_than_a_cent_are_rejected() {
    let payment = json!({
        "pupil_id": Uuid::now_v7(),
        "term": 1,
        "year": 2024,
        "amount": "100.005"
    });
    let (status, body) = send(request(
        Method::POST,
        "/api/v1/payments",
        Some("clerk"),
        Some(payment),
    ))
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "INVALID_AMOUNT");

    let fee = json!({
        "grade_id": Uuid::now_v7(),
        "term": 1,
        "year": 2024,
        "amount": "1000000000000"
    });
    let (status, body) = send(request(
        Method::PUT,
        "/api/v1/fee-structures",
        Some("bursar"),
        Some(fee),
    ))
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "INVALID_AMOUNT");
}

#[tokio::test]
async fn test_bad_term_is_rejected() {
    let uri = format!(
        "/api/v1/pupils/{}/balance?term=5&year=2024",
        Uuid::now_v7()
    );
    let (status, body) = send(request(Method::GET, &uri, Some("viewer"), None)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_clerk_cannot_set_fees() {
    let payload = json!({
        "grade_id": Uuid::now_v7(),
        "term": 1,
        "year": 2024,
        "amount": "500"
    });
    let (status, _) = send(request(
        Method::PUT,
        "/api/v1/fee-structures",
        Some("clerk"),
        Some(payload),
    ))
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_store_failure_is_opaque() {
    let (status, body) = send(request(Method::GET, "/api/v1/grades", Some("viewer"), None)).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["message"], "An error occurred");
}
