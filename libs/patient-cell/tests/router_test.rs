use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    response::Response,
};
use serde_json::{json, Value};
use tower::ServiceExt;
use uuid::Uuid;

use patient_cell::router::patient_routes;
use shared_models::auth::Role;
use shared_utils::state::AppState;
use shared_utils::test_utils::{JwtTestUtils, TestConfig, TestUser};

async fn json_body(response: Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn signup_request(payload: Value) -> Request<Body> {
    Request::builder()
        .method(Method::POST)
        .uri("/")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(payload.to_string()))
        .unwrap()
}

fn signup_payload(email: &str) -> Value {
    json!({
        "name": "Jane Roe",
        "email": email,
        "password": "secret1",
        "phone": "5551234567",
        "address": "1 Main Street"
    })
}

#[tokio::test]
async fn test_signup_then_read_own_profile() {
    let config = TestConfig::default();
    let app = patient_routes(AppState::in_memory(config.to_app_config()));

    let response = app.clone().oneshot(signup_request(signup_payload("jane@clinic.test"))).await.unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let created = json_body(response).await;
    assert!(created.get("credential").is_none());

    let id = Uuid::parse_str(created["id"].as_str().unwrap()).unwrap();
    let me = TestUser::with_id(id, "jane@clinic.test", Role::Patient);
    let token = JwtTestUtils::create_test_token(&me, &config.jwt_secret, Some(1));

    let response = app
        .oneshot(
            Request::builder()
                .uri("/me")
                .header(header::AUTHORIZATION, format!("Bearer {}", token))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await["email"], "jane@clinic.test");
}

#[tokio::test]
async fn test_duplicate_signup_is_conflict() {
    let app = patient_routes(AppState::in_memory(TestConfig::default().to_app_config()));

    app.clone().oneshot(signup_request(signup_payload("jane@clinic.test"))).await.unwrap();
    let response = app.oneshot(signup_request(signup_payload("jane@clinic.test"))).await.unwrap();

    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_invalid_phone_is_bad_request() {
    let app = patient_routes(AppState::in_memory(TestConfig::default().to_app_config()));
    let mut payload = signup_payload("jane@clinic.test");
    payload["phone"] = json!("555-1234");

    let response = app.oneshot(signup_request(payload)).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(json_body(response).await["kind"], "invalid_argument");
}

#[tokio::test]
async fn test_profile_requires_patient_token() {
    let config = TestConfig::default();
    let app = patient_routes(AppState::in_memory(config.to_app_config()));
    let token = JwtTestUtils::create_test_token(&TestUser::doctor("doc@clinic.test"), &config.jwt_secret, Some(1));

    let response = app
        .oneshot(
            Request::builder()
                .uri("/me")
                .header(header::AUTHORIZATION, format!("Bearer {}", token))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}
