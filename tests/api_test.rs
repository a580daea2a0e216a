//! HTTP tests driving the router directly with `oneshot`.

use axum::body::{to_bytes, Body};
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;

use mental_health_platform::api;
use mental_health_platform::config::AppConfig;
use mental_health_platform::state::AppState;

mod common;
use common::*;

async fn app() -> Router {
    let db = setup_test_db().await;
    api::router(AppState::new(AppConfig::default(), db))
}

async fn send(app: &Router, method: Method, uri: &str, token: Option<&str>, body: Option<Value>) -> (StatusCode, Value) {
    let mut request = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        request = request.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    let request = match body {
        Some(body) => request
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => request.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

async fn sign_up(app: &Router, username: &str) -> String {
    let (status, _) = send(
        app,
        Method::POST,
        "/register",
        None,
        Some(json!({
            "username": username,
            "email": format!("{}@example.com", username),
            "password": "correct-horse",
            "confirm_password": "correct-horse",
            "user_type": "student",
            "country": "Kenya",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = send(
        app,
        Method::POST,
        "/login",
        None,
        Some(json!({ "username": username, "password": "correct-horse" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    body["token"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn test_health_reports_database() {
    let app = app().await;
    let (status, body) = send(&app, Method::GET, "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["database"], true);
}

#[tokio::test]
async fn test_unknown_route_is_json_404() {
    let app = app().await;
    let (status, body) = send(&app, Method::GET, "/no/such/page", None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Not found");
}

#[tokio::test]
async fn test_protected_routes_require_token() {
    let app = app().await;
    let (status, _) = send(&app, Method::GET, "/dashboard", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send(&app, Method::GET, "/mood", Some("not-a-real-token"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_public_pages() {
    let app = app().await;
    let (status, body) = send(&app, Method::GET, "/services", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["services"].as_array().unwrap().len(), 6);

    let (status, body) = send(&app, Method::GET, "/crisis-support", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["country"], "USA");
    assert_eq!(body["resources"][0]["phone_number"], "988");

    let (status, body) = send(
        &app,
        Method::POST,
        "/quick-checkin",
        None,
        Some(json!({
            "fname": "Sam",
            "email": "sam@example.com",
            "concern": "crisis",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["next"], "/crisis-support");
}

#[tokio::test]
async fn test_mood_flow_over_http() {
    let app = app().await;
    let token = sign_up(&app, "amina").await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/mood",
        Some(&token),
        Some(json!({ "mood_score": 11, "energy_level": 5 })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("Mood score"));

    let (status, body) = send(
        &app,
        Method::POST,
        "/mood",
        Some(&token),
        Some(json!({ "mood_score": 8, "energy_level": 6, "emotions": ["hopeful"] })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["entry"]["mood_level"], "good");

    let (status, body) = send(&app, Method::GET, "/dashboard", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["average_mood"], 8.0);
    assert_eq!(body["streak"]["current_mood_streak"], 1);
}

#[tokio::test]
async fn test_crisis_support_uses_member_country() {
    let app = app().await;
    let token = sign_up(&app, "amina").await;

    let (status, body) = send(&app, Method::GET, "/crisis-support", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["country"], "Kenya");
    assert_eq!(body["resources"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_staff_routes_are_forbidden_to_members() {
    let app = app().await;
    let token = sign_up(&app, "amina").await;

    let (status, _) = send(&app, Method::GET, "/admin/dashboard", Some(&token), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = send(&app, Method::GET, "/admin/audit-logs", Some(&token), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_chat_over_http() {
    let app = app().await;
    let token = sign_up(&app, "amina").await;

    let (status, session) = send(&app, Method::POST, "/chat/new", Some(&token), None).await;
    assert_eq!(status, StatusCode::CREATED);
    let session_id = session["id"].as_str().unwrap();

    let (status, exchange) = send(
        &app,
        Method::POST,
        &format!("/chat/{}/send", session_id),
        Some(&token),
        Some(json!({ "message": "I have been thinking about suicide" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(exchange["crisis_detected"], true);
    assert_eq!(exchange["crisis_severity"], "critical");

    let (status, transcript) = send(&app, Method::GET, &format!("/chat/{}", session_id), Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(transcript["session"]["status"], "crisis_detected");
    assert_eq!(transcript["messages"].as_array().unwrap().len(), 2);
}
