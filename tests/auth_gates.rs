//! Authentication and authorization gates, driven through the full router

mod common;

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
};
use chrono::Duration;
use common::TestApp;
use plam_backend::auth::UserRole;
use serde_json::json;

fn project_body(name: &str) -> serde_json::Value {
    json!({ "name": name, "description": "test project", "amount": 100.0 })
}

#[tokio::test]
async fn test_health_is_public() {
    let app = TestApp::new();
    let (status, body) = app.send(Method::GET, "/v1/healthz", None, None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "ok");
}

#[tokio::test]
async fn test_missing_header_rejected() {
    let app = TestApp::new();
    let (status, body) = app
        .send(
            Method::POST,
            "/v1/projects/all",
            None,
            Some(json!({ "page_id": 1, "page_size": 5 })),
        )
        .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "authorization header is not provided");
}

#[tokio::test]
async fn test_malformed_headers_rejected() {
    let app = TestApp::new();

    let cases = [
        ("Basic xyz", "unsupported authorization type basic"),
        ("Bearer", "invalid authorization header format"),
        ("Bearer not-a-token", "token is invalid"),
    ];

    for (value, message) in cases {
        let request = Request::get("/v1/users/me")
            .header(header::AUTHORIZATION, value)
            .body(Body::empty())
            .unwrap();
        let (status, body) = app.send_request(request).await;

        assert_eq!(status, StatusCode::UNAUTHORIZED, "header {:?}", value);
        assert_eq!(body["error"], message, "header {:?}", value);
    }
}

#[tokio::test]
async fn test_expired_token_rejected() {
    let app = TestApp::new();
    let (token, _) = app
        .state
        .token_maker
        .create_token("alice", UserRole::User, Duration::seconds(-1))
        .unwrap();

    let (status, body) = app
        .send(Method::GET, "/v1/users/me", Some(&token), None)
        .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "token has expired");
}

#[tokio::test]
async fn test_token_from_other_key_rejected() {
    let app = TestApp::new();
    let other = plam_backend::auth::TokenMaker::new(b"ABCDEFGHIJKLMNOPQRSTUVWXYZ012345").unwrap();
    let (token, _) = other
        .create_token("mallory", UserRole::Admin, Duration::minutes(5))
        .unwrap();

    let (status, body) = app
        .send(Method::POST, "/v1/projects", Some(&token), Some(project_body("x")))
        .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "token is invalid");
}

#[tokio::test]
async fn test_user_token_denied_on_privileged_routes() {
    let app = TestApp::new();
    let token = app.user_token();

    let (status, body) = app
        .send(
            Method::POST,
            "/v1/projects",
            Some(&token),
            Some(project_body("bridge")),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "permission denied");

    let uri = format!("/v1/loans/{}", uuid::Uuid::new_v4());
    let (status, body) = app.send(Method::DELETE, &uri, Some(&token), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "permission denied");
}

#[tokio::test]
async fn test_privileged_route_checks_token_before_role() {
    let app = TestApp::new();

    let (status, _) = app
        .send(Method::POST, "/v1/projects", None, Some(project_body("bridge")))
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_admin_token_reaches_handler() {
    let app = TestApp::new();
    let token = app.admin_token();

    let (status, body) = app
        .send(
            Method::POST,
            "/v1/projects",
            Some(&token),
            Some(project_body("bridge")),
        )
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "bridge");
}

#[tokio::test]
async fn test_user_token_reads_resources() {
    let app = TestApp::new();
    let token = app.user_token();

    let (status, body) = app
        .send(
            Method::POST,
            "/v1/pay_outs/all",
            Some(&token),
            Some(json!({ "page_id": 1, "page_size": 5 })),
        )
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([]));
}

#[tokio::test]
async fn test_me_returns_attached_payload() {
    let app = TestApp::new();
    let (token, payload) = app
        .state
        .token_maker
        .create_token("alice", UserRole::User, Duration::minutes(5))
        .unwrap();

    let (status, body) = app
        .send(Method::GET, "/v1/users/me", Some(&token), None)
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["username"], "alice");
    assert_eq!(body["role"], "user");
    assert_eq!(body["id"], payload.id().to_string());
}
