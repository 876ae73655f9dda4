//! Shared harness for router-level tests

#![allow(dead_code)]

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use chrono::Duration;
use plam_backend::{
    auth::{TokenMaker, UserRole},
    db::{CreateUserParams, Store},
    router, AppState,
};
use serde_json::Value;
use tower::ServiceExt;

pub const KEY: &[u8; 32] = b"abcdefghijklmnopqrstuvwxyz012345";

pub struct TestApp {
    pub router: Router,
    pub state: AppState,
}

impl TestApp {
    pub fn new() -> Self {
        let store = Store::open_in_memory().unwrap();
        let token_maker = TokenMaker::new(KEY).unwrap();
        let state = AppState::new(store, token_maker, Duration::minutes(15));

        Self {
            router: router(state.clone()),
            state,
        }
    }

    /// Insert a user directly, with a cheap bcrypt cost
    pub fn seed_user(&self, username: &str, password: &str, role: UserRole) {
        self.insert_user(username, &bcrypt::hash(password, 4).unwrap(), role);
    }

    pub fn insert_user(&self, username: &str, hashed_password: &str, role: UserRole) {
        self.state
            .store
            .create_user(&CreateUserParams {
                username: username.to_string(),
                hashed_password: hashed_password.to_string(),
                full_name: format!("{} test", username),
                email: format!("{}@example.com", username),
                role,
            })
            .unwrap();
    }

    pub fn token(&self, username: &str, role: UserRole) -> String {
        self.state
            .token_maker
            .create_token(username, role, Duration::minutes(5))
            .unwrap()
            .0
    }

    pub fn admin_token(&self) -> String {
        self.token("root", UserRole::Admin)
    }

    pub fn user_token(&self) -> String {
        self.token("alice", UserRole::User)
    }

    /// Send one request through the router and decode the body
    pub async fn send(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }

        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        self.send_request(request).await
    }

    pub async fn send_request(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let value = serde_json::from_slice(&bytes)
            .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()));

        (status, value)
    }
}
