//! Helpers for driving the full router in-process.

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
};
use serde_json::{json, Value};
use tower::ServiceExt;

use crate::{app::build_app, state::AppState};

pub const TEST_PASSWORD: &str = "pa55word!";

/// Sends one request through a fresh router over `state`. Non-JSON bodies come
/// back as `Value::String`, empty ones as `Value::Null`.
pub async fn send(
    state: &AppState,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut req = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        req = req.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    let req = match body {
        Some(json) => req
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string())),
        None => req.body(Body::empty()),
    }
    .unwrap();

    let res = build_app(state.clone()).oneshot(req).await.unwrap();
    let status = res.status();
    let bytes = axum::body::to_bytes(res.into_body(), usize::MAX).await.unwrap();

    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes)
            .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
    };
    (status, value)
}

pub async fn signup_user(state: &AppState, name: &str, email: &str, password: &str) {
    let (status, body) = send(
        state,
        Method::POST,
        "/api/auth/signup",
        None,
        Some(json!({ "name": name, "email": email, "password": password })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "signup failed: {body}");
}

pub async fn login_token(state: &AppState, email: &str, password: &str) -> String {
    let (status, body) = send(
        state,
        Method::POST,
        "/api/auth/login",
        None,
        Some(json!({ "email": email, "password": password })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "login failed: {body}");
    body["token"].as_str().expect("token in body").to_string()
}

/// Signs up with [`TEST_PASSWORD`] and returns a fresh token.
pub async fn signed_up_token(state: &AppState, name: &str, email: &str) -> String {
    signup_user(state, name, email, TEST_PASSWORD).await;
    login_token(state, email, TEST_PASSWORD).await
}
