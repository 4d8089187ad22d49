// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Register, log in and update through the full router and middleware stack.

use std::collections::HashMap;

use axum::{
    body::{to_bytes, Body},
    http::{header::AUTHORIZATION, header::CONTENT_TYPE, Method, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;

use pet_registry_server::{api::router, config::AppConfig, state::AppState};

fn app_state() -> AppState {
    let env: HashMap<&str, &str> = HashMap::from([
        ("JWT_SECRET", "integration-secret"),
        ("JWT_EXPIRATION_MS", "60000"),
    ]);
    let config = AppConfig::from_lookup(|var| env.get(var).map(|v| v.to_string())).unwrap();
    AppState::from_config(&config).unwrap()
}

async fn send(app: &Router, method: Method, uri: &str, token: Option<&str>, body: Option<Value>) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(AUTHORIZATION, format!("Bearer {token}"));
    }
    let request = match body {
        Some(body) => builder
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, value)
}

async fn register(app: &Router, name: &str, email: &str) -> StatusCode {
    let body = json!({
        "name": name,
        "surname": "Tester",
        "email": email,
        "password": "correct-horse"
    });
    send(app, Method::POST, "/register", None, Some(body)).await.0
}

async fn login(app: &Router, email: &str, password: &str) -> (StatusCode, Value) {
    let body = json!({ "email": email, "password": password });
    send(app, Method::POST, "/login", None, Some(body)).await
}

async fn token_for(app: &Router, email: &str) -> String {
    let (status, body) = login(app, email, "correct-horse").await;
    assert_eq!(status, StatusCode::OK);
    body["token"].as_str().unwrap().to_string()
}

async fn my_id(app: &Router, token: &str) -> u64 {
    let (status, body) = send(app, Method::GET, "/users/me", Some(token), None).await;
    assert_eq!(status, StatusCode::OK);
    body["user"]["id"].as_u64().unwrap()
}

#[tokio::test]
async fn duplicate_registration_is_rejected_without_new_record() {
    let state = app_state();
    let app = router(state.clone());

    assert_eq!(register(&app, "Ana", "ana@example.com").await, StatusCode::OK);
    assert_eq!(register(&app, "Ana", "ana@example.com").await, StatusCode::BAD_REQUEST);
    assert_eq!(state.store.read().await.user_count(), 1);
}

#[tokio::test]
async fn login_returns_bearer_token_or_unauthorized() {
    let app = router(app_state());
    register(&app, "Ana", "ana@example.com").await;

    let (status, body) = login(&app, "ana@example.com", "correct-horse").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["token_type"], "Bearer");
    assert!(body["token"].as_str().is_some_and(|t| t.split('.').count() == 3));

    for _ in 0..3 {
        let (status, body) = login(&app, "ana@example.com", "wrong-password").await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"], "Invalid credentials");
    }
}

#[tokio::test]
async fn owner_can_update_and_others_cannot() {
    let app = router(app_state());
    register(&app, "Ana", "ana@example.com").await;
    register(&app, "Bob", "bob@example.com").await;
    let ana_token = token_for(&app, "ana@example.com").await;
    let bob_token = token_for(&app, "bob@example.com").await;
    let ana_id = my_id(&app, &ana_token).await;
    let bob_id = my_id(&app, &bob_token).await;

    let uri = format!("/user/{ana_id}");
    let (status, body) = send(&app, Method::PUT, &uri, Some(&ana_token), Some(json!({ "name": "Ana Maria" }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "Ana Maria");
    assert!(body.get("password_hash").is_none());

    let bob_uri = format!("/user/{bob_id}");
    let (status, _) = send(&app, Method::PUT, &bob_uri, Some(&ana_token), Some(json!({ "name": "Hijacked" }))).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (_, bob) = send(&app, Method::GET, &bob_uri, Some(&bob_token), None).await;
    assert_eq!(bob["user"]["name"], "Bob");
}

#[tokio::test]
async fn non_owner_is_forbidden_even_with_invalid_body() {
    let app = router(app_state());
    register(&app, "Ana", "ana@example.com").await;
    register(&app, "Bob", "bob@example.com").await;
    let ana_token = token_for(&app, "ana@example.com").await;
    let bob_id = my_id(&app, &token_for(&app, "bob@example.com").await).await;

    let (status, _) = send(
        &app,
        Method::PUT,
        &format!("/user/{bob_id}"),
        Some(&ana_token),
        Some(json!({ "telephone": "not-a-number" })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn protected_routes_require_a_valid_token() {
    let app = router(app_state());
    register(&app, "Ana", "ana@example.com").await;
    let token = token_for(&app, "ana@example.com").await;
    let id = my_id(&app, &token).await;
    let uri = format!("/user/{id}");

    let (status, _) = send(&app, Method::PUT, &uri, None, Some(json!({ "name": "X" }))).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = send(&app, Method::PUT, &uri, Some("not.a.token"), Some(json!({ "name": "X" }))).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert!(body["error"].is_string());

    let (status, _) = send(&app, Method::PUT, "/user/9999", Some(&token), Some(json!({ "name": "X" }))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn public_routes_need_no_header() {
    let app = router(app_state());

    let (status, body) = send(&app, Method::GET, "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");

    let (status, _) = login(&app, "nobody@example.com", "whatever-password").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn pets_follow_their_owner() {
    let app = router(app_state());
    register(&app, "Ana", "ana@example.com").await;
    let token = token_for(&app, "ana@example.com").await;
    let id = my_id(&app, &token).await;

    let pet = json!({
        "name": "Rex",
        "species": "Dog",
        "birth_date": "21/03/2020",
        "gender": "Male",
        "weight_kg": 12.5,
        "color": "Brown",
        "neutered": "yes",
        "breed": "Mixed"
    });
    let (status, created) = send(&app, Method::POST, &format!("/user/{id}/pets"), Some(&token), Some(pet)).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["birth_date"], "21/03/2020");
    let pet_id = created["id"].as_u64().unwrap();

    let pet_uri = format!("/user/{id}/pets/{pet_id}");
    let (status, updated) = send(&app, Method::PUT, &pet_uri, Some(&token), Some(json!({ "color": "Black" }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["color"], "Black");

    let (status, _) = send(&app, Method::DELETE, &pet_uri, Some(&token), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (_, me) = send(&app, Method::GET, "/users/me", Some(&token), None).await;
    assert_eq!(me["pets"].as_array().map(Vec::len), Some(0));
}
