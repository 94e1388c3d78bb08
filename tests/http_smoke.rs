mod common;

use axum::body::{to_bytes, Body};
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;

use common::test_state;
use freight_market::build_app;

async fn send(app: &Router, method: Method, uri: &str, token: Option<&str>, body: Option<Value>) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
}

async fn login(app: &Router, email: &str) -> String {
    let (status, body) = send(
        app,
        Method::POST,
        "/api/auth/login",
        None,
        Some(json!({ "email": email, "password": "password123" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{}", body);
    body["data"]["access_token"].as_str().unwrap().to_string()
}

fn quote_body() -> Value {
    json!({
        "origin_address": "서울 강남구 테헤란로 1",
        "destination_address": "경기 성남시 분당구 2",
        "distance_km": 10,
        "vehicle_type": "TON_1",
        "weight_kg": 600,
        "unload_method": "DRIVER"
    })
}

#[tokio::test]
async fn test_health_check() {
    let app = build_app(test_state());
    let (status, body) = send(&app, Method::GET, "/health", None, None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn test_protected_routes_require_token() {
    let app = build_app(test_state());

    let (status, body) = send(&app, Method::GET, "/api/quotes", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "UNAUTHORIZED");

    let (status, _) = send(&app, Method::GET, "/api/quotes", Some("not-a-jwt"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    // Rutas públicas
    let (status, _) = send(&app, Method::GET, "/api/announcements", None, None).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = send(&app, Method::GET, "/api/checklist-items", None, None).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_signup_quote_and_match_over_http() {
    let app = build_app(test_state());

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/auth/signup/shipper",
        None,
        Some(json!({
            "email": "shipper@example.com",
            "password": "password123",
            "name": "김화주",
            "phone": "010-1234-5678",
            "company_name": "화물상사",
            "business_number": "123-45-67890",
            "representative_name": "김대표",
            "opening_date": "20200101"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{}", body);
    assert_eq!(body["data"]["role"], "SHIPPER");

    let (status, _) = send(
        &app,
        Method::POST,
        "/api/auth/signup/driver",
        None,
        Some(json!({
            "email": "driver@example.com",
            "password": "password123",
            "name": "박기사",
            "vehicle_type": "TON_1"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let shipper = login(&app, "shipper@example.com").await;
    let driver = login(&app, "driver@example.com").await;

    let (status, body) = send(&app, Method::POST, "/api/quotes", Some(&shipper), Some(quote_body())).await;
    assert_eq!(status, StatusCode::OK, "{}", body);
    assert_eq!(body["data"]["base_price"], 50_000);
    let quote_id = body["data"]["id"].as_str().unwrap().to_string();

    // Un conductor no puede crear presupuestos
    let (status, _) = send(&app, Method::POST, "/api/quotes", Some(&driver), Some(quote_body())).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/matches",
        Some(&shipper),
        Some(json!({ "quote_id": quote_id })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{}", body);
    let match_id = body["data"]["id"].as_str().unwrap().to_string();

    let accept_uri = format!("/api/matches/{}/accept", match_id);
    let (status, body) = send(&app, Method::POST, &accept_uri, Some(&driver), None).await;
    assert_eq!(status, StatusCode::OK, "{}", body);
    assert_eq!(body["data"]["accepted"], true);

    let (status, body) = send(&app, Method::POST, &accept_uri, Some(&driver), None).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "conflict");

    let (status, body) = send(&app, Method::GET, "/api/notifications/unread-count", Some(&shipper), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["unread"], 2);
}

#[tokio::test]
async fn test_invalid_quote_body_is_bad_request() {
    let state = test_state();
    let app = build_app(state.clone());
    let (status, _) = send(
        &app,
        Method::POST,
        "/api/auth/signup/driver",
        None,
        Some(json!({ "email": "d@example.com", "password": "password123", "name": "기사" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let token = login(&app, "d@example.com").await;

    let mut body = quote_body();
    body["distance_km"] = json!(900);
    body["vehicle_type"] = json!("TRUCK");
    let (status, response) = send(&app, Method::POST, "/api/quotes/estimate", Some(&token), Some(body)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(response["code"], "VALIDATION_ERROR");

    let (status, response) = send(&app, Method::POST, "/api/quotes/estimate", Some(&token), Some(quote_body())).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(response["data"]["distance_range_key"], "KM_9_10");
}
