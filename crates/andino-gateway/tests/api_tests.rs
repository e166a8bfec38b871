// SPDX-FileCopyrightText: 2026 Andino Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP-level tests driving the router with `tower::ServiceExt::oneshot`.

use std::sync::Arc;

use andino_core::types::{Role, User};
use andino_gateway::{build_router, GatewayState};
use andino_notify::NullNotifier;
use andino_service::Services;
use andino_storage::database::now;
use andino_storage::queries::{carts, users};
use andino_storage::Database;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;

struct Harness {
    router: Router,
    services: Services,
    _dir: tempfile::TempDir,
}

async fn harness() -> Harness {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("api_test.db");
    let db = Arc::new(Database::open(db_path.to_str().unwrap(), true).await.unwrap());
    let services = Services::new(db, Arc::new(NullNotifier));
    Harness {
        router: build_router(GatewayState {
            services: services.clone(),
        }),
        services,
        _dir: dir,
    }
}

/// Seed a staff account directly; the HTTP surface only registers clients.
async fn seed_staff(services: &Services) -> User {
    let staff = User {
        id: "staff-1".to_string(),
        email: "staff@example.com".to_string(),
        full_name: "Sales Staff".to_string(),
        role: Role::SalesStaff,
        api_token: "tok-staff".to_string(),
        active: true,
        created_at: now(),
    };
    users::create_user(services.db(), &staff).await.unwrap().unwrap();
    carts::create_active_cart(services.db(), &staff.id).await.unwrap();
    staff
}

async fn send(
    router: &Router,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {token}"));
    }
    let request = match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

async fn register(router: &Router, email: &str) -> String {
    let (status, body) = send(
        router,
        "POST",
        "/v1/users",
        None,
        Some(json!({"email": email, "full_name": "Test User"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    body["api_token"].as_str().unwrap().to_string()
}

async fn create_package(router: &Router, staff_token: &str, capacity: i64) -> String {
    let (status, body) = send(
        router,
        "POST",
        "/v1/packages",
        Some(staff_token),
        Some(json!({
            "name": "Quebrada trek",
            "description": "Three days in the Quebrada de Humahuaca",
            "destination": "Jujuy",
            "category": "adventure",
            "difficulty": "medium",
            "duration_days": 3,
            "price": "100.00",
            "capacity": capacity,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    body["id"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn health_is_public() {
    let h = harness().await;
    let (status, body) = send(&h.router, "GET", "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn api_routes_require_a_valid_token() {
    let h = harness().await;
    let (status, _) = send(&h.router, "GET", "/v1/cart", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) = send(&h.router, "GET", "/v1/cart", Some("bogus"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"]["code"], "unauthenticated");
}

#[tokio::test]
async fn registration_does_not_leak_tokens_elsewhere() {
    let h = harness().await;
    let token = register(&h.router, "ana@example.com").await;
    seed_staff(&h.services).await;

    // Tokens appear only in the registration response; sales listings and
    // other bodies never include them.
    let (status, body) = send(&h.router, "GET", "/v1/cart", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.to_string().find(&token).is_none());
}

#[tokio::test]
async fn clients_cannot_create_packages() {
    let h = harness().await;
    let token = register(&h.router, "ana@example.com").await;
    let (status, body) = send(
        &h.router,
        "POST",
        "/v1/packages",
        Some(&token),
        Some(json!({
            "name": "x", "description": "x", "destination": "x",
            "category": "x", "difficulty": "low", "duration_days": 1,
            "price": "1.00", "capacity": 1,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"]["code"], "forbidden");
}

#[tokio::test]
async fn missing_package_is_404() {
    let h = harness().await;
    let token = register(&h.router, "ana@example.com").await;
    let (status, _) = send(&h.router, "GET", "/v1/packages/nope", Some(&token), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn full_checkout_flow_over_http() {
    let h = harness().await;
    let staff = seed_staff(&h.services).await;
    let token = register(&h.router, "ana@example.com").await;
    let package_id = create_package(&h.router, &staff.api_token, 5).await;

    // Empty-cart checkout is a 400.
    let (status, body) = send(
        &h.router,
        "POST",
        "/v1/sales",
        Some(&token),
        Some(json!({"payment_method": "cash"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "empty_cart");

    // Add 4 of 5 and check out.
    let (status, _) = send(
        &h.router,
        "POST",
        "/v1/cart/items",
        Some(&token),
        Some(json!({"package_id": package_id, "quantity": 4})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, sale) = send(
        &h.router,
        "POST",
        "/v1/sales",
        Some(&token),
        Some(json!({"payment_method": "credit_card"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(sale["state"], "pending");
    assert_eq!(sale["total"], "400.00");
    assert_eq!(sale["lines"].as_array().unwrap().len(), 1);
    let sale_id = sale["id"].as_str().unwrap().to_string();

    // One unit left: asking for two more conflicts at checkout.
    let (status, _) = send(
        &h.router,
        "POST",
        "/v1/cart/items",
        Some(&token),
        Some(json!({"package_id": package_id, "quantity": 2})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let (status, body) = send(
        &h.router,
        "POST",
        "/v1/sales",
        Some(&token),
        Some(json!({"payment_method": "cash"})),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"]["code"], "insufficient_capacity");

    // Lifecycle: client cannot confirm, staff can.
    let confirm_uri = format!("/v1/sales/{sale_id}/confirm");
    let (status, _) = send(&h.router, "POST", &confirm_uri, Some(&token), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (status, body) = send(&h.router, "POST", &confirm_uri, Some("tok-staff"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["state"], "confirmed");

    // Cancelling restores availability.
    let cancel_uri = format!("/v1/sales/{sale_id}/cancel");
    let (status, body) = send(&h.router, "POST", &cancel_uri, Some("tok-staff"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["state"], "cancelled");

    let (_, package) = send(
        &h.router,
        "GET",
        &format!("/v1/packages/{package_id}"),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(package["available"], 5);
}

#[tokio::test]
async fn invalid_quantity_is_a_400() {
    let h = harness().await;
    let staff = seed_staff(&h.services).await;
    let token = register(&h.router, "ana@example.com").await;
    let package_id = create_package(&h.router, &staff.api_token, 5).await;

    let (status, body) = send(
        &h.router,
        "POST",
        "/v1/cart/items",
        Some(&token),
        Some(json!({"package_id": package_id, "quantity": 0})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "invalid_quantity");
}
