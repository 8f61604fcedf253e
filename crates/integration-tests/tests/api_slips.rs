//! Integration tests for the slip endpoints.
//!
//! Requests go through the full router with an in-memory session store.
//!
//! Run with: cargo test -p slipdesk-integration-tests

use axum::http::{Method, StatusCode};
use serde_json::json;

use slipdesk_core::Role;
use slipdesk_integration_tests::{TestApp, json_request, multipart_request, slip_fields};

const IMAGE: &[u8] = &[0xFF, 0xD8, 0xFF, 0xE0];

// ============================================================================
// Access
// ============================================================================

#[tokio::test]
async fn test_health_needs_no_session() {
    let app = TestApp::new();

    let resp = app.send(json_request(Method::GET, "/health", None, None)).await;
    assert_eq!(resp.status, StatusCode::OK);

    let resp = app
        .send(json_request(Method::GET, "/health/ready", None, None))
        .await;
    assert_eq!(resp.status, StatusCode::OK);

    app.slips.fail(true);
    let resp = app
        .send(json_request(Method::GET, "/health/ready", None, None))
        .await;
    assert_eq!(resp.status, StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn test_slips_require_sign_in() {
    let app = TestApp::new();

    let resp = app
        .send(json_request(Method::GET, "/api/slips", None, None))
        .await;

    assert_eq!(resp.status, StatusCode::UNAUTHORIZED);
    assert!(resp.body["error"].is_string());
}

// ============================================================================
// Upload & List
// ============================================================================

#[tokio::test]
async fn test_upload_then_list_with_filters() {
    let app = TestApp::new();
    let cookie = app.sign_in_as("front", Role::Staff).await;

    let resp = app
        .send(multipart_request(
            "/api/slips",
            Some(&cookie),
            &slip_fields("01-01-2024"),
            Some(IMAGE),
        ))
        .await;
    assert_eq!(resp.status, StatusCode::CREATED, "{}", resp.body);
    assert_eq!(resp.body["status"], "pending");
    assert_eq!(resp.body["deliveryDate"], "2024-01-01");
    assert_eq!(resp.body["hamper"], true);
    assert_eq!(app.images.upload_count(), 1);

    let resp = app
        .send(json_request(
            Method::GET,
            "/api/slips?branch=KHAMLA&q=ravi",
            Some(&cookie),
            None,
        ))
        .await;
    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(resp.body.as_array().map(Vec::len), Some(1));

    let resp = app
        .send(json_request(
            Method::GET,
            "/api/slips?branch=all&cakeType=fondant",
            Some(&cookie),
            None,
        ))
        .await;
    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(resp.body, json!([]));
}

#[tokio::test]
async fn test_upload_without_image_is_rejected() {
    let app = TestApp::new();
    let cookie = app.sign_in_as("front", Role::Staff).await;

    let resp = app
        .send(multipart_request(
            "/api/slips",
            Some(&cookie),
            &slip_fields("01-01-2024"),
            None,
        ))
        .await;

    assert_eq!(resp.status, StatusCode::BAD_REQUEST);
    assert!(app.slips.all().is_empty());
    assert_eq!(app.images.upload_count(), 0);
}

#[tokio::test]
async fn test_upload_with_yearless_date_is_rejected() {
    let app = TestApp::new();
    let cookie = app.sign_in_as("front", Role::Staff).await;

    let resp = app
        .send(multipart_request(
            "/api/slips",
            Some(&cookie),
            &slip_fields("01-01"),
            Some(IMAGE),
        ))
        .await;

    assert_eq!(resp.status, StatusCode::BAD_REQUEST);
    assert_eq!(app.images.upload_count(), 0);
}

#[tokio::test]
async fn test_upload_failure_is_bad_gateway() {
    let app = TestApp::new();
    let cookie = app.sign_in_as("front", Role::Staff).await;
    app.images.fail_uploads(true);

    let resp = app
        .send(multipart_request(
            "/api/slips",
            Some(&cookie),
            &slip_fields("01-01-2024"),
            Some(IMAGE),
        ))
        .await;

    assert_eq!(resp.status, StatusCode::BAD_GATEWAY);
    assert!(app.slips.all().is_empty());
}

// ============================================================================
// Status
// ============================================================================

#[tokio::test]
async fn test_chef_status_change_is_forbidden_for_delivered() {
    let app = TestApp::new();
    let slip = app.slips.insert_dated("2024-01-01");
    let cookie = app.sign_in_as("baker", Role::Chef).await;
    let uri = format!("/api/slips/{}/status", slip.id);

    let resp = app
        .send(json_request(
            Method::PATCH,
            &uri,
            Some(&cookie),
            Some(&json!({ "status": "delivered" })),
        ))
        .await;
    assert_eq!(resp.status, StatusCode::FORBIDDEN);

    let resp = app
        .send(json_request(
            Method::PATCH,
            &uri,
            Some(&cookie),
            Some(&json!({ "status": "in kitchen" })),
        ))
        .await;
    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(resp.body["status"], "in kitchen");
}

#[tokio::test]
async fn test_status_errors() {
    let app = TestApp::new();
    let cookie = app.sign_in_as("owner", Role::Admin).await;

    let resp = app
        .send(json_request(
            Method::PATCH,
            "/api/slips/999/status",
            Some(&cookie),
            Some(&json!({ "status": "ready" })),
        ))
        .await;
    assert_eq!(resp.status, StatusCode::NOT_FOUND);

    let resp = app
        .send(json_request(
            Method::PATCH,
            "/api/slips/abc/status",
            Some(&cookie),
            Some(&json!({ "status": "ready" })),
        ))
        .await;
    assert_eq!(resp.status, StatusCode::BAD_REQUEST);

    let slip = app.slips.insert_dated("2024-01-01");
    let resp = app
        .send(json_request(
            Method::PATCH,
            &format!("/api/slips/{}/status", slip.id),
            Some(&cookie),
            Some(&json!({ "status": "baked" })),
        ))
        .await;
    assert_eq!(resp.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_permitted_statuses_follow_role() {
    let app = TestApp::new();
    let cookie = app.sign_in_as("driver", Role::Delivery).await;

    let resp = app
        .send(json_request(
            Method::GET,
            "/api/slips/statuses",
            Some(&cookie),
            None,
        ))
        .await;

    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(resp.body["role"], "delivery");
    assert_eq!(resp.body["statuses"], json!(["delivered"]));

    let resp = app
        .send(json_request(Method::GET, "/api/slips/statuses", None, None))
        .await;
    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(resp.body, json!({ "role": null, "statuses": [] }));
}

// ============================================================================
// Manual Sweep
// ============================================================================

#[tokio::test]
async fn test_manual_sweep_is_admin_only() {
    let app = TestApp::new();
    let old = app.slips.insert_dated("2000-01-01");
    let staff = app.sign_in_as("front", Role::Staff).await;

    let resp = app
        .send(json_request(
            Method::DELETE,
            "/api/slips/old?days=5",
            Some(&staff),
            None,
        ))
        .await;
    assert_eq!(resp.status, StatusCode::FORBIDDEN);
    assert!(app.slips.get(old.id).is_some());

    let admin = app.sign_in_as("owner", Role::Admin).await;
    let resp = app
        .send(json_request(
            Method::DELETE,
            "/api/slips/old?days=5",
            Some(&admin),
            None,
        ))
        .await;
    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(resp.body["deletedCount"], 1);
    assert!(app.slips.get(old.id).is_none());
    assert_eq!(app.images.delete_attempts(), vec![old.image_url]);
}
