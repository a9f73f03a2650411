//! Integration tests for the asset service lifecycle endpoints.

mod common;

use axum::http::{Method, StatusCode};
use common::{json_request, parse_response_body, token_for, test_config, TestApp};
use serde_json::json;
use tower::ServiceExt;
use uuid::Uuid;

fn out_of_service_body() -> serde_json::Value {
    json!({
        "date": "2024-01-10",
        "reason": "sensor drift",
        "reportedBy": "J. Lee"
    })
}

fn return_body() -> serde_json::Value {
    json!({
        "date": "2024-01-12",
        "resolvedBy": "J. Lee",
        "notes": "recalibrated"
    })
}

fn uri(asset_id: Uuid, action: &str) -> String {
    format!("/api/v1/assets/{}/{}", asset_id, action)
}

// ============================================================================
// Authentication
// ============================================================================

#[tokio::test]
async fn test_missing_token_is_unauthorized() {
    let app = TestApp::new();
    let asset = app.seed_asset().await;

    let request = json_request(
        Method::POST,
        &uri(asset.id, "out-of-service"),
        None,
        Some(out_of_service_body()),
    );
    let response = app.router.clone().oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = parse_response_body(response).await;
    assert_eq!(body["error"], "unauthorized");
}

#[tokio::test]
async fn test_garbage_token_is_unauthorized() {
    let app = TestApp::new();
    let asset = app.seed_asset().await;

    let request = json_request(
        Method::GET,
        &uri(asset.id, "service-status"),
        Some("not-a-jwt"),
        None,
    );
    let response = app.router.clone().oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

// ============================================================================
// Out of service / return to service
// ============================================================================

#[tokio::test]
async fn test_full_lifecycle() {
    let app = TestApp::new();
    let asset = app.seed_asset().await;
    let user = app.seed_user().await;

    let response = app
        .router
        .clone()
        .oneshot(json_request(
            Method::POST,
            &uri(asset.id, "out-of-service"),
            Some(&user.token),
            Some(out_of_service_body()),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = parse_response_body(response).await;
    assert_eq!(body["isOutOfService"], true);
    assert_eq!(body["outOfServiceDate"], "2024-01-10");
    assert_eq!(body["outOfServiceReason"], "sensor drift");

    let response = app
        .router
        .clone()
        .oneshot(json_request(
            Method::POST,
            &uri(asset.id, "return-to-service"),
            Some(&user.token),
            Some(return_body()),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = parse_response_body(response).await;
    assert_eq!(body["isOutOfService"], false);
    assert_eq!(body["returnToServiceVerified"], true);
    assert_eq!(body["returnToServiceVerifiedAt"], "2024-01-12");
    assert_eq!(body["returnToServiceVerifiedBy"], user.display_name.as_str());
    assert_eq!(body["returnToServiceNotes"], "recalibrated");
    assert_eq!(body["outOfServiceReason"], "sensor drift");

    let response = app
        .router
        .clone()
        .oneshot(json_request(
            Method::GET,
            &uri(asset.id, "changelog"),
            Some(&user.token),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = parse_response_body(response).await;
    let entries = body["data"].as_array().unwrap();
    let actions: Vec<&str> = entries
        .iter()
        .map(|e| e["action"].as_str().unwrap())
        .collect();
    assert_eq!(
        actions,
        vec!["service_out", "status_changed", "service_return", "status_changed"]
    );
    assert_eq!(entries[0]["payload"]["reportedBy"], "J. Lee");
    assert_eq!(entries[0]["actorId"], user.user_id.to_string());
    assert_eq!(
        entries[1]["summary"],
        "Marked as out of service: sensor drift"
    );
    assert_eq!(entries[2]["payload"]["verifiedBy"], user.display_name.as_str());
}

#[tokio::test]
async fn test_missing_reason_is_rejected() {
    let app = TestApp::new();
    let asset = app.seed_asset().await;
    let user = app.seed_user().await;

    let response = app
        .router
        .clone()
        .oneshot(json_request(
            Method::POST,
            &uri(asset.id, "out-of-service"),
            Some(&user.token),
            Some(json!({"date": "2024-01-10", "reportedBy": "J. Lee"})),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = parse_response_body(response).await;
    assert_eq!(body["message"], "reason is required");
    assert_eq!(app.store.audit_len().await, 0);
}

#[tokio::test]
async fn test_empty_body_reports_date_first() {
    let app = TestApp::new();
    let asset = app.seed_asset().await;
    let user = app.seed_user().await;

    let response = app
        .router
        .clone()
        .oneshot(json_request(
            Method::POST,
            &uri(asset.id, "return-to-service"),
            Some(&user.token),
            Some(json!({})),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = parse_response_body(response).await;
    assert_eq!(body["message"], "date is required");
}

#[tokio::test]
async fn test_double_out_of_service_conflicts() {
    let app = TestApp::new();
    let asset = app.seed_asset().await;
    let user = app.seed_user().await;

    for expected in [StatusCode::OK, StatusCode::CONFLICT] {
        let response = app
            .router
            .clone()
            .oneshot(json_request(
                Method::POST,
                &uri(asset.id, "out-of-service"),
                Some(&user.token),
                Some(out_of_service_body()),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), expected);
    }
    assert_eq!(app.store.audit_len().await, 2);
}

#[tokio::test]
async fn test_return_while_in_service_conflicts() {
    let app = TestApp::new();
    let asset = app.seed_asset().await;
    let user = app.seed_user().await;

    let response = app
        .router
        .clone()
        .oneshot(json_request(
            Method::POST,
            &uri(asset.id, "return-to-service"),
            Some(&user.token),
            Some(return_body()),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CONFLICT);
    let body = parse_response_body(response).await;
    assert_eq!(body["message"], "not out of service");
}

#[tokio::test]
async fn test_unknown_asset_is_not_found() {
    let app = TestApp::new();
    let user = app.seed_user().await;

    let response = app
        .router
        .clone()
        .oneshot(json_request(
            Method::POST,
            &uri(Uuid::new_v4(), "out-of-service"),
            Some(&user.token),
            Some(out_of_service_body()),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_other_company_cannot_see_asset() {
    let app = TestApp::new();
    let asset = app.seed_asset().await;
    let outsider = token_for(Uuid::new_v4(), Uuid::new_v4());

    let response = app
        .router
        .clone()
        .oneshot(json_request(
            Method::GET,
            &uri(asset.id, "service-status"),
            Some(&outsider),
            None,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_user_without_profile_is_unknown_user() {
    let app = TestApp::new();
    let asset = app.seed_asset().await;
    let token = token_for(Uuid::new_v4(), app.company_id);

    for (action, body) in [
        ("out-of-service", out_of_service_body()),
        ("return-to-service", return_body()),
    ] {
        let response = app
            .router
            .clone()
            .oneshot(json_request(
                Method::POST,
                &uri(asset.id, action),
                Some(&token),
                Some(body),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    let response = app
        .router
        .clone()
        .oneshot(json_request(
            Method::GET,
            &uri(asset.id, "service-status"),
            Some(&token),
            None,
        ))
        .await
        .unwrap();
    let body = parse_response_body(response).await;
    assert_eq!(body["returnToServiceVerifiedBy"], "Unknown User");
}

#[tokio::test]
async fn test_status_summary_entries_can_be_disabled() {
    let mut config = test_config();
    config.lifecycle.record_status_summary = false;
    let app = TestApp::with_config(config);
    let asset = app.seed_asset().await;
    let user = app.seed_user().await;

    let response = app
        .router
        .clone()
        .oneshot(json_request(
            Method::POST,
            &uri(asset.id, "out-of-service"),
            Some(&user.token),
            Some(out_of_service_body()),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(app.store.audit_len().await, 1);
}

#[tokio::test]
async fn test_storage_failure_is_internal_error() {
    let app = TestApp::new();
    let asset = app.seed_asset().await;
    let user = app.seed_user().await;
    app.store.fail_commits(true);

    let response = app
        .router
        .clone()
        .oneshot(json_request(
            Method::POST,
            &uri(asset.id, "out-of-service"),
            Some(&user.token),
            Some(out_of_service_body()),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = parse_response_body(response).await;
    assert_eq!(body["message"], "An internal error occurred");
}

#[tokio::test]
async fn test_response_carries_request_id() {
    let app = TestApp::new();
    let asset = app.seed_asset().await;
    let user = app.seed_user().await;

    let mut request = json_request(
        Method::GET,
        &uri(asset.id, "service-status"),
        Some(&user.token),
        None,
    );
    request
        .headers_mut()
        .insert("X-Request-ID", "req-42".parse().unwrap());

    let response = app.router.clone().oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()["x-request-id"], "req-42");
}
