//! HTTP-level tests for linking codes and the caller's identity link.

mod common;

use axum::http::StatusCode;
use common::{body_json, delete_auth, get, get_auth, post_json, post_json_auth};
use serde_json::json;

#[tokio::test]
async fn linking_code_requires_auth() {
    let app = common::build_test_app();

    let response = post_json(app.app(), "/api/v1/linking-codes", json!({})).await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn issued_code_has_deep_link_and_expiry() {
    let app = common::build_test_app();
    let token = app.token("u1", "acme", "member");

    let response = post_json_auth(app.app(), "/api/v1/linking-codes", json!({}), &token).await;

    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    let code = json["data"]["code"].as_str().unwrap();
    assert_eq!(code.len(), 8);
    assert!(code.chars().all(|c| c.is_ascii_uppercase() || c.is_ascii_digit()));
    assert_eq!(
        json["data"]["deep_link"],
        format!("https://t.me/chatlink_bot?start={code}")
    );
    assert!(json["data"]["expires_at"].is_string());
}

#[tokio::test]
async fn identity_link_is_null_until_linked() {
    let app = common::build_test_app();
    let token = app.token("u1", "acme", "member");

    let json = body_json(get_auth(app.app(), "/api/v1/identity-link", &token).await).await;
    assert!(json["data"].is_null());

    common::link_via_chat(&app, "u1", "acme", 42, 1).await;

    let json = body_json(get_auth(app.app(), "/api/v1/identity-link", &token).await).await;
    assert_eq!(json["data"]["external_id"], 42);
    assert_eq!(json["data"]["tenant_id"], "acme");
    assert_eq!(json["data"]["active"], true);
}

#[tokio::test]
async fn identity_link_is_not_visible_from_another_tenant() {
    let app = common::build_test_app();
    common::link_via_chat(&app, "u1", "acme", 42, 1).await;
    // Same user id, different tenant claim.
    let foreign = app.token("u1", "globex", "member");

    let json = body_json(get_auth(app.app(), "/api/v1/identity-link", &foreign).await).await;
    assert!(json["data"].is_null());

    let response = delete_auth(app.app(), "/api/v1/identity-link", &foreign).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert!(app.services.links.resolve(42).await.unwrap().is_some());
}

#[tokio::test]
async fn unlink_from_app_marks_chat_unlinked() {
    let app = common::build_test_app();
    common::link_via_chat(&app, "u1", "acme", 42, 1).await;
    let token = app.token("u1", "acme", "member");

    let response = delete_auth(app.app(), "/api/v1/identity-link", &token).await;

    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    assert!(app.services.links.resolve(42).await.unwrap().is_none());
    let chat = app.services.ledger.find(42).await.unwrap().unwrap();
    assert!(!chat.is_linked);

    let response = delete_auth(app.app(), "/api/v1/identity-link", &token).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn garbage_token_is_rejected() {
    let app = common::build_test_app();

    let response = get_auth(app.app(), "/api/v1/identity-link", "not-a-jwt").await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = get(app.app(), "/api/v1/identity-link").await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}
