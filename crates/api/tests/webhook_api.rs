//! HTTP-level tests for the platform webhook.

mod common;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::http::StatusCode;
use chatlink_bot::messages;
use chatlink_core::chat::SenderProfile;
use chatlink_core::identity::{IdentityLink, NewIdentityLink};
use chatlink_core::types::{ExternalId, Timestamp};
use chatlink_db::{IdentityLinkStore, MemoryStore, StoreResult};
use common::{body_json, post_webhook, post_webhook_raw, text_update, WEBHOOK_SECRET};

#[tokio::test]
async fn wrong_secret_is_rejected_without_side_effects() {
    let app = common::build_test_app();

    for secret in [None, Some("nope")] {
        let response = post_webhook(app.app(), text_update(1, 42, "/start"), secret).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(body_json(response).await["code"], "UNAUTHORIZED");
    }
    assert!(app.transport.sent().is_empty());
}

#[tokio::test]
async fn start_is_acknowledged_and_answered() {
    let app = common::build_test_app();

    let response = post_webhook(app.app(), text_update(1, 42, "/start"), Some(WEBHOOK_SECRET)).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["ok"], true);
    assert_eq!(app.transport.last_text().as_deref(), Some(messages::ONBOARDING));
}

#[tokio::test]
async fn malformed_body_is_still_acknowledged() {
    let app = common::build_test_app();

    let response = post_webhook_raw(app.app(), "{not json".into(), Some(WEBHOOK_SECRET)).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert!(app.transport.sent().is_empty());
}

#[tokio::test]
async fn redelivered_update_has_no_second_effect() {
    let app = common::build_test_app();
    let update = text_update(7, 42, "/help");

    for _ in 0..3 {
        let response = post_webhook(app.app(), update.clone(), Some(WEBHOOK_SECRET)).await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    assert_eq!(app.transport.sent().len(), 1);
    let chat = app.services.ledger.find(42).await.unwrap().unwrap();
    assert_eq!(chat.message_count, 1);
}

#[tokio::test]
async fn store_outage_is_acknowledged() {
    let app = common::build_test_app();
    app.store.set_unavailable(true);

    let response = post_webhook(app.app(), text_update(3, 42, "/tasks"), Some(WEBHOOK_SECRET)).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(app.transport.last_text().as_deref(), Some(messages::TEMPORARY_FAILURE));
}

#[tokio::test]
async fn full_link_then_unlink_flow() {
    let app = common::build_test_app();
    common::link_via_chat(&app, "u1", "acme", 42, 10).await;
    assert!(app.transport.last_text().unwrap().contains("You're all set"));

    post_webhook(app.app(), text_update(11, 42, "/unlink"), Some(WEBHOOK_SECRET)).await;
    let confirm = serde_json::json!({
        "update_id": 12,
        "callback_query": {
            "id": "cb-12",
            "from": {"id": 42, "first_name": "Ada"},
            "data": "unlink_confirm"
        }
    });
    post_webhook(app.app(), confirm, Some(WEBHOOK_SECRET)).await;

    assert_eq!(app.transport.last_text().as_deref(), Some(messages::UNLINK_DONE));
    assert!(app.services.links.resolve(42).await.unwrap().is_none());
}

/// Link store whose writes take longer than the update deadline.
struct SlowLinks {
    inner: Arc<MemoryStore>,
    delay: Duration,
}

#[async_trait]
impl IdentityLinkStore for SlowLinks {
    async fn find_link(&self, external_id: ExternalId) -> StoreResult<Option<IdentityLink>> {
        self.inner.find_link(external_id).await
    }

    async fn upsert_link(
        &self,
        link: &NewIdentityLink,
        overwrite_active: bool,
    ) -> StoreResult<Option<IdentityLink>> {
        tokio::time::sleep(self.delay).await;
        self.inner.upsert_link(link, overwrite_active).await
    }

    async fn deactivate_link(
        &self,
        external_id: ExternalId,
        now: Timestamp,
    ) -> StoreResult<Option<IdentityLink>> {
        self.inner.deactivate_link(external_id, now).await
    }

    async fn update_profile(&self, profile: &SenderProfile, now: Timestamp) -> StoreResult<bool> {
        self.inner.update_profile(profile, now).await
    }

    async fn find_active_by_tenant_user(
        &self,
        tenant_id: Option<&str>,
        tenant_user_id: &str,
    ) -> StoreResult<Option<IdentityLink>> {
        self.inner.find_active_by_tenant_user(tenant_id, tenant_user_id).await
    }

    async fn list_active(&self) -> StoreResult<Vec<IdentityLink>> {
        self.inner.list_active().await
    }
}

#[tokio::test]
async fn link_completes_after_the_deadline_ack() {
    let mut config = common::test_config();
    config.update_deadline_secs = 1;
    let app = common::build_test_app_with(config, |store, stores| {
        stores.links = Arc::new(SlowLinks {
            inner: store.clone(),
            delay: Duration::from_millis(1500),
        });
    });
    let code = common::issue_code(&app, "u1", "acme").await;

    let started = std::time::Instant::now();
    let response = post_webhook(app.app(), text_update(20, 42, &format!("/start {code}")), Some(WEBHOOK_SECRET)).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(started.elapsed() < Duration::from_millis(1500));

    let mut linked = false;
    for _ in 0..50 {
        if app
            .transport
            .last_text()
            .is_some_and(|text| text.contains("You're all set"))
        {
            linked = true;
            break;
        }
        tokio::time::sleep(Duration::from_millis(100)).await;
    }
    assert!(linked, "the link reply should arrive after the ack");
    let link = app.store.find_link(42).await.unwrap().unwrap();
    assert!(link.active);
    assert_eq!(link.tenant_user_id, "u1");
    assert_eq!(link.tenant_id, "acme");

    // Sending the code again finds the link instead of a burned code.
    let response = post_webhook(app.app(), text_update(21, 42, &format!("/start {code}")), Some(WEBHOOK_SECRET)).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(app.transport.last_text().unwrap().contains("Welcome back"));
}
