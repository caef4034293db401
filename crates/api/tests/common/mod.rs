#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{Method, Request, Response};
use axum::Router;
use chatlink_api::auth::jwt::{generate_access_token, JwtConfig};
use chatlink_api::config::{ServerConfig, StoreBackend, TelegramConfig, TelegramMode};
use chatlink_api::router::build_app_router;
use chatlink_api::state::AppState;
use chatlink_bot::BotServices;
use chatlink_core::clock::SystemClock;
use chatlink_core::domain::{Tenant, TenantUser};
use chatlink_core::identity::RelinkPolicy;
use chatlink_db::{MemoryStore, Stores};
use chatlink_telegram::DryRunTransport;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

pub const WEBHOOK_SECRET: &str = "hook-secret";

/// Build a test `ServerConfig` with safe defaults.
///
/// Uses `http://localhost:5173` as CORS origin (matching the dev default),
/// the in-memory store, and the dry-run transport.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        update_deadline_secs: 5,
        store_backend: StoreBackend::Memory,
        database_url: None,
        jwt: JwtConfig {
            secret: "test-secret-that-is-long-enough-for-hmac".to_string(),
            access_token_expiry_mins: 15,
        },
        telegram: TelegramConfig {
            mode: TelegramMode::DryRun,
            bot_token: None,
            bot_username: "chatlink_bot".to_string(),
            api_base: "http://127.0.0.1:9".to_string(),
            webhook_secret: Some(WEBHOOK_SECRET.to_string()),
        },
        app_base_url: "https://app.example.com".to_string(),
        linking_code_ttl_secs: 300,
        relink_policy: RelinkPolicy::Overwrite,
        update_dedup_ttl_secs: 600,
        eod_reminder_hour: 18,
        notify_retry_delays_ms: vec![0, 0, 0],
    }
}

/// The full application plus handles on its in-memory backends.
pub struct TestApp {
    pub router: Router,
    pub store: Arc<MemoryStore>,
    pub transport: Arc<DryRunTransport>,
    pub services: BotServices,
    pub config: ServerConfig,
}

impl TestApp {
    pub fn token(&self, user_id: &str, tenant_id: &str, role: &str) -> String {
        generate_access_token(user_id, tenant_id, role, &self.config.jwt)
            .expect("token generation should succeed")
    }

    /// Fresh clone of the router for a single `oneshot` call.
    pub fn app(&self) -> Router {
        self.router.clone()
    }
}

/// Build the application router with the same middleware stack production
/// uses, seeded with tenants `acme` (users `u1`, `u2`, `boss`) and `globex`
/// (user `g1`).
pub fn build_test_app() -> TestApp {
    build_test_app_with(test_config(), |_, _| {})
}

/// Like [`build_test_app`], with a custom config and a hook to replace
/// individual store handles (wrapping the shared memory store) before the
/// services are built.
pub fn build_test_app_with(
    config: ServerConfig,
    customize: impl FnOnce(&Arc<MemoryStore>, &mut Stores),
) -> TestApp {
    let store = Arc::new(MemoryStore::new());
    let transport = Arc::new(DryRunTransport::new());
    let mut stores = Stores::memory(store.clone());
    customize(&store, &mut stores);
    let mut bot_config = config.bot_config();
    bot_config.retry_delays = vec![Duration::ZERO; 3];
    let services = BotServices::new(&stores, transport.clone(), Arc::new(SystemClock), bot_config);

    store.insert_tenant(Tenant { id: "acme".into(), name: "Acme".into() });
    store.insert_tenant(Tenant { id: "globex".into(), name: "Globex".into() });
    for (id, tenant) in [("u1", "acme"), ("u2", "acme"), ("boss", "acme"), ("g1", "globex")] {
        store.insert_user(TenantUser {
            id: id.into(),
            tenant_id: tenant.into(),
            display_name: id.to_uppercase(),
            timezone: Some("UTC".into()),
        });
    }

    let state = AppState {
        services: services.clone(),
        stores,
        config: Arc::new(config.clone()),
    };
    let router = build_app_router(state, &config);

    TestApp {
        router,
        store,
        transport,
        services,
        config,
    }
}

/// Link `user_id` to `external_id` the way a real user does: issue a code
/// over HTTP, then send `/start <code>` through the webhook.
pub async fn link_via_chat(app: &TestApp, user_id: &str, tenant_id: &str, external_id: i64, update_id: i64) {
    let code = issue_code(app, user_id, tenant_id).await;
    let response = post_webhook(app.app(), text_update(update_id, external_id, &format!("/start {code}")), Some(WEBHOOK_SECRET)).await;
    assert_eq!(response.status(), 200);
}

/// Issue a linking code for `user_id` over HTTP.
pub async fn issue_code(app: &TestApp, user_id: &str, tenant_id: &str) -> String {
    let token = app.token(user_id, tenant_id, "member");
    let response = post_json_auth(app.app(), "/api/v1/linking-codes", json!({}), &token).await;
    assert_eq!(response.status(), 201);
    body_json(response).await["data"]["code"]
        .as_str()
        .unwrap()
        .to_string()
}

pub fn text_update(update_id: i64, from: i64, text: &str) -> Value {
    json!({
        "update_id": update_id,
        "message": {
            "message_id": update_id,
            "from": {"id": from, "is_bot": false, "first_name": "Ada"},
            "chat": {"id": from, "type": "private"},
            "date": 1714554000,
            "text": text
        }
    })
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

pub async fn body_json(response: Response<Body>) -> Value {
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("body should be readable")
        .to_bytes();
    serde_json::from_slice(&bytes).expect("body should be JSON")
}

async fn send(app: Router, request: Request<Body>) -> Response<Body> {
    app.oneshot(request).await.expect("request should complete")
}

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
    send(app, request).await
}

pub async fn get_auth(app: Router, uri: &str, token: &str) -> Response<Body> {
    let request = Request::builder()
        .uri(uri)
        .header("Authorization", format!("Bearer {token}"))
        .body(Body::empty())
        .unwrap();
    send(app, request).await
}

pub async fn delete_auth(app: Router, uri: &str, token: &str) -> Response<Body> {
    let request = Request::builder()
        .method(Method::DELETE)
        .uri(uri)
        .header("Authorization", format!("Bearer {token}"))
        .body(Body::empty())
        .unwrap();
    send(app, request).await
}

pub async fn post_json(app: Router, uri: &str, body: Value) -> Response<Body> {
    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header("Content-Type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    send(app, request).await
}

pub async fn post_json_auth(app: Router, uri: &str, body: Value, token: &str) -> Response<Body> {
    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header("Content-Type", "application/json")
        .header("Authorization", format!("Bearer {token}"))
        .body(Body::from(body.to_string()))
        .unwrap();
    send(app, request).await
}

pub async fn post_webhook(app: Router, update: Value, secret: Option<&str>) -> Response<Body> {
    post_webhook_raw(app, update.to_string(), secret).await
}

pub async fn post_webhook_raw(app: Router, body: String, secret: Option<&str>) -> Response<Body> {
    let mut builder = Request::builder()
        .method(Method::POST)
        .uri("/webhooks/telegram")
        .header("Content-Type", "application/json");
    if let Some(secret) = secret {
        builder = builder.header("X-Telegram-Bot-Api-Secret-Token", secret);
    }
    send(app, builder.body(Body::from(body)).unwrap()).await
}
