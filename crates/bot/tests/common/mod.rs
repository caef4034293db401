#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use chatlink_bot::{BotConfig, BotServices, UpdateOutcome};
use chatlink_core::clock::ManualClock;
use chatlink_core::domain::{Tenant, TenantUser};
use chatlink_core::types::{ExternalId, Timestamp};
use chatlink_db::{MemoryStore, Stores};
use chatlink_telegram::{DryRunTransport, Update};
use chrono::{TimeZone, Utc};
use serde_json::json;

pub const TENANT: &str = "acme";
pub const USER: &str = "u1";
pub const EXTERNAL_ID: ExternalId = 4242;

pub fn start_time() -> Timestamp {
    Utc.with_ymd_and_hms(2024, 5, 1, 9, 0, 0).unwrap()
}

/// Everything a router test needs, backed by the in-memory store and the
/// dry-run transport.
pub struct Harness {
    pub store: Arc<MemoryStore>,
    pub clock: Arc<ManualClock>,
    pub transport: Arc<DryRunTransport>,
    pub bot: BotServices,
    next_update_id: std::sync::atomic::AtomicI64,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_config(BotConfig::default())
    }

    pub fn with_config(config: BotConfig) -> Self {
        let store = Arc::new(MemoryStore::new());
        let clock = Arc::new(ManualClock::new(start_time()));
        let transport = Arc::new(DryRunTransport::new());
        let config = BotConfig {
            app_base_url: "https://app.example.com".into(),
            retry_delays: vec![Duration::ZERO; 3],
            ..config
        };
        let bot = BotServices::new(
            &Stores::memory(store.clone()),
            transport.clone(),
            clock.clone(),
            config,
        );

        store.insert_tenant(Tenant {
            id: TENANT.into(),
            name: "Acme".into(),
        });
        store.insert_user(TenantUser {
            id: USER.into(),
            tenant_id: TENANT.into(),
            display_name: "Ada Lovelace".into(),
            timezone: Some("Asia/Tokyo".into()),
        });

        Self {
            store,
            clock,
            transport,
            bot,
            next_update_id: std::sync::atomic::AtomicI64::new(1),
        }
    }

    fn update_id(&self) -> i64 {
        self.next_update_id
            .fetch_add(1, std::sync::atomic::Ordering::SeqCst)
    }

    /// Deliver a text message from `from` in their private chat.
    pub async fn say(&self, from: ExternalId, text: &str) -> UpdateOutcome {
        let update = text_update(self.update_id(), from, text);
        self.bot.router.handle_update(&update).await
    }

    pub async fn press(&self, from: ExternalId, data: &str) -> UpdateOutcome {
        let update = callback_update(self.update_id(), from, data);
        self.bot.router.handle_update(&update).await
    }

    pub fn last_reply(&self) -> String {
        self.transport.last_text().unwrap_or_default()
    }

    /// Issue a code for the seeded user and redeem it from [`EXTERNAL_ID`].
    pub async fn link_default_user(&self) {
        let issued = self
            .bot
            .authority
            .generate_code(USER, TENANT)
            .await
            .unwrap();
        let outcome = self.say(EXTERNAL_ID, &format!("/start {}", issued.code)).await;
        assert_eq!(outcome, UpdateOutcome::Handled);
        assert!(self.bot.links.resolve(EXTERNAL_ID).await.unwrap().is_some());
        self.transport.clear();
    }
}

pub fn text_update(update_id: i64, from: ExternalId, text: &str) -> Update {
    serde_json::from_value(json!({
        "update_id": update_id,
        "message": {
            "message_id": update_id,
            "from": {"id": from, "is_bot": false, "first_name": "Ada", "username": "ada"},
            "chat": {"id": from, "type": "private"},
            "date": 1714554000,
            "text": text
        }
    }))
    .unwrap()
}

pub fn callback_update(update_id: i64, from: ExternalId, data: &str) -> Update {
    serde_json::from_value(json!({
        "update_id": update_id,
        "callback_query": {
            "id": format!("cb-{update_id}"),
            "from": {"id": from, "first_name": "Ada"},
            "message": {"message_id": update_id, "chat": {"id": from}, "date": 1714554000},
            "data": data
        }
    }))
    .unwrap()
}
