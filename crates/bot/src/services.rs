//! Process-wide wiring.
//!
//! Every component is built once from the shared stores, transport, and
//! clock, and reused across webhook requests.

use std::sync::Arc;
use std::time::Duration;

use chatlink_core::clock::Clock;
use chatlink_core::identity::RelinkPolicy;
use chatlink_core::linking::DEFAULT_CODE_TTL_SECS;
use chatlink_db::Stores;
use chatlink_telegram::ChatTransport;

use crate::authority::LinkingCodeAuthority;
use crate::dispatcher::{NotificationDispatcher, DEFAULT_RETRY_DELAYS_MS};
use crate::identity::IdentityLinks;
use crate::ledger::ChatLedger;
use crate::router::CommandRouter;

/// Default "seen update id" window in seconds.
pub const DEFAULT_DEDUP_TTL_SECS: i64 = 600;

#[derive(Debug, Clone)]
pub struct BotConfig {
    /// Bot handle without `@`, used for deep links and `/cmd@bot` matching.
    pub bot_username: String,
    /// Base URL of the web app, target of action buttons.
    pub app_base_url: String,
    pub code_ttl: chrono::Duration,
    pub relink_policy: RelinkPolicy,
    pub dedup_ttl: chrono::Duration,
    pub retry_delays: Vec<Duration>,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            bot_username: "chatlink_bot".to_string(),
            app_base_url: "http://localhost:5173".to_string(),
            code_ttl: chrono::Duration::seconds(DEFAULT_CODE_TTL_SECS),
            relink_policy: RelinkPolicy::default(),
            dedup_ttl: chrono::Duration::seconds(DEFAULT_DEDUP_TTL_SECS),
            retry_delays: DEFAULT_RETRY_DELAYS_MS
                .iter()
                .map(|ms| Duration::from_millis(*ms))
                .collect(),
        }
    }
}

#[derive(Clone)]
pub struct BotServices {
    pub authority: Arc<LinkingCodeAuthority>,
    pub links: Arc<IdentityLinks>,
    pub ledger: Arc<ChatLedger>,
    pub router: Arc<CommandRouter>,
    pub dispatcher: Arc<NotificationDispatcher>,
    pub config: Arc<BotConfig>,
}

impl BotServices {
    pub fn new(
        stores: &Stores,
        transport: Arc<dyn ChatTransport>,
        clock: Arc<dyn Clock>,
        config: BotConfig,
    ) -> Self {
        let config = Arc::new(config);

        let authority = Arc::new(LinkingCodeAuthority::new(
            stores.codes.clone(),
            clock.clone(),
            config.code_ttl,
        ));
        let links = Arc::new(IdentityLinks::new(
            stores.links.clone(),
            clock.clone(),
            config.relink_policy,
        ));
        let ledger = Arc::new(ChatLedger::new(
            stores.chats.clone(),
            links.clone(),
            clock.clone(),
        ));
        let dispatcher = Arc::new(
            NotificationDispatcher::new(
                links.clone(),
                ledger.clone(),
                transport.clone(),
                clock.clone(),
                config.app_base_url.clone(),
            )
            .with_retry_delays(config.retry_delays.clone()),
        );
        let router = Arc::new(CommandRouter {
            authority: authority.clone(),
            links: links.clone(),
            ledger: ledger.clone(),
            directory: stores.directory.clone(),
            updates: stores.updates.clone(),
            transport,
            clock,
            config: config.clone(),
        });

        Self {
            authority,
            links,
            ledger,
            router,
            dispatcher,
            config,
        }
    }
}
