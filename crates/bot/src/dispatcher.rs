//! Outbound notifications with bounded retry.
//!
//! [`NotificationDispatcher`] reverse-resolves a tenant user to their linked
//! chat, renders the template for the notification type, and sends it.
//! Retryable transport errors back off along the configured schedule; a
//! permanent failure (bot blocked, chat gone) deactivates the link.

use std::sync::Arc;
use std::time::Duration;

use chatlink_core::clock::Clock;
use chatlink_core::notification::{render, NotificationType};
use chatlink_core::types::{ExternalId, UserId};
use chatlink_telegram::{ChatTransport, InlineKeyboardMarkup, OutboundMessage, SentMessage, TransportError};
use futures::stream::{self, StreamExt};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::identity::IdentityLinks;
use crate::ledger::ChatLedger;

/// Default backoff schedule (milliseconds) between send attempts.
pub const DEFAULT_RETRY_DELAYS_MS: [u64; 3] = [500, 1000, 2000];

/// How many notifications of one batch are in flight at once.
const BATCH_CONCURRENCY: usize = 8;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationRequest {
    pub user_id: UserId,
    #[serde(rename = "type")]
    pub kind: NotificationType,
    #[serde(default)]
    pub payload: Value,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryOutcome {
    Sent,
    /// The user has no active link. Expected, not an error.
    NotLinked,
    Failed,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BatchReport {
    pub sent: usize,
    pub skipped: usize,
    pub failed: usize,
}

impl BatchReport {
    fn record(&mut self, outcome: DeliveryOutcome) {
        match outcome {
            DeliveryOutcome::Sent => self.sent += 1,
            DeliveryOutcome::NotLinked => self.skipped += 1,
            DeliveryOutcome::Failed => self.failed += 1,
        }
    }
}

// ---------------------------------------------------------------------------
// NotificationDispatcher
// ---------------------------------------------------------------------------

pub struct NotificationDispatcher {
    links: Arc<IdentityLinks>,
    ledger: Arc<ChatLedger>,
    transport: Arc<dyn ChatTransport>,
    clock: Arc<dyn Clock>,
    app_base_url: String,
    retry_delays: Vec<Duration>,
}

impl NotificationDispatcher {
    pub fn new(
        links: Arc<IdentityLinks>,
        ledger: Arc<ChatLedger>,
        transport: Arc<dyn ChatTransport>,
        clock: Arc<dyn Clock>,
        app_base_url: impl Into<String>,
    ) -> Self {
        Self {
            links,
            ledger,
            transport,
            clock,
            app_base_url: app_base_url.into(),
            retry_delays: DEFAULT_RETRY_DELAYS_MS
                .iter()
                .map(|ms| Duration::from_millis(*ms))
                .collect(),
        }
    }

    pub fn with_retry_delays(mut self, delays: Vec<Duration>) -> Self {
        self.retry_delays = delays;
        self
    }

    /// Send one notification. `false` covers both "no linked chat" and
    /// delivery failure; neither is raised as an error.
    pub async fn send(&self, tenant_user_id: &str, kind: NotificationType, payload: &Value) -> bool {
        self.deliver(None, tenant_user_id, kind, payload).await == DeliveryOutcome::Sent
    }

    /// Like [`send`](Self::send), but only to a link inside `tenant_id`.
    pub async fn send_in_tenant(
        &self,
        tenant_id: &str,
        tenant_user_id: &str,
        kind: NotificationType,
        payload: &Value,
    ) -> DeliveryOutcome {
        self.deliver(Some(tenant_id), tenant_user_id, kind, payload)
            .await
    }

    /// Send every request. Individual failures are counted, never abort
    /// the batch.
    pub async fn send_batch(&self, tenant_id: Option<&str>, requests: &[NotificationRequest]) -> BatchReport {
        // Collected first: a stream that maps over borrowed requests is not `Send`.
        let deliveries: Vec<_> = requests
            .iter()
            .map(|request| self.deliver(tenant_id, &request.user_id, request.kind, &request.payload))
            .collect();
        let outcomes: Vec<DeliveryOutcome> = stream::iter(deliveries)
            .buffer_unordered(BATCH_CONCURRENCY)
            .collect()
            .await;

        let mut report = BatchReport::default();
        for outcome in outcomes {
            report.record(outcome);
        }
        tracing::info!(
            sent = report.sent,
            skipped = report.skipped,
            failed = report.failed,
            "Notification batch finished"
        );
        report
    }

    async fn deliver(
        &self,
        tenant_id: Option<&str>,
        tenant_user_id: &str,
        kind: NotificationType,
        payload: &Value,
    ) -> DeliveryOutcome {
        let link = match self.links.resolve_by_tenant_user(tenant_id, tenant_user_id).await {
            Ok(Some(link)) => link,
            Ok(_) => {
                tracing::debug!(tenant_user_id, kind = %kind, "No linked chat, notification skipped");
                return DeliveryOutcome::NotLinked;
            }
            Err(e) => {
                tracing::error!(tenant_user_id, error = %e, "Link lookup failed");
                return DeliveryOutcome::Failed;
            }
        };

        let rendered = render(kind, payload, &self.app_base_url);
        let text = rendered.text();
        let message = OutboundMessage::text(link.external_id, &text)
            .with_keyboard(InlineKeyboardMarkup::from_actions(&rendered.buttons));

        match self.send_with_retry(&message).await {
            Ok(sent) => {
                if let Err(e) = self
                    .ledger
                    .record_outbound(sent.chat_id, sent.message_id, &text, self.clock.now())
                    .await
                {
                    tracing::error!(chat_id = sent.chat_id, error = %e, "Failed to log notification");
                }
                tracing::info!(tenant_user_id, kind = %kind, "Notification sent");
                DeliveryOutcome::Sent
            }
            Err(e) if e.is_permanent() => {
                tracing::warn!(
                    tenant_user_id,
                    external_id = link.external_id,
                    error = %e,
                    "Chat unreachable, deactivating link"
                );
                self.deactivate(link.external_id).await;
                DeliveryOutcome::Failed
            }
            Err(e) => {
                tracing::error!(tenant_user_id, kind = %kind, error = %e, "Notification delivery failed");
                DeliveryOutcome::Failed
            }
        }
    }

    /// Send, retrying retryable errors along `retry_delays`.
    async fn send_with_retry(&self, message: &OutboundMessage) -> Result<SentMessage, TransportError> {
        let mut delays = self.retry_delays.iter();
        let mut attempt = 1;
        loop {
            match self.transport.send_message(message).await {
                Ok(sent) => return Ok(sent),
                Err(e) if e.is_retryable() => {
                    let Some(delay) = delays.next() else {
                        return Err(e);
                    };
                    tracing::warn!(
                        attempt,
                        chat_id = message.chat_id,
                        error = %e,
                        "Notification send attempt failed, retrying"
                    );
                    attempt += 1;
                    tokio::time::sleep(*delay).await;
                }
                Err(e) => return Err(e),
            }
        }
    }

    async fn deactivate(&self, external_id: ExternalId) {
        match self.links.unlink(external_id).await {
            Ok(Some(_)) => {
                if let Err(e) = self.ledger.propagate_linkage(external_id, None).await {
                    tracing::error!(external_id, error = %e, "Failed to propagate unlink");
                }
            }
            Ok(None) => {}
            Err(e) => tracing::error!(external_id, error = %e, "Failed to deactivate link"),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
