//! The chat ledger: per-chat metadata plus an append-only message log.

use std::sync::Arc;

use chatlink_core::chat::{
    ChatMessage, ChatRecord, Direction, InboundMessage, LinkageSnapshot, SenderProfile,
};
use chatlink_core::clock::Clock;
use chatlink_core::types::{ChatId, ExternalId, MessageId, Timestamp};
use chatlink_db::ChatStore;

use crate::error::BotResult;
use crate::identity::IdentityLinks;

/// Upper bound on a single message-log page.
pub const MAX_MESSAGE_PAGE: i64 = 200;

pub struct ChatLedger {
    chats: Arc<dyn ChatStore>,
    links: Arc<IdentityLinks>,
    clock: Arc<dyn Clock>,
}

impl ChatLedger {
    pub fn new(chats: Arc<dyn ChatStore>, links: Arc<IdentityLinks>, clock: Arc<dyn Clock>) -> Self {
        Self {
            chats,
            links,
            clock,
        }
    }

    /// Record an inbound message, snapshotting the sender's current link.
    pub async fn record_inbound(
        &self,
        chat_id: ChatId,
        message_id: MessageId,
        text: &str,
        sender: &SenderProfile,
    ) -> BotResult<ChatRecord> {
        let linkage = self
            .links
            .resolve(sender.external_id)
            .await?
            .map(|link| link.snapshot());

        let message = InboundMessage {
            chat_id,
            message_id,
            text: text.to_string(),
            sender: sender.clone(),
            linkage,
            received_at: self.clock.now(),
        };
        let chat = self.chats.record_inbound(&message).await?;
        tracing::debug!(chat_id, message_id, count = chat.message_count, "Inbound recorded");
        Ok(chat)
    }

    /// Append an outgoing message. Counters and last-message fields are
    /// inbound-only and stay untouched.
    pub async fn record_outbound(
        &self,
        chat_id: ChatId,
        message_id: MessageId,
        text: &str,
        sent_at: Timestamp,
    ) -> BotResult<bool> {
        let entry = ChatMessage {
            message_id,
            chat_id,
            text: text.to_string(),
            from_external_id: None,
            direction: Direction::Outgoing,
            timestamp: sent_at,
        };
        Ok(self.chats.record_outbound(&entry).await?)
    }

    /// Rewrite the linkage snapshot on every chat of `external_id`.
    /// `None` marks them unlinked.
    pub async fn propagate_linkage(
        &self,
        external_id: ExternalId,
        linkage: Option<&LinkageSnapshot>,
    ) -> BotResult<u64> {
        let updated = self
            .chats
            .set_linkage_for_external(external_id, linkage, self.clock.now())
            .await?;
        tracing::info!(external_id, linked = linkage.is_some(), updated, "Linkage propagated");
        Ok(updated)
    }

    /// Newest activity first.
    pub async fn list_by_tenant(&self, tenant_id: &str) -> BotResult<Vec<ChatRecord>> {
        Ok(self.chats.list_by_tenant(tenant_id).await?)
    }

    pub async fn find(&self, chat_id: ChatId) -> BotResult<Option<ChatRecord>> {
        Ok(self.chats.find_chat(chat_id).await?)
    }

    /// Newest messages first, at most `limit` (clamped to [`MAX_MESSAGE_PAGE`]).
    pub async fn messages(&self, chat_id: ChatId, limit: i64) -> BotResult<Vec<ChatMessage>> {
        Ok(self
            .chats
            .list_messages(chat_id, limit.clamp(1, MAX_MESSAGE_PAGE))
            .await?)
    }
}
