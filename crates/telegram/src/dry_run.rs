//! A transport that records instead of sending.
//!
//! Selected with `TELEGRAM_MODE=dry-run`, and used by every test that needs
//! to observe what the bot would have sent. Failures can be scripted with
//! [`DryRunTransport::fail_next`].

use std::collections::VecDeque;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use chatlink_core::types::ChatId;
use chrono::Utc;

use crate::error::TransportError;
use crate::outbound::{OutboundMessage, SentMessage};
use crate::transport::ChatTransport;

/// First message id handed out; keeps dry-run ids clear of inbound ids in logs.
const FIRST_MESSAGE_ID: i64 = 1_000_000;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnsweredCallback {
    pub callback_query_id: String,
    pub text: Option<String>,
}

#[derive(Default)]
struct Recorded {
    sent: Vec<OutboundMessage>,
    answered: Vec<AnsweredCallback>,
    failures: VecDeque<(u16, String)>,
    attempts: usize,
}

pub struct DryRunTransport {
    recorded: Mutex<Recorded>,
    next_id: AtomicI64,
}

impl Default for DryRunTransport {
    fn default() -> Self {
        Self {
            recorded: Mutex::default(),
            next_id: AtomicI64::new(FIRST_MESSAGE_ID),
        }
    }
}

impl DryRunTransport {
    pub fn new() -> Self {
        Self::default()
    }

    fn recorded(&self) -> MutexGuard<'_, Recorded> {
        self.recorded.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Make the next `send_message` call fail with an API error.
    /// Calls queue up and are consumed in order.
    pub fn fail_next(&self, status: u16, description: impl Into<String>) {
        self.recorded()
            .failures
            .push_back((status, description.into()));
    }

    /// Every message that was "delivered", oldest first.
    pub fn sent(&self) -> Vec<OutboundMessage> {
        self.recorded().sent.clone()
    }

    pub fn sent_to(&self, chat_id: ChatId) -> Vec<OutboundMessage> {
        self.recorded()
            .sent
            .iter()
            .filter(|m| m.chat_id == chat_id)
            .cloned()
            .collect()
    }

    pub fn last_text(&self) -> Option<String> {
        self.recorded().sent.last().map(|m| m.text.clone())
    }

    pub fn answered(&self) -> Vec<AnsweredCallback> {
        self.recorded().answered.clone()
    }

    /// Number of `send_message` calls, including scripted failures.
    pub fn attempts(&self) -> usize {
        self.recorded().attempts
    }

    pub fn clear(&self) {
        let mut recorded = self.recorded();
        recorded.sent.clear();
        recorded.answered.clear();
        recorded.attempts = 0;
    }
}

#[async_trait]
impl ChatTransport for DryRunTransport {
    async fn send_message(&self, message: &OutboundMessage) -> Result<SentMessage, TransportError> {
        let mut recorded = self.recorded();
        recorded.attempts += 1;
        if let Some((status, description)) = recorded.failures.pop_front() {
            return Err(TransportError::Api {
                status,
                description,
            });
        }
        recorded.sent.push(message.clone());
        drop(recorded);

        let message_id = self.next_id.fetch_add(1, Ordering::SeqCst);
        tracing::debug!(chat_id = message.chat_id, message_id, text = %message.text, "Dry-run send");
        Ok(SentMessage {
            message_id,
            chat_id: message.chat_id,
            sent_at: Utc::now(),
        })
    }

    async fn answer_callback(
        &self,
        callback_query_id: &str,
        text: Option<&str>,
    ) -> Result<(), TransportError> {
        self.recorded().answered.push(AnsweredCallback {
            callback_query_id: callback_query_id.to_string(),
            text: text.map(str::to_string),
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[tokio::test]
    async fn records_messages_and_hands_out_ids() {
        let transport = DryRunTransport::new();
        let first = transport
            .send_message(&OutboundMessage::text(1, "one"))
            .await
            .unwrap();
        let second = transport
            .send_message(&OutboundMessage::text(2, "two"))
            .await
            .unwrap();

        assert!(second.message_id > first.message_id);
        assert_eq!(transport.sent_to(2)[0].text, "two");
        assert_eq!(transport.last_text().as_deref(), Some("two"));
    }

    #[tokio::test]
    async fn scripted_failures_are_consumed_in_order() {
        let transport = DryRunTransport::new();
        transport.fail_next(429, "Too Many Requests");
        transport.fail_next(403, "Forbidden: bot was blocked by the user");

        let message = OutboundMessage::text(1, "hi");
        assert_matches!(
            transport.send_message(&message).await,
            Err(TransportError::Api { status: 429, .. })
        );
        assert_matches!(
            transport.send_message(&message).await,
            Err(e) if e.is_permanent()
        );
        assert!(transport.send_message(&message).await.is_ok());
        assert_eq!(transport.attempts(), 3);
        assert_eq!(transport.sent().len(), 1);
    }
}
