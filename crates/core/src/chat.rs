//! Chat ledger records.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::types::{ChatId, ExternalId, MessageId, TenantId, Timestamp, UserId};

/// Profile of the platform user who sent a message.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SenderProfile {
    pub external_id: ExternalId,
    pub username: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

impl SenderProfile {
    pub fn new(external_id: ExternalId) -> Self {
        Self {
            external_id,
            ..Self::default()
        }
    }

    /// Best human-readable name: first name, then `@username`, then the id.
    pub fn display_name(&self) -> String {
        match (&self.first_name, &self.username) {
            (Some(first), _) if !first.is_empty() => first.clone(),
            (_, Some(username)) if !username.is_empty() => format!("@{username}"),
            _ => self.external_id.to_string(),
        }
    }
}

/// Point-in-time copy of an identity link stored on chat records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkageSnapshot {
    pub tenant_user_id: UserId,
    pub tenant_id: TenantId,
}

/// Metadata for one conversation.
///
/// `is_linked`, `tenant_user_id`, and `tenant_id` are a snapshot taken at the
/// last inbound message or the last linkage propagation, not a live join.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatRecord {
    pub chat_id: ChatId,
    pub external_user_id: ExternalId,
    pub tenant_user_id: Option<UserId>,
    pub tenant_id: Option<TenantId>,
    pub is_linked: bool,
    pub last_message_text: String,
    pub last_message_at: Timestamp,
    pub message_count: i64,
    pub sender_profile: SenderProfile,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl ChatRecord {
    pub fn linkage(&self) -> Option<LinkageSnapshot> {
        match (&self.tenant_user_id, &self.tenant_id) {
            (Some(user), Some(tenant)) if self.is_linked => Some(LinkageSnapshot {
                tenant_user_id: user.clone(),
                tenant_id: tenant.clone(),
            }),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Incoming,
    Outgoing,
}

impl Direction {
    pub fn as_str(self) -> &'static str {
        match self {
            Direction::Incoming => "incoming",
            Direction::Outgoing => "outgoing",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Direction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "incoming" => Ok(Direction::Incoming),
            "outgoing" => Ok(Direction::Outgoing),
            other => Err(format!("unknown message direction '{other}'")),
        }
    }
}

/// One entry of the append-only per-chat message log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatMessage {
    pub message_id: MessageId,
    pub chat_id: ChatId,
    pub text: String,
    /// Sender for incoming messages; `None` for messages the bot sent.
    pub from_external_id: Option<ExternalId>,
    pub direction: Direction,
    pub timestamp: Timestamp,
}

/// Everything the store needs to record one inbound message atomically.
#[derive(Debug, Clone)]
pub struct InboundMessage {
    pub chat_id: ChatId,
    pub message_id: MessageId,
    pub text: String,
    pub sender: SenderProfile,
    pub linkage: Option<LinkageSnapshot>,
    pub received_at: Timestamp,
}

impl InboundMessage {
    pub fn to_log_entry(&self) -> ChatMessage {
        ChatMessage {
            message_id: self.message_id,
            chat_id: self.chat_id,
            text: self.text.clone(),
            from_external_id: Some(self.sender.external_id),
            direction: Direction::Incoming,
            timestamp: self.received_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_name_prefers_first_name() {
        let mut profile = SenderProfile::new(42);
        assert_eq!(profile.display_name(), "42");

        profile.username = Some("ada".into());
        assert_eq!(profile.display_name(), "@ada");

        profile.first_name = Some("Ada".into());
        assert_eq!(profile.display_name(), "Ada");
    }

    #[test]
    fn direction_parses_its_own_output() {
        for dir in [Direction::Incoming, Direction::Outgoing] {
            assert_eq!(dir.as_str().parse::<Direction>(), Ok(dir));
        }
        assert!("sideways".parse::<Direction>().is_err());
    }
}
