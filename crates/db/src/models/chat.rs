//! Chat and chat message rows.

use chatlink_core::chat::{ChatMessage, ChatRecord, Direction, SenderProfile};
use chatlink_core::types::{ChatId, ExternalId, MessageId, Timestamp};
use sqlx::FromRow;

use crate::store::StoreError;

/// A row from the `chats` table. Sender profile columns are flattened.
#[derive(Debug, Clone, FromRow)]
pub struct ChatRow {
    pub chat_id: ChatId,
    pub external_user_id: ExternalId,
    pub tenant_user_id: Option<String>,
    pub tenant_id: Option<String>,
    pub is_linked: bool,
    pub last_message_text: String,
    pub last_message_at: Timestamp,
    pub message_count: i64,
    pub sender_username: Option<String>,
    pub sender_first_name: Option<String>,
    pub sender_last_name: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl From<ChatRow> for ChatRecord {
    fn from(row: ChatRow) -> Self {
        Self {
            chat_id: row.chat_id,
            external_user_id: row.external_user_id,
            tenant_user_id: row.tenant_user_id,
            tenant_id: row.tenant_id,
            is_linked: row.is_linked,
            last_message_text: row.last_message_text,
            last_message_at: row.last_message_at,
            message_count: row.message_count,
            sender_profile: SenderProfile {
                external_id: row.external_user_id,
                username: row.sender_username,
                first_name: row.sender_first_name,
                last_name: row.sender_last_name,
            },
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// A row from the `chat_messages` table.
#[derive(Debug, Clone, FromRow)]
pub struct ChatMessageRow {
    pub chat_id: ChatId,
    pub message_id: MessageId,
    pub text: String,
    pub from_external_id: Option<ExternalId>,
    pub direction: String,
    pub sent_at: Timestamp,
}

impl TryFrom<ChatMessageRow> for ChatMessage {
    type Error = StoreError;

    fn try_from(row: ChatMessageRow) -> Result<Self, Self::Error> {
        let direction: Direction = row.direction.parse().map_err(|detail| StoreError::Corrupt {
            table: "chat_messages",
            detail,
        })?;
        Ok(Self {
            message_id: row.message_id,
            chat_id: row.chat_id,
            text: row.text,
            from_external_id: row.from_external_id,
            direction,
            timestamp: row.sent_at,
        })
    }
}
