//! Webhook update types.
//!
//! Only the fields the bot consumes are modelled; everything else in the
//! Bot API payload is ignored during deserialization.

use chatlink_core::chat::SenderProfile;
use chatlink_core::types::{ChatId, ExternalId, MessageId, UpdateId};
use serde::{Deserialize, Serialize};

/// One inbound event. Carries at most one of `message` or `callback_query`.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Update {
    pub update_id: UpdateId,
    #[serde(default)]
    pub message: Option<Message>,
    #[serde(default)]
    pub callback_query: Option<CallbackQuery>,
}

impl Update {
    /// The conversation a reply should go to.
    pub fn chat_id(&self) -> Option<ChatId> {
        match (&self.message, &self.callback_query) {
            (Some(message), _) => Some(message.chat.id),
            (None, Some(query)) => Some(query.reply_chat_id()),
            (None, None) => None,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Message {
    pub message_id: MessageId,
    #[serde(default)]
    pub from: Option<User>,
    pub chat: Chat,
    /// Unix seconds.
    pub date: i64,
    #[serde(default)]
    pub text: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct User {
    pub id: ExternalId,
    #[serde(default)]
    pub is_bot: bool,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
}

impl From<&User> for SenderProfile {
    fn from(user: &User) -> Self {
        SenderProfile {
            external_id: user.id,
            username: user.username.clone(),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Chat {
    pub id: ChatId,
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CallbackQuery {
    pub id: String,
    pub from: User,
    #[serde(default)]
    pub message: Option<Message>,
    #[serde(default)]
    pub data: Option<String>,
}

impl CallbackQuery {
    /// The chat holding the pressed button, or the presser's private chat
    /// when the originating message is too old to be included.
    pub fn reply_chat_id(&self) -> ChatId {
        self.message
            .as_ref()
            .map_or(self.from.id, |m| m.chat.id)
    }
}
