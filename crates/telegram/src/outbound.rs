//! Outbound message types.

use chatlink_core::notification::ActionButton;
use chatlink_core::types::{ChatId, MessageId, Timestamp};
use serde::{Deserialize, Serialize};

/// An inline keyboard button. Exactly one of `url` or `callback_data` is set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InlineButton {
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub callback_data: Option<String>,
}

impl InlineButton {
    pub fn url(text: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            url: Some(url.into()),
            callback_data: None,
        }
    }

    pub fn callback(text: impl Into<String>, data: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            url: None,
            callback_data: Some(data.into()),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InlineKeyboardMarkup {
    pub inline_keyboard: Vec<Vec<InlineButton>>,
}

impl InlineKeyboardMarkup {
    /// A single row.
    pub fn row(buttons: Vec<InlineButton>) -> Self {
        Self {
            inline_keyboard: vec![buttons],
        }
    }

    /// One URL button per row.
    pub fn from_actions(actions: &[ActionButton]) -> Self {
        Self {
            inline_keyboard: actions
                .iter()
                .map(|a| vec![InlineButton::url(&a.text, &a.url)])
                .collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.inline_keyboard.iter().all(Vec::is_empty)
    }
}

/// A plain-text message with an optional inline keyboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutboundMessage {
    pub chat_id: ChatId,
    pub text: String,
    #[serde(rename = "reply_markup", skip_serializing_if = "Option::is_none")]
    pub keyboard: Option<InlineKeyboardMarkup>,
}

impl OutboundMessage {
    pub fn text(chat_id: ChatId, text: impl Into<String>) -> Self {
        Self {
            chat_id,
            text: text.into(),
            keyboard: None,
        }
    }

    /// Attach `keyboard`, dropping it when it has no buttons.
    pub fn with_keyboard(mut self, keyboard: InlineKeyboardMarkup) -> Self {
        self.keyboard = (!keyboard.is_empty()).then_some(keyboard);
        self
    }
}

/// What the platform reports back for a delivered message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentMessage {
    pub message_id: MessageId,
    pub chat_id: ChatId,
    pub sent_at: Timestamp,
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn serializes_to_send_message_body() {
        let message = OutboundMessage::text(42, "Unlink?").with_keyboard(InlineKeyboardMarkup::row(
            vec![
                InlineButton::callback("Yes", "unlink_confirm"),
                InlineButton::url("Open app", "https://app.example.com"),
            ],
        ));

        assert_eq!(
            serde_json::to_value(&message).unwrap(),
            json!({
                "chat_id": 42,
                "text": "Unlink?",
                "reply_markup": {"inline_keyboard": [[
                    {"text": "Yes", "callback_data": "unlink_confirm"},
                    {"text": "Open app", "url": "https://app.example.com"}
                ]]}
            })
        );
    }

    #[test]
    fn empty_keyboard_is_omitted() {
        let message = OutboundMessage::text(1, "hi").with_keyboard(InlineKeyboardMarkup::default());
        assert!(message.keyboard.is_none());
        assert_eq!(
            serde_json::to_value(&message).unwrap(),
            json!({"chat_id": 1, "text": "hi"})
        );
    }
}
