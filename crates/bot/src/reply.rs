use chatlink_core::notification::ActionButton;
use chatlink_core::types::ChatId;
use chatlink_telegram::{InlineButton, InlineKeyboardMarkup, OutboundMessage};

/// What a command handler wants sent back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub text: String,
    pub keyboard: Option<InlineKeyboardMarkup>,
}

impl Reply {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            keyboard: None,
        }
    }

    /// One URL button per row.
    pub fn with_links(self, links: &[ActionButton]) -> Self {
        self.with_keyboard(InlineKeyboardMarkup::from_actions(links))
    }

    /// Buttons side by side in a single row.
    pub fn with_row(self, buttons: Vec<InlineButton>) -> Self {
        self.with_keyboard(InlineKeyboardMarkup::row(buttons))
    }

    fn with_keyboard(mut self, keyboard: InlineKeyboardMarkup) -> Self {
        self.keyboard = (!keyboard.is_empty()).then_some(keyboard);
        self
    }

    pub fn into_outbound(self, chat_id: ChatId) -> OutboundMessage {
        let message = OutboundMessage::text(chat_id, self.text);
        match self.keyboard {
            Some(keyboard) => message.with_keyboard(keyboard),
            None => message,
        }
    }
}
