//! Telegram Bot API client.
//!
//! Provides typed webhook updates, outbound message types with inline
//! keyboards, the [`ChatTransport`] seam the bot sends through, a reqwest
//! implementation, and a recording dry-run transport for local runs and
//! tests.

pub mod client;
pub mod dry_run;
pub mod error;
pub mod outbound;
pub mod transport;
pub mod types;

pub use client::TelegramClient;
pub use dry_run::DryRunTransport;
pub use error::TransportError;
pub use outbound::{InlineButton, InlineKeyboardMarkup, OutboundMessage, SentMessage};
pub use transport::ChatTransport;
pub use types::{CallbackQuery, Chat, Message, Update, User};
