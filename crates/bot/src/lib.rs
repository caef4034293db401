//! Chatlink bot core.
//!
//! The account-linking authority, the identity link service, the chat
//! ledger, the webhook command router, and the outbound notification
//! dispatcher. [`BotServices`] wires them together once per process.

pub mod authority;
pub mod command;
pub mod commands;
pub mod dispatcher;
pub mod error;
pub mod identity;
pub mod ledger;
pub mod messages;
pub mod reply;
pub mod router;
pub mod services;
pub mod session;

pub use authority::{IssuedCode, LinkingCodeAuthority};
pub use dispatcher::{BatchReport, DeliveryOutcome, NotificationDispatcher, NotificationRequest};
pub use error::{BotError, BotResult};
pub use identity::{IdentityLinks, LinkOutcome};
pub use ledger::ChatLedger;
pub use router::{CommandRouter, UpdateOutcome};
pub use services::{BotConfig, BotServices};
