//! Chatlink domain layer.
//!
//! Pure types and rules shared by the persistence, bot, and API crates:
//! linking codes, identity links, chat records, the canonical task status
//! vocabulary, notification templates, and local-day arithmetic. Nothing
//! in this crate performs I/O.

pub mod chat;
pub mod clock;
pub mod domain;
pub mod error;
pub mod identity;
pub mod linking;
pub mod notification;
pub mod roles;
pub mod task_status;
pub mod time;
pub mod types;
