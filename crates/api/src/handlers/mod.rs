pub mod chats;
pub mod identity_link;
pub mod linking_codes;
pub mod notifications;
pub mod webhook;
