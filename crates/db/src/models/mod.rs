//! Row types for sqlx and their conversions into domain types.

pub mod chat;
pub mod directory;
pub mod identity_link;
pub mod linking_code;
