/// Numeric user id on the external messaging platform (`from.id`).
pub type ExternalId = i64;

/// Conversation id on the external messaging platform (`chat.id`).
pub type ChatId = i64;

/// Message id, unique within a chat.
pub type MessageId = i64;

/// Monotonic id the platform attaches to every webhook update.
pub type UpdateId = i64;

/// Opaque user id issued by the tenant application.
pub type UserId = String;

/// Opaque tenant (organization) id issued by the tenant application.
pub type TenantId = String;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;
