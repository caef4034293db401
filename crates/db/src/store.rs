//! Storage seams.
//!
//! Every operation that must be atomic under concurrent webhook delivery is
//! expressed as a single trait method so implementations can use a
//! store-level primitive (conditional update, upsert, row lock) instead of a
//! read-modify-write in application code.

use std::sync::Arc;

use async_trait::async_trait;
use chatlink_core::chat::{ChatMessage, ChatRecord, InboundMessage, LinkageSnapshot, SenderProfile};
use chatlink_core::domain::{Meeting, StreakSummary, Task, TenantUser};
use chatlink_core::identity::{IdentityLink, NewIdentityLink};
use chatlink_core::linking::{CodeOwner, LinkingCode, NewLinkingCode};
use chatlink_core::types::{ChatId, ExternalId, Timestamp, UpdateId};
use chrono::NaiveDate;

use crate::memory::MemoryStore;
use crate::pg::PgStore;
use crate::DbPool;

/// Errors from any store implementation.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Corrupt row in {table}: {detail}")]
    Corrupt { table: &'static str, detail: String },

    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

#[async_trait]
pub trait LinkingCodeStore: Send + Sync {
    /// Insert a new code. `Ok(false)` when the code already exists.
    async fn insert_code(&self, code: &NewLinkingCode) -> StoreResult<bool>;

    /// Flip `used` to `true` in one conditional step, succeeding only when
    /// the code exists, is unused, and `now < expires_at`.
    async fn consume_code(&self, code: &str, now: Timestamp) -> StoreResult<Option<CodeOwner>>;

    async fn find_code(&self, code: &str) -> StoreResult<Option<LinkingCode>>;
}

#[async_trait]
pub trait IdentityLinkStore: Send + Sync {
    /// The row for `external_id` regardless of its `active` flag.
    async fn find_link(&self, external_id: ExternalId) -> StoreResult<Option<IdentityLink>>;

    /// Upsert keyed by `external_id`.
    ///
    /// When a *different* active mapping exists and `overwrite_active` is
    /// `false`, nothing is written and `Ok(None)` is returned. The check and
    /// the write happen in one statement.
    async fn upsert_link(
        &self,
        link: &NewIdentityLink,
        overwrite_active: bool,
    ) -> StoreResult<Option<IdentityLink>>;

    /// Set `active = false` and stamp `unlinked_at`. Returns the row as it was
    /// before deactivation, or `None` if there was no active row.
    async fn deactivate_link(
        &self,
        external_id: ExternalId,
        now: Timestamp,
    ) -> StoreResult<Option<IdentityLink>>;

    /// Refresh the denormalized username/first/last name on an active link.
    async fn update_profile(&self, profile: &SenderProfile, now: Timestamp) -> StoreResult<bool>;

    /// Most recently linked active row for a tenant user, restricted to
    /// `tenant_id` when given.
    async fn find_active_by_tenant_user(
        &self,
        tenant_id: Option<&str>,
        tenant_user_id: &str,
    ) -> StoreResult<Option<IdentityLink>>;

    async fn list_active(&self) -> StoreResult<Vec<IdentityLink>>;
}

#[async_trait]
pub trait ChatStore: Send + Sync {
    /// Create the chat with `message_count = 1` or atomically increment it,
    /// refresh last-message fields and the linkage snapshot, and append the
    /// log entry. A message id already in the log leaves everything untouched.
    async fn record_inbound(&self, message: &InboundMessage) -> StoreResult<ChatRecord>;

    /// Append an outgoing entry and bump `updated_at`. `Ok(false)` when the
    /// chat does not exist or the message id is already logged.
    async fn record_outbound(&self, message: &ChatMessage) -> StoreResult<bool>;

    /// Overwrite the linkage snapshot on every chat whose
    /// `external_user_id == external_id`. Returns the number of chats updated.
    async fn set_linkage_for_external(
        &self,
        external_id: ExternalId,
        linkage: Option<&LinkageSnapshot>,
        now: Timestamp,
    ) -> StoreResult<u64>;

    /// Chats whose snapshot belongs to `tenant_id`, newest activity first.
    async fn list_by_tenant(&self, tenant_id: &str) -> StoreResult<Vec<ChatRecord>>;

    async fn find_chat(&self, chat_id: ChatId) -> StoreResult<Option<ChatRecord>>;

    /// Newest messages first.
    async fn list_messages(&self, chat_id: ChatId, limit: i64) -> StoreResult<Vec<ChatMessage>>;
}

#[async_trait]
pub trait UpdateLog: Send + Sync {
    /// `true` the first time `update_id` is seen within its window.
    async fn mark_seen(
        &self,
        update_id: UpdateId,
        now: Timestamp,
        ttl: chrono::Duration,
    ) -> StoreResult<bool>;

    /// Drop entries whose window has closed. Returns the number removed.
    async fn purge_expired(&self, now: Timestamp) -> StoreResult<u64>;
}

/// Read access to the tenant application's data. Every method is scoped to
/// a tenant and, where applicable, to a single user within it.
#[async_trait]
pub trait Directory: Send + Sync {
    async fn find_user(&self, tenant_id: &str, user_id: &str) -> StoreResult<Option<TenantUser>>;

    async fn tenant_exists(&self, tenant_id: &str) -> StoreResult<bool>;

    async fn tasks_assigned_to(&self, tenant_id: &str, user_id: &str) -> StoreResult<Vec<Task>>;

    /// Meetings in `[from, to)` with `user_id` among the attendees.
    async fn meetings_for_attendee(
        &self,
        tenant_id: &str,
        user_id: &str,
        from: Timestamp,
        to: Timestamp,
    ) -> StoreResult<Vec<Meeting>>;

    async fn has_eod_report(
        &self,
        tenant_id: &str,
        user_id: &str,
        date: NaiveDate,
    ) -> StoreResult<bool>;

    async fn streak(&self, tenant_id: &str, user_id: &str) -> StoreResult<StreakSummary>;
}

#[async_trait]
pub trait HealthCheck: Send + Sync {
    async fn ping(&self) -> StoreResult<()>;
}

/// The full set of store handles, shared process-wide.
#[derive(Clone)]
pub struct Stores {
    pub codes: Arc<dyn LinkingCodeStore>,
    pub links: Arc<dyn IdentityLinkStore>,
    pub chats: Arc<dyn ChatStore>,
    pub updates: Arc<dyn UpdateLog>,
    pub directory: Arc<dyn Directory>,
    pub health: Arc<dyn HealthCheck>,
}

impl Stores {
    pub fn postgres(pool: DbPool) -> Self {
        Self::from_shared(Arc::new(PgStore::new(pool)))
    }

    pub fn memory(store: Arc<MemoryStore>) -> Self {
        Self::from_shared(store)
    }

    fn from_shared<S>(store: Arc<S>) -> Self
    where
        S: LinkingCodeStore
            + IdentityLinkStore
            + ChatStore
            + UpdateLog
            + Directory
            + HealthCheck
            + 'static,
    {
        Self {
            codes: store.clone(),
            links: store.clone(),
            chats: store.clone(),
            updates: store.clone(),
            directory: store.clone(),
            health: store,
        }
    }
}
