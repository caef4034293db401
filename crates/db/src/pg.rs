//! PostgreSQL-backed store.

use async_trait::async_trait;
use chatlink_core::chat::{ChatMessage, ChatRecord, InboundMessage, LinkageSnapshot, SenderProfile};
use chatlink_core::domain::{Meeting, StreakSummary, Task, TenantUser};
use chatlink_core::identity::{IdentityLink, NewIdentityLink};
use chatlink_core::linking::{CodeOwner, LinkingCode, NewLinkingCode};
use chatlink_core::types::{ChatId, ExternalId, Timestamp, UpdateId};
use chrono::NaiveDate;

use crate::repositories::{
    ChatRepo, DirectoryRepo, IdentityLinkRepo, LinkingCodeRepo, ProcessedUpdateRepo,
};
use crate::store::{
    ChatStore, Directory, HealthCheck, IdentityLinkStore, LinkingCodeStore, StoreResult,
    UpdateLog,
};
use crate::DbPool;

/// Implements every store trait on top of one connection pool.
#[derive(Clone)]
pub struct PgStore {
    pool: DbPool,
}

impl PgStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &DbPool {
        &self.pool
    }
}

#[async_trait]
impl LinkingCodeStore for PgStore {
    async fn insert_code(&self, code: &NewLinkingCode) -> StoreResult<bool> {
        Ok(LinkingCodeRepo::insert(&self.pool, code).await?)
    }

    async fn consume_code(&self, code: &str, now: Timestamp) -> StoreResult<Option<CodeOwner>> {
        Ok(LinkingCodeRepo::consume(&self.pool, code, now)
            .await?
            .map(Into::into))
    }

    async fn find_code(&self, code: &str) -> StoreResult<Option<LinkingCode>> {
        Ok(LinkingCodeRepo::find(&self.pool, code).await?.map(Into::into))
    }
}

#[async_trait]
impl IdentityLinkStore for PgStore {
    async fn find_link(&self, external_id: ExternalId) -> StoreResult<Option<IdentityLink>> {
        Ok(IdentityLinkRepo::find(&self.pool, external_id)
            .await?
            .map(Into::into))
    }

    async fn upsert_link(
        &self,
        link: &NewIdentityLink,
        overwrite_active: bool,
    ) -> StoreResult<Option<IdentityLink>> {
        Ok(IdentityLinkRepo::upsert(&self.pool, link, overwrite_active)
            .await?
            .map(Into::into))
    }

    async fn deactivate_link(
        &self,
        external_id: ExternalId,
        now: Timestamp,
    ) -> StoreResult<Option<IdentityLink>> {
        Ok(IdentityLinkRepo::deactivate(&self.pool, external_id, now)
            .await?
            .map(Into::into))
    }

    async fn update_profile(&self, profile: &SenderProfile, now: Timestamp) -> StoreResult<bool> {
        Ok(IdentityLinkRepo::update_profile(&self.pool, profile, now).await?)
    }

    async fn find_active_by_tenant_user(
        &self,
        tenant_id: Option<&str>,
        tenant_user_id: &str,
    ) -> StoreResult<Option<IdentityLink>> {
        Ok(
            IdentityLinkRepo::find_active_by_tenant_user(&self.pool, tenant_id, tenant_user_id)
                .await?
                .map(Into::into),
        )
    }

    async fn list_active(&self) -> StoreResult<Vec<IdentityLink>> {
        Ok(IdentityLinkRepo::list_active(&self.pool)
            .await?
            .into_iter()
            .map(Into::into)
            .collect())
    }
}

#[async_trait]
impl ChatStore for PgStore {
    async fn record_inbound(&self, message: &InboundMessage) -> StoreResult<ChatRecord> {
        Ok(ChatRepo::record_inbound(&self.pool, message).await?.into())
    }

    async fn record_outbound(&self, message: &ChatMessage) -> StoreResult<bool> {
        Ok(ChatRepo::record_outbound(&self.pool, message).await?)
    }

    async fn set_linkage_for_external(
        &self,
        external_id: ExternalId,
        linkage: Option<&LinkageSnapshot>,
        now: Timestamp,
    ) -> StoreResult<u64> {
        Ok(ChatRepo::set_linkage_for_external(&self.pool, external_id, linkage, now).await?)
    }

    async fn list_by_tenant(&self, tenant_id: &str) -> StoreResult<Vec<ChatRecord>> {
        Ok(ChatRepo::list_by_tenant(&self.pool, tenant_id)
            .await?
            .into_iter()
            .map(Into::into)
            .collect())
    }

    async fn find_chat(&self, chat_id: ChatId) -> StoreResult<Option<ChatRecord>> {
        Ok(ChatRepo::find(&self.pool, chat_id).await?.map(Into::into))
    }

    async fn list_messages(&self, chat_id: ChatId, limit: i64) -> StoreResult<Vec<ChatMessage>> {
        ChatRepo::list_messages(&self.pool, chat_id, limit)
            .await?
            .into_iter()
            .map(ChatMessage::try_from)
            .collect()
    }
}

#[async_trait]
impl UpdateLog for PgStore {
    async fn mark_seen(
        &self,
        update_id: UpdateId,
        now: Timestamp,
        ttl: chrono::Duration,
    ) -> StoreResult<bool> {
        Ok(ProcessedUpdateRepo::claim(&self.pool, update_id, now, now + ttl).await?)
    }

    async fn purge_expired(&self, now: Timestamp) -> StoreResult<u64> {
        Ok(ProcessedUpdateRepo::delete_expired(&self.pool, now).await?)
    }
}

#[async_trait]
impl Directory for PgStore {
    async fn find_user(&self, tenant_id: &str, user_id: &str) -> StoreResult<Option<TenantUser>> {
        Ok(DirectoryRepo::find_user(&self.pool, tenant_id, user_id)
            .await?
            .map(Into::into))
    }

    async fn tenant_exists(&self, tenant_id: &str) -> StoreResult<bool> {
        Ok(DirectoryRepo::tenant_exists(&self.pool, tenant_id).await?)
    }

    async fn tasks_assigned_to(&self, tenant_id: &str, user_id: &str) -> StoreResult<Vec<Task>> {
        Ok(DirectoryRepo::tasks_assigned_to(&self.pool, tenant_id, user_id)
            .await?
            .into_iter()
            .map(Into::into)
            .collect())
    }

    async fn meetings_for_attendee(
        &self,
        tenant_id: &str,
        user_id: &str,
        from: Timestamp,
        to: Timestamp,
    ) -> StoreResult<Vec<Meeting>> {
        Ok(
            DirectoryRepo::meetings_for_attendee(&self.pool, tenant_id, user_id, from, to)
                .await?
                .into_iter()
                .map(Into::into)
                .collect(),
        )
    }

    async fn has_eod_report(
        &self,
        tenant_id: &str,
        user_id: &str,
        date: NaiveDate,
    ) -> StoreResult<bool> {
        Ok(DirectoryRepo::has_eod_report(&self.pool, tenant_id, user_id, date).await?)
    }

    async fn streak(&self, tenant_id: &str, user_id: &str) -> StoreResult<StreakSummary> {
        Ok(DirectoryRepo::streak(&self.pool, tenant_id, user_id)
            .await?
            .map(Into::into)
            .unwrap_or_default())
    }
}

#[async_trait]
impl HealthCheck for PgStore {
    async fn ping(&self) -> StoreResult<()> {
        Ok(crate::health_check(&self.pool).await?)
    }
}
