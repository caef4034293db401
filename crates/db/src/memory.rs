//! In-process store.
//!
//! All state lives behind one mutex and every trait method runs under a
//! single lock acquisition, which gives the same per-operation atomicity the
//! PostgreSQL statements provide. Used by the test suites and by
//! `STORE_BACKEND=memory` for local runs.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use chatlink_core::chat::{
    ChatMessage, ChatRecord, Direction, InboundMessage, LinkageSnapshot, SenderProfile,
};
use chatlink_core::domain::{EodReport, Meeting, StreakSummary, Task, Tenant, TenantUser};
use chatlink_core::identity::{IdentityLink, NewIdentityLink};
use chatlink_core::linking::{CodeOwner, LinkingCode, NewLinkingCode};
use chatlink_core::types::{ChatId, ExternalId, MessageId, Timestamp, UpdateId};
use chrono::NaiveDate;

use crate::store::{
    ChatStore, Directory, HealthCheck, IdentityLinkStore, LinkingCodeStore, StoreError,
    StoreResult, UpdateLog,
};

#[derive(Default)]
struct Inner {
    codes: HashMap<String, LinkingCode>,
    links: HashMap<ExternalId, IdentityLink>,
    chats: HashMap<ChatId, ChatRecord>,
    messages: HashMap<ChatId, BTreeMap<MessageId, ChatMessage>>,
    updates: HashMap<UpdateId, Timestamp>,
    tenants: HashMap<String, Tenant>,
    users: HashMap<(String, String), TenantUser>,
    tasks: Vec<Task>,
    meetings: Vec<Meeting>,
    eod_reports: HashSet<(String, String, NaiveDate)>,
    streaks: HashMap<(String, String), StreakSummary>,
}

#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
    unavailable: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent call fail with [`StoreError::Unavailable`]
    /// until reset.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    fn lock(&self) -> StoreResult<MutexGuard<'_, Inner>> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("memory store switched off".into()));
        }
        Ok(self.inner.lock().unwrap_or_else(PoisonError::into_inner))
    }

    fn seed(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    // ── Seeding the tenant read model ──────────────────────────────

    pub fn insert_tenant(&self, tenant: Tenant) {
        self.seed().tenants.insert(tenant.id.clone(), tenant);
    }

    pub fn insert_user(&self, user: TenantUser) {
        self.seed()
            .users
            .insert((user.tenant_id.clone(), user.id.clone()), user);
    }

    pub fn insert_task(&self, task: Task) {
        self.seed().tasks.push(task);
    }

    pub fn insert_meeting(&self, meeting: Meeting) {
        self.seed().meetings.push(meeting);
    }

    pub fn insert_eod_report(&self, report: EodReport) {
        self.seed()
            .eod_reports
            .insert((report.tenant_id, report.user_id, report.report_date));
    }

    pub fn set_streak(&self, tenant_id: &str, user_id: &str, streak: StreakSummary) {
        self.seed()
            .streaks
            .insert((tenant_id.to_string(), user_id.to_string()), streak);
    }
}

#[async_trait]
impl LinkingCodeStore for MemoryStore {
    async fn insert_code(&self, code: &NewLinkingCode) -> StoreResult<bool> {
        let mut inner = self.lock()?;
        if inner.codes.contains_key(&code.code) {
            return Ok(false);
        }
        inner.codes.insert(
            code.code.clone(),
            LinkingCode {
                code: code.code.clone(),
                owner_user_id: code.owner_user_id.clone(),
                tenant_id: code.tenant_id.clone(),
                created_at: code.created_at,
                expires_at: code.expires_at,
                used: false,
                used_at: None,
            },
        );
        Ok(true)
    }

    async fn consume_code(&self, code: &str, now: Timestamp) -> StoreResult<Option<CodeOwner>> {
        let mut inner = self.lock()?;
        let Some(entry) = inner.codes.get_mut(code) else {
            return Ok(None);
        };
        if !entry.is_consumable_at(now) {
            return Ok(None);
        }
        entry.used = true;
        entry.used_at = Some(now);
        Ok(Some(CodeOwner {
            owner_user_id: entry.owner_user_id.clone(),
            tenant_id: entry.tenant_id.clone(),
        }))
    }

    async fn find_code(&self, code: &str) -> StoreResult<Option<LinkingCode>> {
        Ok(self.lock()?.codes.get(code).cloned())
    }
}

#[async_trait]
impl IdentityLinkStore for MemoryStore {
    async fn find_link(&self, external_id: ExternalId) -> StoreResult<Option<IdentityLink>> {
        Ok(self.lock()?.links.get(&external_id).cloned())
    }

    async fn upsert_link(
        &self,
        link: &NewIdentityLink,
        overwrite_active: bool,
    ) -> StoreResult<Option<IdentityLink>> {
        let mut inner = self.lock()?;
        let mut linked_at = link.linked_at;

        if let Some(existing) = inner.links.get(&link.external_id) {
            let same = existing.tenant_user_id == link.tenant_user_id
                && existing.tenant_id == link.tenant_id;
            if existing.active && !same && !overwrite_active {
                return Ok(None);
            }
            if existing.active && same {
                linked_at = existing.linked_at;
            }
        }

        let row = IdentityLink {
            external_id: link.external_id,
            tenant_user_id: link.tenant_user_id.clone(),
            tenant_id: link.tenant_id.clone(),
            linked_at,
            active: true,
            unlinked_at: None,
            username: link.profile.username.clone(),
            first_name: link.profile.first_name.clone(),
            last_name: link.profile.last_name.clone(),
            updated_at: link.linked_at,
        };
        inner.links.insert(link.external_id, row.clone());
        Ok(Some(row))
    }

    async fn deactivate_link(
        &self,
        external_id: ExternalId,
        now: Timestamp,
    ) -> StoreResult<Option<IdentityLink>> {
        let mut inner = self.lock()?;
        let Some(link) = inner.links.get_mut(&external_id).filter(|l| l.active) else {
            return Ok(None);
        };
        let before = link.clone();
        link.active = false;
        link.unlinked_at = Some(now);
        link.updated_at = now;
        Ok(Some(before))
    }

    async fn update_profile(&self, profile: &SenderProfile, now: Timestamp) -> StoreResult<bool> {
        let mut inner = self.lock()?;
        let Some(link) = inner
            .links
            .get_mut(&profile.external_id)
            .filter(|l| l.active)
        else {
            return Ok(false);
        };
        link.username = profile.username.clone();
        link.first_name = profile.first_name.clone();
        link.last_name = profile.last_name.clone();
        link.updated_at = now;
        Ok(true)
    }

    async fn find_active_by_tenant_user(
        &self,
        tenant_id: Option<&str>,
        tenant_user_id: &str,
    ) -> StoreResult<Option<IdentityLink>> {
        Ok(self
            .lock()?
            .links
            .values()
            .filter(|l| l.active && l.tenant_user_id == tenant_user_id)
            .filter(|l| tenant_id.map_or(true, |t| t == l.tenant_id))
            .max_by_key(|l| l.linked_at)
            .cloned())
    }

    async fn list_active(&self) -> StoreResult<Vec<IdentityLink>> {
        let mut active: Vec<IdentityLink> = self
            .lock()?
            .links
            .values()
            .filter(|l| l.active)
            .cloned()
            .collect();
        active.sort_by_key(|l| l.external_id);
        Ok(active)
    }
}

#[async_trait]
impl ChatStore for MemoryStore {
    async fn record_inbound(&self, message: &InboundMessage) -> StoreResult<ChatRecord> {
        let mut inner = self.lock()?;
        let inner = &mut *inner;

        let log = inner.messages.entry(message.chat_id).or_default();
        if log.contains_key(&message.message_id) {
            if let Some(chat) = inner.chats.get(&message.chat_id) {
                return Ok(chat.clone());
            }
        }
        log.insert(message.message_id, message.to_log_entry());

        let linkage = message.linkage.as_ref();
        let chat = inner
            .chats
            .entry(message.chat_id)
            .and_modify(|chat| {
                chat.message_count += 1;
                if message.received_at >= chat.last_message_at {
                    chat.last_message_text = message.text.clone();
                    chat.last_message_at = message.received_at;
                }
                chat.sender_profile = message.sender.clone();
                chat.updated_at = message.received_at;
            })
            .or_insert_with(|| ChatRecord {
                chat_id: message.chat_id,
                external_user_id: message.sender.external_id,
                tenant_user_id: None,
                tenant_id: None,
                is_linked: false,
                last_message_text: message.text.clone(),
                last_message_at: message.received_at,
                message_count: 1,
                sender_profile: message.sender.clone(),
                created_at: message.received_at,
                updated_at: message.received_at,
            });
        chat.tenant_user_id = linkage.map(|l| l.tenant_user_id.clone());
        chat.tenant_id = linkage.map(|l| l.tenant_id.clone());
        chat.is_linked = linkage.is_some();

        Ok(chat.clone())
    }

    async fn record_outbound(&self, message: &ChatMessage) -> StoreResult<bool> {
        let mut inner = self.lock()?;
        let inner = &mut *inner;

        let Some(chat) = inner.chats.get_mut(&message.chat_id) else {
            return Ok(false);
        };
        let log = inner.messages.entry(message.chat_id).or_default();
        if log.contains_key(&message.message_id) {
            return Ok(false);
        }
        log.insert(
            message.message_id,
            ChatMessage {
                direction: Direction::Outgoing,
                ..message.clone()
            },
        );
        chat.updated_at = chat.updated_at.max(message.timestamp);
        Ok(true)
    }

    async fn set_linkage_for_external(
        &self,
        external_id: ExternalId,
        linkage: Option<&LinkageSnapshot>,
        now: Timestamp,
    ) -> StoreResult<u64> {
        let mut inner = self.lock()?;
        let mut updated = 0;
        for chat in inner
            .chats
            .values_mut()
            .filter(|c| c.external_user_id == external_id)
        {
            chat.tenant_user_id = linkage.map(|l| l.tenant_user_id.clone());
            chat.tenant_id = linkage.map(|l| l.tenant_id.clone());
            chat.is_linked = linkage.is_some();
            chat.updated_at = now;
            updated += 1;
        }
        Ok(updated)
    }

    async fn list_by_tenant(&self, tenant_id: &str) -> StoreResult<Vec<ChatRecord>> {
        let mut chats: Vec<ChatRecord> = self
            .lock()?
            .chats
            .values()
            .filter(|c| c.tenant_id.as_deref() == Some(tenant_id))
            .cloned()
            .collect();
        chats.sort_by(|a, b| b.last_message_at.cmp(&a.last_message_at));
        Ok(chats)
    }

    async fn find_chat(&self, chat_id: ChatId) -> StoreResult<Option<ChatRecord>> {
        Ok(self.lock()?.chats.get(&chat_id).cloned())
    }

    async fn list_messages(&self, chat_id: ChatId, limit: i64) -> StoreResult<Vec<ChatMessage>> {
        let inner = self.lock()?;
        let Some(log) = inner.messages.get(&chat_id) else {
            return Ok(Vec::new());
        };
        let mut entries: Vec<ChatMessage> = log.values().cloned().collect();
        entries.sort_by(|a, b| {
            b.timestamp
                .cmp(&a.timestamp)
                .then(b.message_id.cmp(&a.message_id))
        });
        entries.truncate(usize::try_from(limit.max(0)).unwrap_or(usize::MAX));
        Ok(entries)
    }
}

#[async_trait]
impl UpdateLog for MemoryStore {
    async fn mark_seen(
        &self,
        update_id: UpdateId,
        now: Timestamp,
        ttl: chrono::Duration,
    ) -> StoreResult<bool> {
        let mut inner = self.lock()?;
        match inner.updates.get(&update_id) {
            Some(expires_at) if *expires_at > now => Ok(false),
            _ => {
                inner.updates.insert(update_id, now + ttl);
                Ok(true)
            }
        }
    }

    async fn purge_expired(&self, now: Timestamp) -> StoreResult<u64> {
        let mut inner = self.lock()?;
        let before = inner.updates.len();
        inner.updates.retain(|_, expires_at| *expires_at > now);
        Ok((before - inner.updates.len()) as u64)
    }
}

#[async_trait]
impl Directory for MemoryStore {
    async fn find_user(&self, tenant_id: &str, user_id: &str) -> StoreResult<Option<TenantUser>> {
        Ok(self
            .lock()?
            .users
            .get(&(tenant_id.to_string(), user_id.to_string()))
            .cloned())
    }

    async fn tenant_exists(&self, tenant_id: &str) -> StoreResult<bool> {
        Ok(self.lock()?.tenants.contains_key(tenant_id))
    }

    async fn tasks_assigned_to(&self, tenant_id: &str, user_id: &str) -> StoreResult<Vec<Task>> {
        Ok(self
            .lock()?
            .tasks
            .iter()
            .filter(|t| t.tenant_id == tenant_id && t.is_assigned_to(user_id))
            .cloned()
            .collect())
    }

    async fn meetings_for_attendee(
        &self,
        tenant_id: &str,
        user_id: &str,
        from: Timestamp,
        to: Timestamp,
    ) -> StoreResult<Vec<Meeting>> {
        let mut meetings: Vec<Meeting> = self
            .lock()?
            .meetings
            .iter()
            .filter(|m| {
                m.tenant_id == tenant_id
                    && m.attendee_ids.iter().any(|a| a == user_id)
                    && m.meeting_date_time >= from
                    && m.meeting_date_time < to
            })
            .cloned()
            .collect();
        meetings.sort_by_key(|m| m.meeting_date_time);
        Ok(meetings)
    }

    async fn has_eod_report(
        &self,
        tenant_id: &str,
        user_id: &str,
        date: NaiveDate,
    ) -> StoreResult<bool> {
        Ok(self.lock()?.eod_reports.contains(&(
            tenant_id.to_string(),
            user_id.to_string(),
            date,
        )))
    }

    async fn streak(&self, tenant_id: &str, user_id: &str) -> StoreResult<StreakSummary> {
        Ok(self
            .lock()?
            .streaks
            .get(&(tenant_id.to_string(), user_id.to_string()))
            .cloned()
            .unwrap_or_default())
    }
}

#[async_trait]
impl HealthCheck for MemoryStore {
    async fn ping(&self) -> StoreResult<()> {
        self.lock().map(|_| ())
    }
}
