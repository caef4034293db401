//! The identity link service.
//!
//! Owns the mapping from an external chat identity to a tenant user and
//! applies the configured [`RelinkPolicy`].

use std::sync::Arc;

use chatlink_core::chat::{LinkageSnapshot, SenderProfile};
use chatlink_core::clock::Clock;
use chatlink_core::error::CoreError;
use chatlink_core::identity::{IdentityLink, NewIdentityLink, RelinkDecision, RelinkPolicy};
use chatlink_core::types::ExternalId;
use chatlink_db::IdentityLinkStore;

use crate::error::BotResult;

/// Result of a successful [`IdentityLinks::link`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkOutcome {
    /// No active mapping existed.
    Linked(IdentityLink),
    /// The same mapping was already active; profile fields were refreshed.
    Refreshed(IdentityLink),
    /// A different active mapping was overwritten.
    Replaced {
        link: IdentityLink,
        previous: LinkageSnapshot,
    },
}

impl LinkOutcome {
    pub fn link(&self) -> &IdentityLink {
        match self {
            LinkOutcome::Linked(link) | LinkOutcome::Refreshed(link) => link,
            LinkOutcome::Replaced { link, .. } => link,
        }
    }
}

pub struct IdentityLinks {
    store: Arc<dyn IdentityLinkStore>,
    clock: Arc<dyn Clock>,
    policy: RelinkPolicy,
}

impl IdentityLinks {
    pub fn new(store: Arc<dyn IdentityLinkStore>, clock: Arc<dyn Clock>, policy: RelinkPolicy) -> Self {
        Self {
            store,
            clock,
            policy,
        }
    }

    /// Bind `profile.external_id` to a tenant user.
    pub async fn link(
        &self,
        profile: &SenderProfile,
        tenant_user_id: &str,
        tenant_id: &str,
    ) -> BotResult<LinkOutcome> {
        let external_id = profile.external_id;
        let existing = self.store.find_link(external_id).await?;
        let decision = self
            .policy
            .decide(existing.as_ref(), tenant_user_id, tenant_id);

        if decision == RelinkDecision::Reject {
            tracing::info!(external_id, tenant_user_id, "Relink rejected by policy");
            return Err(CoreError::AlreadyLinked { external_id }.into());
        }

        let input = NewIdentityLink {
            external_id,
            tenant_user_id: tenant_user_id.to_string(),
            tenant_id: tenant_id.to_string(),
            linked_at: self.clock.now(),
            profile: profile.clone(),
        };
        let overwrite = self.policy == RelinkPolicy::Overwrite;
        // A concurrent link for a different user can still land between the
        // read above and this write; the store re-checks under Reject.
        let Some(link) = self.store.upsert_link(&input, overwrite).await? else {
            tracing::info!(external_id, tenant_user_id, "Relink rejected by policy");
            return Err(CoreError::AlreadyLinked { external_id }.into());
        };

        Ok(match decision {
            RelinkDecision::Overwrite { previous } => {
                tracing::warn!(
                    external_id,
                    previous_user = %previous.tenant_user_id,
                    tenant_user_id,
                    "Active identity link overwritten"
                );
                LinkOutcome::Replaced { link, previous }
            }
            RelinkDecision::Refresh => LinkOutcome::Refreshed(link),
            RelinkDecision::Fresh | RelinkDecision::Reject => {
                tracing::info!(external_id, tenant_user_id, tenant_id, "Identity linked");
                LinkOutcome::Linked(link)
            }
        })
    }

    /// Deactivate the link. Idempotent: `None` when nothing was active.
    pub async fn unlink(&self, external_id: ExternalId) -> BotResult<Option<IdentityLink>> {
        let previous = self
            .store
            .deactivate_link(external_id, self.clock.now())
            .await?;
        if previous.is_some() {
            tracing::info!(external_id, "Identity unlinked");
        }
        Ok(previous)
    }

    /// The active link for `external_id`, if any.
    pub async fn resolve(&self, external_id: ExternalId) -> BotResult<Option<IdentityLink>> {
        Ok(self
            .store
            .find_link(external_id)
            .await?
            .filter(|link| link.active))
    }

    /// Reverse lookup for outbound delivery. With `tenant_id`, only a link
    /// inside that tenant qualifies.
    pub async fn resolve_by_tenant_user(
        &self,
        tenant_id: Option<&str>,
        tenant_user_id: &str,
    ) -> BotResult<Option<IdentityLink>> {
        Ok(self
            .store
            .find_active_by_tenant_user(tenant_id, tenant_user_id)
            .await?)
    }

    /// Refresh username and names on an active link. Safe to repeat.
    pub async fn refresh_profile(&self, profile: &SenderProfile) -> BotResult<bool> {
        Ok(self.store.update_profile(profile, self.clock.now()).await?)
    }

    pub async fn list_active(&self) -> BotResult<Vec<IdentityLink>> {
        Ok(self.store.list_active().await?)
    }
}
