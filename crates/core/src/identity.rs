//! Identity links between an external chat identity and a tenant user.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::chat::{LinkageSnapshot, SenderProfile};
use crate::types::{ExternalId, TenantId, Timestamp, UserId};

/// A row keyed by `external_id`. Deactivated on unlink, never deleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IdentityLink {
    pub external_id: ExternalId,
    pub tenant_user_id: UserId,
    pub tenant_id: TenantId,
    pub linked_at: Timestamp,
    pub active: bool,
    pub unlinked_at: Option<Timestamp>,
    pub username: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub updated_at: Timestamp,
}

impl IdentityLink {
    pub fn snapshot(&self) -> LinkageSnapshot {
        LinkageSnapshot {
            tenant_user_id: self.tenant_user_id.clone(),
            tenant_id: self.tenant_id.clone(),
        }
    }

    fn is_bound_to(&self, tenant_user_id: &str, tenant_id: &str) -> bool {
        self.tenant_user_id == tenant_user_id && self.tenant_id == tenant_id
    }
}

/// Upsert DTO for [`IdentityLink`].
#[derive(Debug, Clone)]
pub struct NewIdentityLink {
    pub external_id: ExternalId,
    pub tenant_user_id: UserId,
    pub tenant_id: TenantId,
    pub linked_at: Timestamp,
    pub profile: SenderProfile,
}

/// What to do when an external id that is already actively linked to a
/// different tenant user presents a new link request.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RelinkPolicy {
    /// Last write wins.
    #[default]
    Overwrite,
    /// Refuse; the user has to unlink first.
    Reject,
}

impl RelinkPolicy {
    pub fn decide(
        self,
        existing: Option<&IdentityLink>,
        tenant_user_id: &str,
        tenant_id: &str,
    ) -> RelinkDecision {
        match existing {
            None => RelinkDecision::Fresh,
            Some(link) if !link.active => RelinkDecision::Fresh,
            Some(link) if link.is_bound_to(tenant_user_id, tenant_id) => RelinkDecision::Refresh,
            Some(link) => match self {
                RelinkPolicy::Overwrite => RelinkDecision::Overwrite {
                    previous: link.snapshot(),
                },
                RelinkPolicy::Reject => RelinkDecision::Reject,
            },
        }
    }
}

impl fmt::Display for RelinkPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            RelinkPolicy::Overwrite => "overwrite",
            RelinkPolicy::Reject => "reject",
        })
    }
}

impl FromStr for RelinkPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "overwrite" => Ok(RelinkPolicy::Overwrite),
            "reject" => Ok(RelinkPolicy::Reject),
            other => Err(format!(
                "unknown relink policy '{other}' (expected overwrite or reject)"
            )),
        }
    }
}

/// Outcome of [`RelinkPolicy::decide`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RelinkDecision {
    /// No active mapping exists.
    Fresh,
    /// The same mapping is already active.
    Refresh,
    /// A different active mapping will be replaced.
    Overwrite { previous: LinkageSnapshot },
    /// A different active mapping exists and the policy forbids replacing it.
    Reject,
}
