//! Identity link rows.

use chatlink_core::identity::IdentityLink;
use chatlink_core::types::{ExternalId, Timestamp};
use sqlx::FromRow;

/// A row from the `identity_links` table.
#[derive(Debug, Clone, FromRow)]
pub struct IdentityLinkRow {
    pub external_id: ExternalId,
    pub tenant_user_id: String,
    pub tenant_id: String,
    pub linked_at: Timestamp,
    pub active: bool,
    pub unlinked_at: Option<Timestamp>,
    pub username: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub updated_at: Timestamp,
}

impl From<IdentityLinkRow> for IdentityLink {
    fn from(row: IdentityLinkRow) -> Self {
        Self {
            external_id: row.external_id,
            tenant_user_id: row.tenant_user_id,
            tenant_id: row.tenant_id,
            linked_at: row.linked_at,
            active: row.active,
            unlinked_at: row.unlinked_at,
            username: row.username,
            first_name: row.first_name,
            last_name: row.last_name,
            updated_at: row.updated_at,
        }
    }
}
