//! Linking code rows.

use chatlink_core::linking::{CodeOwner, LinkingCode};
use chatlink_core::types::Timestamp;
use sqlx::FromRow;

/// A row from the `linking_codes` table.
#[derive(Debug, Clone, FromRow)]
pub struct LinkingCodeRow {
    pub code: String,
    pub owner_user_id: String,
    pub tenant_id: String,
    pub created_at: Timestamp,
    pub expires_at: Timestamp,
    pub used: bool,
    pub used_at: Option<Timestamp>,
}

impl From<LinkingCodeRow> for LinkingCode {
    fn from(row: LinkingCodeRow) -> Self {
        Self {
            code: row.code,
            owner_user_id: row.owner_user_id,
            tenant_id: row.tenant_id,
            created_at: row.created_at,
            expires_at: row.expires_at,
            used: row.used,
            used_at: row.used_at,
        }
    }
}

/// The owner columns returned by a successful consume.
#[derive(Debug, Clone, FromRow)]
pub struct CodeOwnerRow {
    pub owner_user_id: String,
    pub tenant_id: String,
}

impl From<CodeOwnerRow> for CodeOwner {
    fn from(row: CodeOwnerRow) -> Self {
        Self {
            owner_user_id: row.owner_user_id,
            tenant_id: row.tenant_id,
        }
    }
}
