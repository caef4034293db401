use crate::types::{ExternalId, TenantId};

/// Domain errors.
///
/// The first four variants are expected outcomes of chat interactions and
/// are rendered to end users as short guidance; the rest map onto HTTP
/// statuses in the API layer.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Linking code is invalid or expired")]
    InvalidOrExpiredCode,

    #[error("External identity {external_id} is not linked")]
    NotLinked { external_id: ExternalId },

    #[error("Tenant not found: {tenant_id}")]
    TenantMissing { tenant_id: TenantId },

    #[error("External identity {external_id} is already linked to another user")]
    AlreadyLinked { external_id: ExternalId },

    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: String },

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Internal error: {0}")]
    Internal(String),
}
