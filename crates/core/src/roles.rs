//! Role names carried in application-issued access tokens.

/// Tenant administrator: may read the tenant's chat ledger.
pub const ROLE_ADMIN: &str = "admin";

/// Regular tenant member.
pub const ROLE_MEMBER: &str = "member";

/// Backend service identity used by reminder jobs and event producers.
pub const ROLE_SERVICE: &str = "service";
