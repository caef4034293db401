//! The resolution step that guards every protected command.

use chatlink_core::domain::TenantUser;
use chatlink_core::error::CoreError;
use chatlink_core::identity::IdentityLink;
use chatlink_core::time::parse_timezone;
use chatlink_core::types::ExternalId;
use chatlink_db::Directory;
use chrono_tz::Tz;

use crate::error::BotResult;
use crate::identity::IdentityLinks;

/// A caller whose identity has been resolved to a tenant user.
///
/// Every protected command reads tenant data through the `tenant_id` and
/// `user.id` carried here, never through anything the update supplied.
#[derive(Debug, Clone)]
pub struct Session {
    pub link: IdentityLink,
    pub user: TenantUser,
    pub tz: Tz,
}

impl Session {
    pub fn tenant_id(&self) -> &str {
        &self.link.tenant_id
    }

    pub fn user_id(&self) -> &str {
        &self.user.id
    }

    /// Resolve `external_id` to a session.
    ///
    /// The tenant user and tenant existence check are independent reads and
    /// run concurrently.
    pub async fn resolve(
        links: &IdentityLinks,
        directory: &dyn Directory,
        external_id: ExternalId,
    ) -> BotResult<Session> {
        let link = links
            .resolve(external_id)
            .await?
            .ok_or(CoreError::NotLinked { external_id })?;

        let (user, tenant_exists) = tokio::join!(
            directory.find_user(&link.tenant_id, &link.tenant_user_id),
            directory.tenant_exists(&link.tenant_id),
        );

        if !tenant_exists? {
            return Err(CoreError::TenantMissing {
                tenant_id: link.tenant_id.clone(),
            }
            .into());
        }
        let Some(user) = user? else {
            tracing::info!(external_id, tenant_user_id = %link.tenant_user_id, "Linked user no longer exists");
            return Err(CoreError::NotLinked { external_id }.into());
        };

        let tz = parse_timezone(user.timezone.as_deref());
        Ok(Session { link, user, tz })
    }
}
