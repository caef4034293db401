//! Repository for the `identity_links` table.

use chatlink_core::chat::SenderProfile;
use chatlink_core::identity::NewIdentityLink;
use chatlink_core::types::{ExternalId, Timestamp};
use sqlx::PgPool;

use crate::models::identity_link::IdentityLinkRow;

const COLUMNS: &str = "external_id, tenant_user_id, tenant_id, linked_at, active, unlinked_at, \
                       username, first_name, last_name, updated_at";

pub struct IdentityLinkRepo;

impl IdentityLinkRepo {
    pub async fn find(
        pool: &PgPool,
        external_id: ExternalId,
    ) -> Result<Option<IdentityLinkRow>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM identity_links WHERE external_id = $1");
        sqlx::query_as::<_, IdentityLinkRow>(&query)
            .bind(external_id)
            .fetch_optional(pool)
            .await
    }

    /// Insert or replace the mapping for `external_id`.
    ///
    /// With `overwrite_active = false` the conflict branch only fires when
    /// the existing row is inactive or already bound to the same user, so a
    /// rejected relink returns no row.
    pub async fn upsert(
        pool: &PgPool,
        input: &NewIdentityLink,
        overwrite_active: bool,
    ) -> Result<Option<IdentityLinkRow>, sqlx::Error> {
        let query = format!(
            "INSERT INTO identity_links \
                (external_id, tenant_user_id, tenant_id, linked_at, active, unlinked_at, \
                 username, first_name, last_name, updated_at) \
             VALUES ($1, $2, $3, $4, true, NULL, $5, $6, $7, $4) \
             ON CONFLICT (external_id) DO UPDATE SET \
                 tenant_user_id = EXCLUDED.tenant_user_id, \
                 tenant_id = EXCLUDED.tenant_id, \
                 linked_at = CASE \
                     WHEN identity_links.active \
                      AND identity_links.tenant_user_id = EXCLUDED.tenant_user_id \
                      AND identity_links.tenant_id = EXCLUDED.tenant_id \
                     THEN identity_links.linked_at ELSE EXCLUDED.linked_at END, \
                 active = true, \
                 unlinked_at = NULL, \
                 username = EXCLUDED.username, \
                 first_name = EXCLUDED.first_name, \
                 last_name = EXCLUDED.last_name, \
                 updated_at = EXCLUDED.updated_at \
             WHERE $8 \
                OR NOT identity_links.active \
                OR (identity_links.tenant_user_id = EXCLUDED.tenant_user_id \
                    AND identity_links.tenant_id = EXCLUDED.tenant_id) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, IdentityLinkRow>(&query)
            .bind(input.external_id)
            .bind(&input.tenant_user_id)
            .bind(&input.tenant_id)
            .bind(input.linked_at)
            .bind(&input.profile.username)
            .bind(&input.profile.first_name)
            .bind(&input.profile.last_name)
            .bind(overwrite_active)
            .fetch_optional(pool)
            .await
    }

    /// Deactivate an active link, returning the row as it was beforehand.
    pub async fn deactivate(
        pool: &PgPool,
        external_id: ExternalId,
        now: Timestamp,
    ) -> Result<Option<IdentityLinkRow>, sqlx::Error> {
        let query = format!(
            "UPDATE identity_links SET active = false, unlinked_at = $2, updated_at = $2 \
             WHERE external_id = $1 AND active \
             RETURNING {COLUMNS}"
        );
        let row = sqlx::query_as::<_, IdentityLinkRow>(&query)
            .bind(external_id)
            .bind(now)
            .fetch_optional(pool)
            .await?;
        Ok(row.map(|r| IdentityLinkRow {
            active: true,
            unlinked_at: None,
            ..r
        }))
    }

    pub async fn update_profile(
        pool: &PgPool,
        profile: &SenderProfile,
        now: Timestamp,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE identity_links SET username = $2, first_name = $3, last_name = $4, \
                 updated_at = $5 \
             WHERE external_id = $1 AND active",
        )
        .bind(profile.external_id)
        .bind(&profile.username)
        .bind(&profile.first_name)
        .bind(&profile.last_name)
        .bind(now)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn find_active_by_tenant_user(
        pool: &PgPool,
        tenant_id: Option<&str>,
        tenant_user_id: &str,
    ) -> Result<Option<IdentityLinkRow>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM identity_links \
             WHERE tenant_user_id = $1 AND ($2::TEXT IS NULL OR tenant_id = $2) AND active \
             ORDER BY linked_at DESC LIMIT 1"
        );
        sqlx::query_as::<_, IdentityLinkRow>(&query)
            .bind(tenant_user_id)
            .bind(tenant_id)
            .fetch_optional(pool)
            .await
    }

    pub async fn list_active(pool: &PgPool) -> Result<Vec<IdentityLinkRow>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM identity_links WHERE active ORDER BY external_id"
        );
        sqlx::query_as::<_, IdentityLinkRow>(&query)
            .fetch_all(pool)
            .await
    }
}
