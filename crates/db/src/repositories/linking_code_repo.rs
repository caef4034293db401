//! Repository for the `linking_codes` table.

use chatlink_core::linking::NewLinkingCode;
use chatlink_core::types::Timestamp;
use sqlx::PgPool;

use crate::models::linking_code::{CodeOwnerRow, LinkingCodeRow};

const COLUMNS: &str = "code, owner_user_id, tenant_id, created_at, expires_at, used, used_at";

pub struct LinkingCodeRepo;

impl LinkingCodeRepo {
    /// Insert a code. Returns `false` if the code already exists.
    pub async fn insert(pool: &PgPool, input: &NewLinkingCode) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "INSERT INTO linking_codes (code, owner_user_id, tenant_id, created_at, expires_at) \
             VALUES ($1, $2, $3, $4, $5) \
             ON CONFLICT (code) DO NOTHING",
        )
        .bind(&input.code)
        .bind(&input.owner_user_id)
        .bind(&input.tenant_id)
        .bind(input.created_at)
        .bind(input.expires_at)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() == 1)
    }

    /// Conditionally mark a code used.
    ///
    /// The `WHERE` clause carries the whole validity check, so of any number
    /// of concurrent callers at most one gets a row back.
    pub async fn consume(
        pool: &PgPool,
        code: &str,
        now: Timestamp,
    ) -> Result<Option<CodeOwnerRow>, sqlx::Error> {
        sqlx::query_as::<_, CodeOwnerRow>(
            "UPDATE linking_codes SET used = true, used_at = $2 \
             WHERE code = $1 AND used = false AND expires_at > $2 \
             RETURNING owner_user_id, tenant_id",
        )
        .bind(code)
        .bind(now)
        .fetch_optional(pool)
        .await
    }

    pub async fn find(pool: &PgPool, code: &str) -> Result<Option<LinkingCodeRow>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM linking_codes WHERE code = $1");
        sqlx::query_as::<_, LinkingCodeRow>(&query)
            .bind(code)
            .fetch_optional(pool)
            .await
    }
}
