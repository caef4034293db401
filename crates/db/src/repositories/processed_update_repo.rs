//! Repository for the `processed_updates` table.

use chatlink_core::types::{Timestamp, UpdateId};
use sqlx::PgPool;

pub struct ProcessedUpdateRepo;

impl ProcessedUpdateRepo {
    /// Claim an update id. Returns `true` if no live claim existed.
    ///
    /// An expired claim is taken over in the same statement.
    pub async fn claim(
        pool: &PgPool,
        update_id: UpdateId,
        now: Timestamp,
        expires_at: Timestamp,
    ) -> Result<bool, sqlx::Error> {
        let claimed: Option<UpdateId> = sqlx::query_scalar(
            "INSERT INTO processed_updates (update_id, seen_at, expires_at) \
             VALUES ($1, $2, $3) \
             ON CONFLICT (update_id) DO UPDATE SET \
                 seen_at = EXCLUDED.seen_at, expires_at = EXCLUDED.expires_at \
             WHERE processed_updates.expires_at <= EXCLUDED.seen_at \
             RETURNING update_id",
        )
        .bind(update_id)
        .bind(now)
        .bind(expires_at)
        .fetch_optional(pool)
        .await?;
        Ok(claimed.is_some())
    }

    pub async fn delete_expired(pool: &PgPool, now: Timestamp) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM processed_updates WHERE expires_at <= $1")
            .bind(now)
            .execute(pool)
            .await?;
        Ok(result.rows_affected())
    }
}
