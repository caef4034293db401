//! Read-only queries against the tenant application's tables.
//!
//! Every query filters by `tenant_id` first.

use chatlink_core::types::Timestamp;
use chrono::NaiveDate;
use sqlx::PgPool;

use crate::models::directory::{MeetingRow, StreakRow, TaskRow, TenantUserRow};

pub struct DirectoryRepo;

impl DirectoryRepo {
    pub async fn find_user(
        pool: &PgPool,
        tenant_id: &str,
        user_id: &str,
    ) -> Result<Option<TenantUserRow>, sqlx::Error> {
        sqlx::query_as::<_, TenantUserRow>(
            "SELECT id, tenant_id, display_name, timezone FROM users \
             WHERE tenant_id = $1 AND id = $2",
        )
        .bind(tenant_id)
        .bind(user_id)
        .fetch_optional(pool)
        .await
    }

    pub async fn tenant_exists(pool: &PgPool, tenant_id: &str) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM tenants WHERE id = $1)")
            .bind(tenant_id)
            .fetch_one(pool)
            .await
    }

    pub async fn tasks_assigned_to(
        pool: &PgPool,
        tenant_id: &str,
        user_id: &str,
    ) -> Result<Vec<TaskRow>, sqlx::Error> {
        sqlx::query_as::<_, TaskRow>(
            "SELECT id, tenant_id, title, status, priority, due_date, assignee_ids, member_progress \
             FROM tasks \
             WHERE tenant_id = $1 AND $2 = ANY(assignee_ids) \
             ORDER BY due_date NULLS LAST, id",
        )
        .bind(tenant_id)
        .bind(user_id)
        .fetch_all(pool)
        .await
    }

    pub async fn meetings_for_attendee(
        pool: &PgPool,
        tenant_id: &str,
        user_id: &str,
        from: Timestamp,
        to: Timestamp,
    ) -> Result<Vec<MeetingRow>, sqlx::Error> {
        sqlx::query_as::<_, MeetingRow>(
            "SELECT id, tenant_id, title, meeting_date_time, attendee_ids, meeting_link \
             FROM meetings \
             WHERE tenant_id = $1 AND $2 = ANY(attendee_ids) \
               AND meeting_date_time >= $3 AND meeting_date_time < $4 \
             ORDER BY meeting_date_time",
        )
        .bind(tenant_id)
        .bind(user_id)
        .bind(from)
        .bind(to)
        .fetch_all(pool)
        .await
    }

    pub async fn has_eod_report(
        pool: &PgPool,
        tenant_id: &str,
        user_id: &str,
        date: NaiveDate,
    ) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar(
            "SELECT EXISTS (SELECT 1 FROM eod_reports \
                WHERE tenant_id = $1 AND user_id = $2 AND report_date = $3)",
        )
        .bind(tenant_id)
        .bind(user_id)
        .bind(date)
        .fetch_one(pool)
        .await
    }

    pub async fn streak(
        pool: &PgPool,
        tenant_id: &str,
        user_id: &str,
    ) -> Result<Option<StreakRow>, sqlx::Error> {
        sqlx::query_as::<_, StreakRow>(
            "SELECT current_streak, longest_streak, last_report_date FROM user_streaks \
             WHERE tenant_id = $1 AND user_id = $2",
        )
        .bind(tenant_id)
        .bind(user_id)
        .fetch_optional(pool)
        .await
    }
}
