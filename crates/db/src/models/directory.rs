//! Rows from the tenant application's read-model tables.

use std::collections::BTreeMap;

use chatlink_core::domain::{Meeting, StreakSummary, Task, TenantUser};
use chatlink_core::types::Timestamp;
use chrono::NaiveDate;
use sqlx::types::Json;
use sqlx::FromRow;

#[derive(Debug, Clone, FromRow)]
pub struct TenantUserRow {
    pub id: String,
    pub tenant_id: String,
    pub display_name: String,
    pub timezone: Option<String>,
}

impl From<TenantUserRow> for TenantUser {
    fn from(row: TenantUserRow) -> Self {
        Self {
            id: row.id,
            tenant_id: row.tenant_id,
            display_name: row.display_name,
            timezone: row.timezone,
        }
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct TaskRow {
    pub id: String,
    pub tenant_id: String,
    pub title: String,
    pub status: Option<String>,
    pub priority: Option<String>,
    pub due_date: Option<NaiveDate>,
    pub assignee_ids: Vec<String>,
    pub member_progress: Json<BTreeMap<String, String>>,
}

impl From<TaskRow> for Task {
    fn from(row: TaskRow) -> Self {
        Self {
            id: row.id,
            tenant_id: row.tenant_id,
            title: row.title,
            status: row.status,
            priority: row.priority,
            due_date: row.due_date,
            assignee_ids: row.assignee_ids,
            member_progress: row.member_progress.0,
        }
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct MeetingRow {
    pub id: String,
    pub tenant_id: String,
    pub title: String,
    pub meeting_date_time: Timestamp,
    pub attendee_ids: Vec<String>,
    pub meeting_link: Option<String>,
}

impl From<MeetingRow> for Meeting {
    fn from(row: MeetingRow) -> Self {
        Self {
            id: row.id,
            tenant_id: row.tenant_id,
            title: row.title,
            meeting_date_time: row.meeting_date_time,
            attendee_ids: row.attendee_ids,
            meeting_link: row.meeting_link,
        }
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct StreakRow {
    pub current_streak: i32,
    pub longest_streak: i32,
    pub last_report_date: Option<NaiveDate>,
}

impl From<StreakRow> for StreakSummary {
    fn from(row: StreakRow) -> Self {
        Self {
            current_streak: row.current_streak,
            longest_streak: row.longest_streak,
            last_report_date: row.last_report_date,
        }
    }
}
