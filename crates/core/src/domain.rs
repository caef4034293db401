//! Read models owned by the tenant application.
//!
//! The bot never writes these; it only reads them, always scoped by
//! `tenant_id` and by the caller's own user id.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::task_status::{effective_status, StatusReading};
use crate::types::{TenantId, Timestamp, UserId};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tenant {
    pub id: TenantId,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TenantUser {
    pub id: UserId,
    pub tenant_id: TenantId,
    pub display_name: String,
    /// IANA zone name, e.g. `Europe/Berlin`.
    pub timezone: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    pub tenant_id: TenantId,
    pub title: String,
    pub status: Option<String>,
    pub priority: Option<String>,
    pub due_date: Option<NaiveDate>,
    pub assignee_ids: Vec<UserId>,
    /// Per-member progress status, keyed by user id.
    pub member_progress: BTreeMap<UserId, String>,
}

impl Task {
    /// Status as seen by `user_id`: their own progress if recorded,
    /// otherwise the task-level status.
    pub fn status_for(&self, user_id: &str) -> StatusReading {
        effective_status(
            self.status.as_deref(),
            self.member_progress.get(user_id).map(String::as_str),
        )
    }

    pub fn is_pending_for(&self, user_id: &str) -> bool {
        self.status_for(user_id).is_pending()
    }

    pub fn is_assigned_to(&self, user_id: &str) -> bool {
        self.assignee_ids.iter().any(|id| id == user_id)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Meeting {
    pub id: String,
    pub tenant_id: TenantId,
    pub title: String,
    pub meeting_date_time: Timestamp,
    pub attendee_ids: Vec<UserId>,
    pub meeting_link: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EodReport {
    pub id: String,
    pub tenant_id: TenantId,
    pub user_id: UserId,
    pub report_date: NaiveDate,
    pub submitted_at: Timestamp,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreakSummary {
    pub current_streak: i32,
    pub longest_streak: i32,
    pub last_report_date: Option<NaiveDate>,
}

/// Sort key for pending tasks: high priority first, then earliest due date.
pub fn priority_rank(priority: Option<&str>) -> u8 {
    match priority.map(|p| p.trim().to_ascii_lowercase()).as_deref() {
        Some("urgent") | Some("critical") => 0,
        Some("high") => 1,
        Some("medium") | Some("normal") => 2,
        Some("low") => 3,
        _ => 4,
    }
}
