//! Canonical task status vocabulary.
//!
//! Task records arrive from the tenant application with free-text status
//! strings. They are translated once, at the domain boundary, through
//! [`LEGACY_STATUS_ALIASES`]; business logic only ever sees [`TaskStatus`].

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    NotStarted,
    Todo,
    InProgress,
    InReview,
    Blocked,
    OnHold,
    Completed,
    Cancelled,
}

impl TaskStatus {
    /// Completed and cancelled tasks never show up as pending work.
    pub fn is_terminal(self) -> bool {
        matches!(self, TaskStatus::Completed | TaskStatus::Cancelled)
    }

    pub fn label(self) -> &'static str {
        match self {
            TaskStatus::NotStarted => "Not started",
            TaskStatus::Todo => "To do",
            TaskStatus::InProgress => "In progress",
            TaskStatus::InReview => "In review",
            TaskStatus::Blocked => "Blocked",
            TaskStatus::OnHold => "On hold",
            TaskStatus::Completed => "Completed",
            TaskStatus::Cancelled => "Cancelled",
        }
    }
}

/// Legacy spellings, keyed by their normalized form (lowercase, `_`/`-`
/// folded to single spaces). See [`normalize_status_text`].
pub const LEGACY_STATUS_ALIASES: &[(&str, TaskStatus)] = &[
    ("not started", TaskStatus::NotStarted),
    ("notstarted", TaskStatus::NotStarted),
    ("new", TaskStatus::NotStarted),
    ("open", TaskStatus::NotStarted),
    ("pending", TaskStatus::NotStarted),
    ("todo", TaskStatus::Todo),
    ("to do", TaskStatus::Todo),
    ("in progress", TaskStatus::InProgress),
    ("inprogress", TaskStatus::InProgress),
    ("started", TaskStatus::InProgress),
    ("ongoing", TaskStatus::InProgress),
    ("working", TaskStatus::InProgress),
    ("in review", TaskStatus::InReview),
    ("review", TaskStatus::InReview),
    ("blocked", TaskStatus::Blocked),
    ("on hold", TaskStatus::OnHold),
    ("paused", TaskStatus::OnHold),
    ("completed", TaskStatus::Completed),
    ("complete", TaskStatus::Completed),
    ("done", TaskStatus::Completed),
    ("resolved", TaskStatus::Completed),
    ("closed", TaskStatus::Completed),
    ("finished", TaskStatus::Completed),
    ("cancelled", TaskStatus::Cancelled),
    ("canceled", TaskStatus::Cancelled),
    ("abandoned", TaskStatus::Cancelled),
];

/// Lowercase, fold `_` and `-` to spaces, collapse runs of whitespace.
pub fn normalize_status_text(raw: &str) -> String {
    raw.to_lowercase()
        .replace(['_', '-'], " ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Translate a free-text status. `None` when the spelling is unknown.
pub fn parse_status(raw: &str) -> Option<TaskStatus> {
    let key = normalize_status_text(raw);
    LEGACY_STATUS_ALIASES
        .iter()
        .find(|(alias, _)| *alias == key)
        .map(|(_, status)| *status)
}

/// How a raw status field reads once translated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatusReading {
    Known(TaskStatus),
    Unrecognized(String),
    Missing,
}

impl StatusReading {
    pub fn from_raw(raw: Option<&str>) -> Self {
        match raw.map(str::trim).filter(|s| !s.is_empty()) {
            None => StatusReading::Missing,
            Some(text) => match parse_status(text) {
                Some(status) => StatusReading::Known(status),
                None => StatusReading::Unrecognized(text.to_string()),
            },
        }
    }

    /// Only recognized terminal statuses close a task; a missing or
    /// unrecognized status still counts as open work.
    pub fn is_pending(&self) -> bool {
        match self {
            StatusReading::Known(status) => !status.is_terminal(),
            StatusReading::Unrecognized(_) | StatusReading::Missing => true,
        }
    }

    pub fn label(&self) -> String {
        match self {
            StatusReading::Known(status) => status.label().to_string(),
            StatusReading::Unrecognized(text) => text.clone(),
            StatusReading::Missing => TaskStatus::NotStarted.label().to_string(),
        }
    }
}

/// A member's own progress, when present, overrides the task-level status.
pub fn effective_status(task_status: Option<&str>, member_progress: Option<&str>) -> StatusReading {
    match StatusReading::from_raw(member_progress) {
        StatusReading::Missing => StatusReading::from_raw(task_status),
        reading => reading,
    }
}
