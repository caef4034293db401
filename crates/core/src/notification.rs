//! Notification templates.
//!
//! Each [`NotificationType`] renders a title, a body, and optional URL
//! buttons from a loosely-typed JSON payload supplied by the producing job.
//! Missing payload fields degrade to generic wording instead of failing.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationType {
    EodReminder,
    TaskAssigned,
    MeetingReminder,
    StreakMilestone,
    BadgeEarned,
}

impl NotificationType {
    pub fn as_str(self) -> &'static str {
        match self {
            NotificationType::EodReminder => "eod_reminder",
            NotificationType::TaskAssigned => "task_assigned",
            NotificationType::MeetingReminder => "meeting_reminder",
            NotificationType::StreakMilestone => "streak_milestone",
            NotificationType::BadgeEarned => "badge_earned",
        }
    }
}

impl fmt::Display for NotificationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A button that opens a URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActionButton {
    pub text: String,
    pub url: String,
}

impl ActionButton {
    pub fn new(text: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            url: url.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenderedNotification {
    pub title: String,
    pub body: String,
    pub buttons: Vec<ActionButton>,
}

impl RenderedNotification {
    /// Plain-text message body: title, blank line, body.
    pub fn text(&self) -> String {
        format!("{}\n\n{}", self.title, self.body)
    }
}

fn str_field<'a>(payload: &'a Value, key: &str) -> Option<&'a str> {
    payload
        .get(key)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

fn int_field(payload: &Value, key: &str) -> Option<i64> {
    payload.get(key).and_then(Value::as_i64)
}

/// Render `kind` with `payload`. Relative links resolve against `app_base_url`.
pub fn render(kind: NotificationType, payload: &Value, app_base_url: &str) -> RenderedNotification {
    let base = app_base_url.trim_end_matches('/');

    match kind {
        NotificationType::EodReminder => {
            let when = str_field(payload, "date")
                .map(|d| format!(" for {d}"))
                .unwrap_or_default();
            RenderedNotification {
                title: "📝 End-of-day report reminder".into(),
                body: format!(
                    "You haven't submitted your end-of-day report{when} yet. It only takes a minute."
                ),
                buttons: vec![ActionButton::new("Submit EOD", format!("{base}/eod"))],
            }
        }
        NotificationType::TaskAssigned => {
            let title = str_field(payload, "task_title").unwrap_or("a task");
            let mut body = format!("You've been assigned {}.", quote(title));
            if let Some(by) = str_field(payload, "assigned_by") {
                body.push_str(&format!("\nAssigned by: {by}"));
            }
            if let Some(priority) = str_field(payload, "priority") {
                body.push_str(&format!("\nPriority: {priority}"));
            }
            if let Some(due) = str_field(payload, "due_date") {
                body.push_str(&format!("\nDue: {due}"));
            }
            let url = match str_field(payload, "task_id") {
                Some(id) => format!("{base}/tasks/{id}"),
                None => format!("{base}/tasks"),
            };
            RenderedNotification {
                title: "📌 New task assigned".into(),
                body,
                buttons: vec![ActionButton::new("View task", url)],
            }
        }
        NotificationType::MeetingReminder => {
            let title = str_field(payload, "meeting_title").unwrap_or("Your meeting");
            let mut body = match int_field(payload, "minutes_until") {
                Some(m) if m > 0 => format!("{} starts in {m} min.", quote(title)),
                _ => format!("{} is starting soon.", quote(title)),
            };
            if let Some(starts_at) = str_field(payload, "starts_at") {
                body.push_str(&format!("\nStarts at: {starts_at}"));
            }
            let buttons = str_field(payload, "meeting_link")
                .map(|link| vec![ActionButton::new("Join meeting", link)])
                .unwrap_or_default();
            RenderedNotification {
                title: "⏰ Meeting reminder".into(),
                body,
                buttons,
            }
        }
        NotificationType::StreakMilestone => {
            let body = match int_field(payload, "streak_days") {
                Some(days) => format!("You've submitted your EOD {days} days in a row. Keep it going!"),
                None => "You've hit a new EOD streak milestone. Keep it going!".into(),
            };
            RenderedNotification {
                title: "🔥 Streak milestone".into(),
                body,
                buttons: vec![ActionButton::new("View streak", format!("{base}/streak"))],
            }
        }
        NotificationType::BadgeEarned => {
            let badge = str_field(payload, "badge_name").unwrap_or("a new badge");
            let mut body = format!("You earned {}.", quote(badge));
            if let Some(description) = str_field(payload, "description") {
                body.push_str(&format!("\n{description}"));
            }
            RenderedNotification {
                title: "🏅 Badge earned".into(),
                body,
                buttons: vec![ActionButton::new("View badges", format!("{base}/badges"))],
            }
        }
    }
}

fn quote(text: &str) -> String {
    format!("\"{text}\"")
}
