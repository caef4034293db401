//! Command handlers.
//!
//! Each handler reads what it needs and returns a [`Reply`](crate::reply::Reply);
//! the router does the sending and the ledger bookkeeping.

pub mod help;
pub mod leaderboard;
pub mod start;
pub mod streak;
pub mod tasks;
pub mod today;
pub mod unlink;

use std::cmp::Ordering;

use chatlink_core::domain::{priority_rank, Task};
use chrono::NaiveDate;

/// Keep the caller's pending tasks, most urgent first: priority, then
/// earliest due date (undated last), then title.
pub fn pending_tasks(mut tasks: Vec<Task>, user_id: &str) -> Vec<Task> {
    tasks.retain(|task| task.is_pending_for(user_id));
    tasks.sort_by(|a, b| {
        priority_rank(a.priority.as_deref())
            .cmp(&priority_rank(b.priority.as_deref()))
            .then_with(|| due_order(a.due_date, b.due_date))
            .then_with(|| a.title.cmp(&b.title))
    });
    tasks
}

fn due_order(a: Option<NaiveDate>, b: Option<NaiveDate>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.cmp(&b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// `• Title` plus a detail line with status, priority and due date.
pub fn task_line(task: &Task, user_id: &str) -> String {
    let mut details = vec![task.status_for(user_id).label()];
    if let Some(priority) = task.priority.as_deref().filter(|p| !p.trim().is_empty()) {
        details.push(format!("{priority} priority"));
    }
    if let Some(due) = task.due_date {
        details.push(format!("due {}", due.format("%b %-d")));
    }
    format!("• {}\n   {}", task.title, details.join(" · "))
}
