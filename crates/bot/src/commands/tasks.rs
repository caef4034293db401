//! `/tasks`.

use chatlink_core::notification::ActionButton;
use chatlink_db::Directory;

use super::{pending_tasks, task_line};
use crate::error::BotResult;
use crate::reply::Reply;
use crate::session::Session;

/// At most this many tasks are listed in chat.
pub const MAX_LISTED_TASKS: usize = 10;

pub async fn run(directory: &dyn Directory, session: &Session, app_base_url: &str) -> BotResult<Reply> {
    let tasks = directory
        .tasks_assigned_to(session.tenant_id(), session.user_id())
        .await?;
    let pending = pending_tasks(tasks, session.user_id());
    let tasks_url = format!("{}/tasks", app_base_url.trim_end_matches('/'));

    if pending.is_empty() {
        return Ok(Reply::text("🎉 You have no pending tasks. Nice work!"));
    }

    let mut lines = vec![format!("📋 Your pending tasks ({}):", pending.len()), String::new()];
    lines.extend(
        pending
            .iter()
            .take(MAX_LISTED_TASKS)
            .map(|task| task_line(task, session.user_id())),
    );
    if pending.len() > MAX_LISTED_TASKS {
        lines.push(format!("…and {} more", pending.len() - MAX_LISTED_TASKS));
    }

    Ok(Reply::text(lines.join("\n")).with_links(&[ActionButton::new("Open tasks", tasks_url)]))
}
