//! `/today`: pending tasks, today's meetings, and EOD status in one view.

use chatlink_core::domain::Meeting;
use chatlink_core::notification::ActionButton;
use chatlink_core::time::{local_date, local_day_bounds};
use chatlink_core::types::Timestamp;
use chatlink_db::Directory;
use chrono_tz::Tz;

use super::{pending_tasks, task_line};
use crate::error::BotResult;
use crate::reply::Reply;
use crate::session::Session;

const MAX_TODAY_TASKS: usize = 5;

pub async fn run(
    directory: &dyn Directory,
    session: &Session,
    now: Timestamp,
    app_base_url: &str,
) -> BotResult<Reply> {
    let (tenant_id, user_id) = (session.tenant_id(), session.user_id());
    let today = local_date(now, session.tz);
    let (day_start, day_end) = local_day_bounds(now, session.tz);

    let (tasks, meetings, eod_submitted) = tokio::join!(
        directory.tasks_assigned_to(tenant_id, user_id),
        directory.meetings_for_attendee(tenant_id, user_id, day_start, day_end),
        directory.has_eod_report(tenant_id, user_id, today),
    );
    let pending = pending_tasks(tasks?, user_id);
    let meetings = meetings?;
    let eod_submitted = eod_submitted?;

    let base = app_base_url.trim_end_matches('/');
    let mut sections = vec![format!("📅 Today, {}", today.format("%A, %b %-d"))];

    let mut task_section = format!("📋 Pending tasks: {}", pending.len());
    for task in pending.iter().take(MAX_TODAY_TASKS) {
        task_section.push('\n');
        task_section.push_str(&task_line(task, user_id));
    }
    if pending.len() > MAX_TODAY_TASKS {
        task_section.push_str(&format!("\n…and {} more", pending.len() - MAX_TODAY_TASKS));
    }
    sections.push(task_section);

    sections.push(meeting_section(&meetings, session.tz));

    sections.push(if eod_submitted {
        "📝 EOD report: ✅ submitted".to_string()
    } else {
        "📝 EOD report: ⏳ not submitted yet".to_string()
    });

    let mut links = vec![ActionButton::new("Open tasks", format!("{base}/tasks"))];
    if !eod_submitted {
        links.push(ActionButton::new("Submit EOD", format!("{base}/eod")));
    }

    Ok(Reply::text(sections.join("\n\n")).with_links(&links))
}

fn meeting_section(meetings: &[Meeting], tz: Tz) -> String {
    if meetings.is_empty() {
        return "🗓 Meetings: none today".to_string();
    }
    let mut section = format!("🗓 Meetings: {}", meetings.len());
    for meeting in meetings {
        let local = meeting.meeting_date_time.with_timezone(&tz);
        section.push_str(&format!("\n• {} {}", local.format("%H:%M"), meeting.title));
    }
    section
}
