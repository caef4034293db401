//! `/streak`.

use chatlink_db::Directory;

use crate::error::BotResult;
use crate::reply::Reply;
use crate::session::Session;

pub async fn run(directory: &dyn Directory, session: &Session) -> BotResult<Reply> {
    let streak = directory
        .streak(session.tenant_id(), session.user_id())
        .await?;

    if streak.current_streak <= 0 {
        return Ok(Reply::text(
            "No active EOD streak right now. Submit today's report to start one! 💪",
        ));
    }

    let mut text = format!(
        "🔥 Current streak: {} day{}\n🏆 Longest streak: {} day{}",
        streak.current_streak,
        plural(streak.current_streak),
        streak.longest_streak,
        plural(streak.longest_streak),
    );
    if let Some(last) = streak.last_report_date {
        text.push_str(&format!("\n📝 Last report: {}", last.format("%b %-d, %Y")));
    }
    Ok(Reply::text(text))
}

fn plural(n: i32) -> &'static str {
    if n == 1 {
        ""
    } else {
        "s"
    }
}
