//! `/leaderboard` is a deep link into the app; nothing is computed in chat.

use chatlink_core::notification::ActionButton;

use crate::reply::Reply;
use crate::session::Session;

pub fn run(_session: &Session, app_base_url: &str) -> Reply {
    let url = format!("{}/leaderboard", app_base_url.trim_end_matches('/'));
    Reply::text("🏆 See how your team is doing on the leaderboard.")
        .with_links(&[ActionButton::new("Open leaderboard", url)])
}
