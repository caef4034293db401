//! `/help`.

use crate::messages;
use crate::reply::Reply;
use crate::session::Session;

pub fn run(session: &Session) -> Reply {
    Reply::text(format!("Hi {}! {}", session.user.display_name, messages::HELP))
}
