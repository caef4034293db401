//! `/unlink` and its confirmation callbacks.

use chatlink_core::types::ExternalId;
use chatlink_telegram::InlineButton;

use crate::command::{UNLINK_CANCEL, UNLINK_CONFIRM};
use crate::error::BotResult;
use crate::identity::IdentityLinks;
use crate::ledger::ChatLedger;
use crate::messages;
use crate::reply::Reply;
use crate::session::Session;

/// First step: ask. Nothing changes until the confirm callback arrives.
pub fn prompt(_session: &Session) -> Reply {
    Reply::text(messages::UNLINK_PROMPT).with_row(vec![
        InlineButton::callback("Yes, unlink", UNLINK_CONFIRM),
        InlineButton::callback("Cancel", UNLINK_CANCEL),
    ])
}

pub async fn confirm(
    links: &IdentityLinks,
    ledger: &ChatLedger,
    external_id: ExternalId,
) -> BotResult<Reply> {
    if links.unlink(external_id).await?.is_none() {
        return Ok(Reply::text(messages::NOT_LINKED));
    }
    ledger.propagate_linkage(external_id, None).await?;
    Ok(Reply::text(messages::UNLINK_DONE))
}

pub fn cancel() -> Reply {
    Reply::text(messages::UNLINK_CANCELLED)
}
