//! `/start [code]`.

use chatlink_core::chat::SenderProfile;
use chatlink_core::error::CoreError;

use crate::authority::LinkingCodeAuthority;
use crate::error::BotResult;
use crate::identity::IdentityLinks;
use crate::ledger::ChatLedger;
use crate::messages;
use crate::reply::Reply;

/// Idempotent for linked callers; consumes `payload` as a linking code
/// otherwise.
pub async fn run(
    authority: &LinkingCodeAuthority,
    links: &IdentityLinks,
    ledger: &ChatLedger,
    sender: &SenderProfile,
    payload: Option<&str>,
) -> BotResult<Reply> {
    let external_id = sender.external_id;

    if links.resolve(external_id).await?.is_some() {
        links.refresh_profile(sender).await?;
        return Ok(Reply::text(format!(
            "👋 Welcome back, {}! Your chat is linked.\n\nSend /help to see what I can do.",
            sender.display_name()
        )));
    }

    let Some(code) = payload else {
        return Ok(Reply::text(messages::ONBOARDING));
    };

    let Some(owner) = authority.verify_and_consume(code).await? else {
        tracing::info!(external_id, "Linking code rejected");
        return Err(CoreError::InvalidOrExpiredCode.into());
    };

    let outcome = links
        .link(sender, &owner.owner_user_id, &owner.tenant_id)
        .await?;
    ledger
        .propagate_linkage(external_id, Some(&outcome.link().snapshot()))
        .await?;

    Ok(Reply::text(format!(
        "✅ You're all set, {}! This chat is now linked to your account.\n\n\
         Send /help to see what I can do.",
        sender.display_name()
    )))
}
