//! Webhook update handling.
//!
//! [`CommandRouter::handle_update`] never fails: domain errors become chat
//! replies, infrastructure errors are logged, and the caller always gets an
//! [`UpdateOutcome`] it can acknowledge.

use std::sync::Arc;

use chatlink_core::chat::SenderProfile;
use chatlink_core::clock::Clock;
use chatlink_core::types::ChatId;
use chatlink_db::{Directory, UpdateLog};
use chatlink_telegram::{CallbackQuery, ChatTransport, Message, Update};

use crate::authority::LinkingCodeAuthority;
use crate::command::{CallbackAction, Command};
use crate::commands;
use crate::error::{BotError, BotResult};
use crate::identity::IdentityLinks;
use crate::ledger::ChatLedger;
use crate::messages;
use crate::reply::Reply;
use crate::services::BotConfig;
use crate::session::Session;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateOutcome {
    Handled,
    /// Already processed within the dedup window.
    Duplicate,
    /// Nothing to act on (no sender, non-text message, unknown callback).
    Ignored,
    /// An infrastructure error was logged and absorbed.
    Failed,
}

pub struct CommandRouter {
    pub(crate) authority: Arc<LinkingCodeAuthority>,
    pub(crate) links: Arc<IdentityLinks>,
    pub(crate) ledger: Arc<ChatLedger>,
    pub(crate) directory: Arc<dyn Directory>,
    pub(crate) updates: Arc<dyn UpdateLog>,
    pub(crate) transport: Arc<dyn ChatTransport>,
    pub(crate) clock: Arc<dyn Clock>,
    pub(crate) config: Arc<BotConfig>,
}

impl CommandRouter {
    pub async fn handle_update(&self, update: &Update) -> UpdateOutcome {
        let update_id = update.update_id;
        match self
            .updates
            .mark_seen(update_id, self.clock.now(), self.config.dedup_ttl)
            .await
        {
            Ok(true) => {}
            Ok(false) => {
                tracing::debug!(update_id, "Duplicate update ignored");
                return UpdateOutcome::Duplicate;
            }
            Err(e) => {
                tracing::error!(update_id, error = %e, "Dedup check failed, processing anyway");
            }
        }

        if let Some(message) = &update.message {
            self.handle_message(message).await
        } else if let Some(query) = &update.callback_query {
            self.handle_callback(query).await
        } else {
            UpdateOutcome::Ignored
        }
    }

    async fn handle_message(&self, message: &Message) -> UpdateOutcome {
        let (Some(from), Some(text)) = (&message.from, message.text.as_deref()) else {
            return UpdateOutcome::Ignored;
        };
        if from.is_bot {
            return UpdateOutcome::Ignored;
        }
        let sender = SenderProfile::from(from);
        let chat_id = message.chat.id;

        if let Err(e) = self
            .ledger
            .record_inbound(chat_id, message.message_id, text, &sender)
            .await
        {
            tracing::error!(chat_id, error = %e, "Failed to record inbound message");
        }

        let result = match Command::parse(text, &self.config.bot_username) {
            Some(command) => {
                tracing::debug!(chat_id, external_id = sender.external_id, command = command.name(), "Command received");
                self.run_command(command, &sender).await
            }
            None => Ok(Reply::text(messages::UNKNOWN_COMMAND)),
        };
        self.settle(chat_id, result).await
    }

    async fn run_command(&self, command: Command, sender: &SenderProfile) -> BotResult<Reply> {
        let base = self.config.app_base_url.as_str();
        let directory = self.directory.as_ref();

        match command {
            Command::Start { payload } => {
                commands::start::run(
                    &self.authority,
                    &self.links,
                    &self.ledger,
                    sender,
                    payload.as_deref(),
                )
                .await
            }
            Command::Unknown(_) => Ok(Reply::text(messages::UNKNOWN_COMMAND)),
            protected => {
                let session = Session::resolve(&self.links, directory, sender.external_id).await?;
                match protected {
                    Command::Help => Ok(commands::help::run(&session)),
                    Command::Tasks => commands::tasks::run(directory, &session, base).await,
                    Command::Today => {
                        commands::today::run(directory, &session, self.clock.now(), base).await
                    }
                    Command::Streak => commands::streak::run(directory, &session).await,
                    Command::Leaderboard => Ok(commands::leaderboard::run(&session, base)),
                    Command::Unlink => Ok(commands::unlink::prompt(&session)),
                    Command::Start { .. } | Command::Unknown(_) => {
                        Ok(Reply::text(messages::UNKNOWN_COMMAND))
                    }
                }
            }
        }
    }

    async fn handle_callback(&self, query: &CallbackQuery) -> UpdateOutcome {
        if let Err(e) = self.transport.answer_callback(&query.id, None).await {
            tracing::warn!(callback_query_id = %query.id, error = %e, "Failed to answer callback");
        }

        let external_id = query.from.id;
        let chat_id = query.reply_chat_id();

        let result = match CallbackAction::parse(query.data.as_deref().unwrap_or_default()) {
            CallbackAction::UnlinkConfirm => {
                commands::unlink::confirm(&self.links, &self.ledger, external_id).await
            }
            CallbackAction::UnlinkCancel => Ok(commands::unlink::cancel()),
            CallbackAction::Unknown(data) => {
                tracing::debug!(external_id, data = %data, "Unknown callback ignored");
                return UpdateOutcome::Ignored;
            }
        };
        self.settle(chat_id, result).await
    }

    /// Turn a handler result into a reply and send it.
    async fn settle(&self, chat_id: ChatId, result: BotResult<Reply>) -> UpdateOutcome {
        let (reply, outcome) = match result {
            Ok(reply) => (reply, UpdateOutcome::Handled),
            Err(e @ BotError::Domain(_)) => {
                tracing::info!(chat_id, reason = %e, "Command refused");
                (Reply::text(e.user_message()), UpdateOutcome::Handled)
            }
            Err(e) => {
                tracing::error!(chat_id, error = %e, "Command failed");
                (Reply::text(e.user_message()), UpdateOutcome::Failed)
            }
        };
        self.send_reply(chat_id, reply).await;
        outcome
    }

    async fn send_reply(&self, chat_id: ChatId, reply: Reply) {
        let text = reply.text.clone();
        let sent = match self.transport.send_message(&reply.into_outbound(chat_id)).await {
            Ok(sent) => sent,
            Err(e) => {
                tracing::error!(chat_id, error = %e, "Failed to send reply");
                return;
            }
        };
        if let Err(e) = self
            .ledger
            .record_outbound(sent.chat_id, sent.message_id, &text, self.clock.now())
            .await
        {
            tracing::error!(chat_id, error = %e, "Failed to record outbound message");
        }
    }
}
