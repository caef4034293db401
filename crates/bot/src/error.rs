use chatlink_core::error::CoreError;
use chatlink_db::StoreError;
use chatlink_telegram::TransportError;

use crate::messages;

/// Everything a bot operation can fail with.
///
/// `Domain` errors are expected outcomes and become guidance text in the
/// chat. The rest are infrastructure failures that get logged and absorbed
/// at the webhook boundary.
#[derive(Debug, thiserror::Error)]
pub enum BotError {
    #[error(transparent)]
    Domain(#[from] CoreError),

    #[error("Downstream fetch failed: {0}")]
    DownstreamFetchFailure(#[from] StoreError),

    #[error("Transport send failed: {0}")]
    TransportSendFailure(#[from] TransportError),

    #[error("No unique linking code after {attempts} attempts")]
    CodeSpaceExhausted { attempts: usize },
}

pub type BotResult<T> = Result<T, BotError>;

impl BotError {
    /// Short, actionable text for the chat user. Never includes internals.
    pub fn user_message(&self) -> &'static str {
        match self {
            BotError::Domain(CoreError::InvalidOrExpiredCode) => messages::INVALID_CODE,
            BotError::Domain(CoreError::NotLinked { .. }) => messages::NOT_LINKED,
            BotError::Domain(CoreError::TenantMissing { .. }) => messages::TENANT_MISSING,
            BotError::Domain(CoreError::AlreadyLinked { .. }) => messages::ALREADY_LINKED,
            _ => messages::TEMPORARY_FAILURE,
        }
    }
}
