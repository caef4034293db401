use async_trait::async_trait;

use crate::error::TransportError;
use crate::outbound::{OutboundMessage, SentMessage};

/// The outbound half of the platform integration.
///
/// Constructed once per process and shared behind an `Arc`.
#[async_trait]
pub trait ChatTransport: Send + Sync {
    async fn send_message(&self, message: &OutboundMessage) -> Result<SentMessage, TransportError>;

    /// Dismiss the client-side spinner on an inline button press.
    async fn answer_callback(
        &self,
        callback_query_id: &str,
        text: Option<&str>,
    ) -> Result<(), TransportError>;
}
