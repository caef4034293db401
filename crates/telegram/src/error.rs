/// Errors from sending through the Bot API.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// The HTTP request itself failed (network, DNS, TLS, timeout).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The API answered with `ok: false` or a non-2xx status.
    #[error("Telegram API error ({status}): {description}")]
    Api { status: u16, description: String },

    /// The API answered 2xx but the body did not match the expected shape.
    #[error("Unexpected Telegram response: {0}")]
    Decode(String),
}

impl TransportError {
    /// The recipient can never be reached: the user blocked the bot, deleted
    /// their account, or the chat no longer exists.
    pub fn is_permanent(&self) -> bool {
        match self {
            TransportError::Api {
                status: 403,
                ..
            } => true,
            TransportError::Api {
                status: 400,
                description,
            } => {
                let description = description.to_ascii_lowercase();
                description.contains("chat not found") || description.contains("user is deactivated")
            }
            _ => false,
        }
    }

    /// Worth another attempt after a delay.
    pub fn is_retryable(&self) -> bool {
        match self {
            TransportError::Request(e) => e.is_timeout() || e.is_connect() || e.is_request(),
            TransportError::Api { status, .. } => *status == 429 || *status >= 500,
            TransportError::Decode(_) => false,
        }
    }
}
