//! REST client for the Telegram Bot API.
//!
//! Wraps `sendMessage` and `answerCallbackQuery` using [`reqwest`]. Every
//! Bot API response carries an `{ok, result, description}` envelope; a
//! non-`ok` envelope becomes [`TransportError::Api`].

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::TransportError;
use crate::outbound::{OutboundMessage, SentMessage};
use crate::transport::ChatTransport;
use crate::types::Message;

/// Default Bot API base URL.
pub const DEFAULT_API_BASE: &str = "https://api.telegram.org";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// HTTP client for one bot token.
pub struct TelegramClient {
    client: reqwest::Client,
    api_base: String,
    token: String,
}

#[derive(Debug, Deserialize)]
struct ApiEnvelope<T> {
    ok: bool,
    result: Option<T>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    error_code: Option<u16>,
}

#[derive(Serialize)]
struct AnswerCallbackBody<'a> {
    callback_query_id: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<&'a str>,
}

impl TelegramClient {
    /// Create a client with its own connection pool.
    ///
    /// * `api_base` - e.g. `https://api.telegram.org`; a trailing slash is ignored.
    pub fn new(api_base: impl Into<String>, token: impl Into<String>) -> Result<Self, TransportError> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self::with_client(client, api_base, token))
    }

    /// Create a client reusing an existing [`reqwest::Client`].
    pub fn with_client(
        client: reqwest::Client,
        api_base: impl Into<String>,
        token: impl Into<String>,
    ) -> Self {
        Self {
            client,
            api_base: api_base.into().trim_end_matches('/').to_string(),
            token: token.into(),
        }
    }

    fn method_url(&self, method: &str) -> String {
        format!("{}/bot{}/{method}", self.api_base, self.token)
    }

    async fn call<B, T>(&self, method: &str, body: &B) -> Result<T, TransportError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let response = self
            .client
            .post(self.method_url(method))
            .json(body)
            .send()
            .await?;
        Self::parse_envelope(response).await
    }

    // ---- private helpers ----

    /// Decode the response envelope, mapping `ok: false` and non-2xx
    /// statuses to [`TransportError::Api`].
    async fn parse_envelope<T: DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, TransportError> {
        let status = response.status();
        let body = response.text().await?;

        let envelope: ApiEnvelope<T> = match serde_json::from_str(&body) {
            Ok(envelope) => envelope,
            Err(_) if !status.is_success() => {
                return Err(TransportError::Api {
                    status: status.as_u16(),
                    description: body,
                });
            }
            Err(e) => return Err(TransportError::Decode(e.to_string())),
        };

        if !envelope.ok || !status.is_success() {
            return Err(TransportError::Api {
                status: envelope.error_code.unwrap_or(status.as_u16()),
                description: envelope
                    .description
                    .unwrap_or_else(|| "<no description>".to_string()),
            });
        }

        envelope
            .result
            .ok_or_else(|| TransportError::Decode("missing result".to_string()))
    }
}

#[async_trait]
impl ChatTransport for TelegramClient {
    async fn send_message(&self, message: &OutboundMessage) -> Result<SentMessage, TransportError> {
        let sent: Message = self.call("sendMessage", message).await?;
        Ok(SentMessage {
            message_id: sent.message_id,
            chat_id: sent.chat.id,
            sent_at: DateTime::from_timestamp(sent.date, 0).unwrap_or_else(Utc::now),
        })
    }

    async fn answer_callback(
        &self,
        callback_query_id: &str,
        text: Option<&str>,
    ) -> Result<(), TransportError> {
        let _: bool = self
            .call(
                "answerCallbackQuery",
                &AnswerCallbackBody {
                    callback_query_id,
                    text,
                },
            )
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn method_url_ignores_trailing_slash() {
        let client = TelegramClient::with_client(reqwest::Client::new(), "http://localhost:8081/", "123:abc");
        assert_eq!(
            client.method_url("sendMessage"),
            "http://localhost:8081/bot123:abc/sendMessage"
        );
    }

    #[test]
    fn error_envelope_decodes() {
        let envelope: ApiEnvelope<Message> = serde_json::from_str(
            r#"{"ok":false,"error_code":403,"description":"Forbidden: bot was blocked by the user"}"#,
        )
        .unwrap();
        assert!(!envelope.ok);
        assert_eq!(envelope.error_code, Some(403));
        assert!(envelope.result.is_none());
    }
}
