use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;

use crate::utils::error::{Result, WatchError};

const SEND_TIMEOUT: Duration = Duration::from_secs(30);
// Transport deadline must outlive the server-side long-poll wait.
const POLL_TIMEOUT_MARGIN: Duration = Duration::from_secs(10);

/// An inbound update from the notification channel. Updates that carry no
/// usable message still get an entry here, so the caller can advance its
/// cursor past them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundMessage {
    pub id: i64,
    pub sender_id: i64,
    pub text: String,
}

/// The single notification channel: outbound operator messages and inbound
/// operator commands.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MessageBus: Send + Sync {
    async fn send(&self, text: &str) -> Result<()>;

    /// Long-poll for updates with ids greater than `since_id`, waiting at
    /// most `timeout` on the server side.
    async fn poll_updates(&self, since_id: i64, timeout: Duration) -> Result<Vec<InboundMessage>>;
}

/// Telegram Bot API over plain HTTP: `sendMessage` out, `getUpdates` in.
pub struct TelegramBus {
    client: reqwest::Client,
    api_base: String,
    chat_id: i64,
}

impl TelegramBus {
    pub fn new(token: &str, chat_id: i64) -> Self {
        Self::with_api_root("https://api.telegram.org", token, chat_id)
    }

    /// Point the bus at a different API root. Used by tests to talk to a
    /// local mock server.
    pub fn with_api_root(root: &str, token: &str, chat_id: i64) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_base: format!("{}/bot{}", root.trim_end_matches('/'), token),
            chat_id,
        }
    }
}

#[derive(Debug, Deserialize)]
struct ApiEnvelope<T> {
    ok: bool,
    #[serde(default)]
    description: Option<String>,
    result: Option<T>,
}

#[derive(Debug, Deserialize)]
struct ApiUpdate {
    update_id: i64,
    message: Option<ApiMessage>,
}

#[derive(Debug, Deserialize)]
struct ApiMessage {
    from: Option<ApiUser>,
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiUser {
    id: i64,
}

#[async_trait]
impl MessageBus for TelegramBus {
    async fn send(&self, text: &str) -> Result<()> {
        let response = self
            .client
            .post(format!("{}/sendMessage", self.api_base))
            .timeout(SEND_TIMEOUT)
            .json(&json!({ "chat_id": self.chat_id, "text": text }))
            .send()
            .await
            .map_err(|e| WatchError::Send(format!("sendMessage request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(WatchError::Send(format!(
                "sendMessage returned status {}",
                status
            )));
        }

        let envelope: ApiEnvelope<serde_json::Value> = response
            .json()
            .await
            .map_err(|e| WatchError::Send(format!("sendMessage response unreadable: {}", e)))?;
        if !envelope.ok {
            return Err(WatchError::Send(format!(
                "sendMessage rejected: {}",
                envelope.description.unwrap_or_else(|| "no description".to_string())
            )));
        }

        tracing::debug!("sent message ({} chars)", text.chars().count());
        Ok(())
    }

    async fn poll_updates(&self, since_id: i64, timeout: Duration) -> Result<Vec<InboundMessage>> {
        let response = self
            .client
            .post(format!("{}/getUpdates", self.api_base))
            .timeout(timeout + POLL_TIMEOUT_MARGIN)
            .json(&json!({
                "offset": since_id + 1,
                "timeout": timeout.as_secs(),
                "allowed_updates": ["message"],
            }))
            .send()
            .await
            .map_err(|e| WatchError::Poll(format!("getUpdates request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(WatchError::Poll(format!(
                "getUpdates returned status {}",
                status
            )));
        }

        let envelope: ApiEnvelope<Vec<ApiUpdate>> = response
            .json()
            .await
            .map_err(|e| WatchError::Poll(format!("getUpdates response unreadable: {}", e)))?;
        if !envelope.ok {
            return Err(WatchError::Poll(format!(
                "getUpdates rejected: {}",
                envelope.description.unwrap_or_else(|| "no description".to_string())
            )));
        }

        let messages = envelope
            .result
            .unwrap_or_default()
            .into_iter()
            .map(|update| {
                let message = update.message.unwrap_or(ApiMessage {
                    from: None,
                    text: None,
                });
                InboundMessage {
                    id: update.update_id,
                    sender_id: message.from.map(|user| user.id).unwrap_or(0),
                    text: message.text.unwrap_or_default(),
                }
            })
            .collect();

        Ok(messages)
    }
}
