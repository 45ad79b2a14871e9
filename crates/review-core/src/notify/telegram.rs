use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::{NotifyError, Notifier};
use crate::config::PollerConfig;
use crate::error::error_chain;

#[derive(Serialize)]
struct SendMessageRequest<'a> {
    chat_id: &'a str,
    text: &'a str,
}

/// Error envelope returned by the Bot API on failure.
#[derive(Deserialize)]
struct ApiReply {
    #[serde(default)]
    description: Option<String>,
}

/// Sends messages through the Telegram Bot API `sendMessage` method.
#[derive(Clone)]
pub struct TelegramNotifier {
    client: Client,
    api_base: String,
    bot_token: String,
    chat_id: String,
}

impl TelegramNotifier {
    pub fn new(
        client: Client,
        api_base: impl Into<String>,
        bot_token: impl Into<String>,
        chat_id: impl Into<String>,
    ) -> Self {
        Self {
            client,
            api_base: api_base.into(),
            bot_token: bot_token.into(),
            chat_id: chat_id.into(),
        }
    }

    pub fn from_config(
        config: &PollerConfig,
        client: Client,
        bot_token: impl Into<String>,
        chat_id: impl Into<String>,
    ) -> Self {
        Self::new(client, config.telegram_api.clone(), bot_token, chat_id)
    }

    fn method_url(&self, method: &str) -> String {
        format!("{}/bot{}/{}", self.api_base, self.bot_token, method)
    }
}

impl std::fmt::Debug for TelegramNotifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TelegramNotifier")
            .field("api_base", &self.api_base)
            .field("chat_id", &self.chat_id)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl Notifier for TelegramNotifier {
    async fn send_message(&self, text: &str) -> Result<(), NotifyError> {
        info!(chat_id = %self.chat_id, text, "Sending message to Telegram");

        let body = SendMessageRequest {
            chat_id: &self.chat_id,
            text,
        };
        // The bot token is part of the URL, so reqwest errors are stripped of it.
        let response = self
            .client
            .post(self.method_url("sendMessage"))
            .json(&body)
            .send()
            .await
            .map_err(|e| NotifyError::Transport(error_chain(&e.without_url())))?;

        let status = response.status();
        if !status.is_success() {
            let description = response
                .json::<ApiReply>()
                .await
                .ok()
                .and_then(|r| r.description)
                .unwrap_or_else(|| status.canonical_reason().unwrap_or("Unknown").to_string());
            return Err(NotifyError::Rejected {
                status: status.as_u16(),
                description,
            });
        }

        debug!(chat_id = %self.chat_id, "Message delivered");
        Ok(())
    }
}
