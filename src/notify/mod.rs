//! Owner notifications through the Telegram Bot API.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use crate::{
    config::Config,
    error::{AppError, Result},
};

const TELEGRAM_API_URL: &str = "https://api.telegram.org";

/// Telegram caps message text at 4096 characters.
const MAX_MESSAGE_CHARS: usize = 4096;

/// Confirmation that a notification was accepted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Delivery {
    pub delivered: bool,
    pub chat_id: i64,
}

/// Chat notification collaborator.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Send a text message to the owner.
    async fn notify(&self, text: &str) -> Result<Delivery>;
}

#[derive(Debug, Serialize)]
struct SendMessage<'a> {
    chat_id: i64,
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct TelegramResponse {
    ok: bool,
    description: Option<String>,
}

/// Sends messages to the owner's chat.
pub struct TelegramNotifier {
    client: Client,
    api_url: String,
    bot_token: SecretString,
    owner_chat_id: i64,
}

impl TelegramNotifier {
    /// Create a notifier when both the bot token and owner id are configured.
    pub fn from_config(config: &Config) -> Result<Option<Self>> {
        let Some(settings) = config.telegram() else {
            tracing::warn!("Telegram bot token or owner id not configured");
            return Ok(None);
        };

        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| AppError::Transport(format!("Failed to create HTTP client: {}", e)))?;

        tracing::info!(owner = settings.owner_chat_id, "Telegram notifier initialized");

        Ok(Some(Self {
            client,
            api_url: TELEGRAM_API_URL.to_string(),
            bot_token: SecretString::from(settings.bot_token.expose_secret().to_string()),
            owner_chat_id: settings.owner_chat_id,
        }))
    }
}

#[async_trait]
impl Notifier for TelegramNotifier {
    async fn notify(&self, text: &str) -> Result<Delivery> {
        let text = truncate_message(text);
        let url = format!("{}/bot{}/sendMessage", self.api_url, self.bot_token.expose_secret());

        let response = self
            .client
            .post(&url)
            .json(&SendMessage { chat_id: self.owner_chat_id, text: &text })
            .send()
            .await
            // reqwest errors embed the URL, which carries the bot token.
            .map_err(|e| AppError::Transport(e.without_url().to_string()))?;

        let status = response.status();
        let body: TelegramResponse = response
            .json()
            .await
            .map_err(|e| AppError::Parse(e.without_url().to_string()))?;

        if !body.ok {
            return Err(AppError::Transport(format!(
                "Telegram returned {}: {}",
                status,
                body.description.unwrap_or_else(|| "unknown error".to_string())
            )));
        }

        tracing::debug!(chat_id = self.owner_chat_id, "Notification delivered");
        Ok(Delivery { delivered: true, chat_id: self.owner_chat_id })
    }
}

fn truncate_message(text: &str) -> String {
    if text.chars().count() <= MAX_MESSAGE_CHARS {
        return text.to_string();
    }
    let mut truncated: String = text.chars().take(MAX_MESSAGE_CHARS - 1).collect();
    truncated.push('…');
    truncated
}
