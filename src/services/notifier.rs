//! Operator notifications over the Telegram Bot API.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Serialize;
use std::time::Duration;
use tracing::{error, info, warn};

use crate::config::{NotifyConfig, Secrets};
use crate::error::NotifyError;

#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, message: &str) -> Result<(), NotifyError>;
}

/// Sends and logs the outcome; delivery problems stop here.
pub async fn notify_best_effort(notifier: &dyn Notifier, message: &str) {
    if let Err(e) = notifier.send(message).await {
        error!("❌ [NOTIFY] Error sending notification: {}", e);
    }
}

#[derive(Serialize)]
struct SendMessage<'a> {
    chat_id: &'a str,
    text: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    parse_mode: Option<&'a str>,
}

#[derive(Clone)]
pub struct TelegramNotifier {
    client: Client,
    api_base_url: String,
    bot_token: String,
    chat_id: String,
}

impl TelegramNotifier {
    pub fn new(config: &NotifyConfig, secrets: &Secrets) -> Result<Self, reqwest::Error> {
        Self::with_credentials(
            config,
            secrets.telegram_bot_token.clone(),
            secrets.telegram_chat_id.clone(),
        )
    }

    pub fn with_credentials(
        config: &NotifyConfig,
        bot_token: String,
        chat_id: String,
    ) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self {
            client,
            api_base_url: config.api_base_url.trim_end_matches('/').to_string(),
            bot_token,
            chat_id,
        })
    }

    /// Used when configuration itself failed to load: whatever Telegram
    /// credentials the environment has, with default transport settings.
    pub fn from_env_best_effort() -> Option<Self> {
        let token = std::env::var("TELEGRAM_BOT_TOKEN").ok()?;
        let chat_id = std::env::var("TELEGRAM_CHAT_ID").ok()?;
        Self::with_credentials(&NotifyConfig::default(), token, chat_id).ok()
    }

    fn is_configured(&self) -> bool {
        !self.bot_token.is_empty() && !self.chat_id.is_empty()
    }

    async fn post(&self, text: &str, parse_mode: Option<&str>) -> Result<(), NotifyError> {
        let url = format!("{}/bot{}/sendMessage", self.api_base_url, self.bot_token);
        let resp = self
            .client
            .post(&url)
            .json(&SendMessage {
                chat_id: &self.chat_id,
                text,
                parse_mode,
            })
            .send()
            .await
            // the request URL carries the bot token
            .map_err(|e| NotifyError::Http(e.without_url()))?;

        let status = resp.status();
        if status.is_success() {
            return Ok(());
        }
        let body = resp.text().await.unwrap_or_default();
        Err(NotifyError::Rejected {
            status: status.as_u16(),
            body,
        })
    }
}

#[async_trait]
impl Notifier for TelegramNotifier {
    async fn send(&self, message: &str) -> Result<(), NotifyError> {
        if !self.is_configured() {
            warn!("⚠️ [NOTIFY] Telegram Bot Token or Chat ID not set. Skipping notification.");
            return Err(NotifyError::Disabled);
        }

        match self.post(message, Some("Markdown")).await {
            Ok(()) => {}
            // model output often breaks Telegram's Markdown parser
            Err(NotifyError::Rejected { status, .. }) if status == StatusCode::BAD_REQUEST.as_u16() => {
                warn!("⚠️ [NOTIFY] Markdown rejected, retrying as plain text");
                self.post(message, None).await?;
            }
            Err(e) => return Err(e),
        }

        info!("📨 [NOTIFY] Telegram alert sent successfully.");
        Ok(())
    }
}
