/// Telegram Bot API binding. Sends replies and registers the webhook;
/// incoming updates arrive through the webhook route and are decoded by
/// `models::Update::dispatch`.
use async_trait::async_trait;
use reqwest::Client;
use thiserror::Error;
use tracing::{debug, info};

pub mod models;

use crate::telegram::models::{ApiResponse, SendMessage, SetWebhook};

const TELEGRAM_API_URL: &str = "https://api.telegram.org";

#[derive(Debug, Error)]
pub enum TelegramError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Bot API error (status {status}): {description}")]
    Api { status: u16, description: String },
}

/// Outbound side of the chat transport: delivers a text reply to a chat.
#[async_trait]
pub trait ChatTransport: Send + Sync {
    async fn send_message(&self, chat_id: i64, text: &str) -> Result<(), TelegramError>;
}

#[derive(Clone)]
pub struct TelegramClient {
    client: Client,
    token: String,
}

impl TelegramClient {
    pub fn new(token: String) -> Result<Self, TelegramError> {
        Ok(Self {
            client: Client::builder()
                .timeout(std::time::Duration::from_secs(30))
                .build()?,
            token,
        })
    }

    fn method_url(&self, method: &str) -> String {
        format!("{TELEGRAM_API_URL}/bot{}/{method}", self.token)
    }

    /// Points Telegram at `{base_url}/webhook/{token}`.
    pub async fn set_webhook(&self, base_url: &str) -> Result<(), TelegramError> {
        let url = webhook_url(base_url, &self.token);
        self.post("setWebhook", &SetWebhook { url: &url }).await?;
        info!(
            "Webhook registered at {}/webhook/<token>",
            base_url.trim_end_matches('/')
        );
        Ok(())
    }

    async fn post<T: serde::Serialize + ?Sized>(
        &self,
        method: &str,
        body: &T,
    ) -> Result<(), TelegramError> {
        let response = self
            .client
            .post(self.method_url(method))
            .json(body)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        let parsed = serde_json::from_str::<ApiResponse>(&body).ok();

        match parsed {
            Some(ApiResponse { ok: true, .. }) => {
                debug!("Bot API {method} succeeded");
                Ok(())
            }
            Some(ApiResponse { description, .. }) => Err(TelegramError::Api {
                status: status.as_u16(),
                description: description.unwrap_or(body),
            }),
            None => Err(TelegramError::Api {
                status: status.as_u16(),
                description: body,
            }),
        }
    }
}

#[async_trait]
impl ChatTransport for TelegramClient {
    async fn send_message(&self, chat_id: i64, text: &str) -> Result<(), TelegramError> {
        self.post("sendMessage", &SendMessage { chat_id, text }).await
    }
}

/// Full webhook URL for a public base URL.
pub fn webhook_url(base_url: &str, token: &str) -> String {
    format!("{}/webhook/{token}", base_url.trim_end_matches('/'))
}
