use std::time::Duration;

use anyhow::{Context, Result};

/// Application configuration loaded from environment variables.
/// Startup fails if required variables are missing.
#[derive(Debug, Clone)]
pub struct Config {
    pub telegram_token: String,
    pub openai_api_key: String,
    /// Public base URL; when set, the webhook is registered with Telegram on startup.
    pub webhook_url: Option<String>,
    pub session_ttl: Duration,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            telegram_token: require_env("TELEGRAM_TOKEN")?,
            openai_api_key: require_env("OPENAI_API_KEY")?,
            webhook_url: std::env::var("WEBHOOK_URL").ok().filter(|v| !v.trim().is_empty()),
            session_ttl: Duration::from_secs(
                std::env::var("SESSION_TTL_SECS")
                    .unwrap_or_else(|_| "1800".to_string())
                    .parse::<u64>()
                    .context("SESSION_TTL_SECS must be a whole number of seconds")?,
            ),
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}
