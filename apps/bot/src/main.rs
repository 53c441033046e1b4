mod config;
mod conversation;
mod errors;
mod llm_client;
mod recommendation;
mod routes;
mod state;
mod telegram;

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::{debug, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::conversation::controller::ConversationController;
use crate::conversation::job_title::JobValidator;
use crate::conversation::session::SessionStore;
use crate::llm_client::LlmClient;
use crate::recommendation::parser::RecommendationParser;
use crate::recommendation::request::RecommendationRequestBuilder;
use crate::routes::build_router;
use crate::state::AppState;
use crate::telegram::TelegramClient;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_CRATE_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Data Alchemist bot v{}", env!("CARGO_PKG_VERSION"));

    // Initialize LLM client
    let llm = LlmClient::new(config.openai_api_key.clone())?;
    info!(
        "LLM client initialized (model: {}, temperature: {})",
        llm_client::MODEL,
        llm_client::TEMPERATURE
    );

    // Initialize Telegram client and register the webhook when a public URL is configured
    let telegram = TelegramClient::new(config.telegram_token.clone())?;
    match &config.webhook_url {
        Some(url) => telegram.set_webhook(url).await?,
        None => info!("WEBHOOK_URL not set; expecting the webhook to be registered externally"),
    }

    // Conversation controller with its stateless collaborators built once here
    let controller = Arc::new(ConversationController::new(
        SessionStore::new(config.session_ttl),
        JobValidator::default(),
        RecommendationRequestBuilder::default(),
        RecommendationParser,
        Arc::new(llm),
    ));
    info!("Session idle timeout: {}s", config.session_ttl.as_secs());

    spawn_session_sweeper(controller.clone());

    // Build app state
    let state = AppState {
        controller,
        transport: Arc::new(telegram),
        config: config.clone(),
    };

    // Build router
    let app = build_router(state).layer(TraceLayer::new_for_http());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Periodically drops sessions that went idle, so abandoned conversations do
/// not accumulate between messages.
fn spawn_session_sweeper(controller: Arc<ConversationController>) {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(std::time::Duration::from_secs(60));
        loop {
            interval.tick().await;
            let purged = controller.sessions().purge_expired().await;
            if purged > 0 {
                debug!("Purged {purged} idle sessions");
            }
        }
    });
}
