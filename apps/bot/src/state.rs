use std::sync::Arc;

use crate::config::Config;
use crate::conversation::controller::ConversationController;
use crate::telegram::ChatTransport;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub controller: Arc<ConversationController>,
    /// Outbound chat channel. Default: TelegramClient.
    pub transport: Arc<dyn ChatTransport>,
    pub config: Config,
}
