//! Telegram webhook: decodes updates, runs them through the conversation and
//! sends the reply back over the chat transport.

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Json,
};
use subtle::ConstantTimeEq;
use tracing::{debug, error, warn};

use crate::conversation::messages;
use crate::errors::AppError;
use crate::state::AppState;
use crate::telegram::models::{Dispatch, Update};

/// POST /webhook/:token
///
/// The path token must match the bot token. Accepted updates always get 200,
/// even when processing fails, so Telegram does not redeliver them.
pub async fn handle_update(
    State(state): State<AppState>,
    Path(token): Path<String>,
    payload: Result<Json<Update>, JsonRejection>,
) -> Result<StatusCode, AppError> {
    if !token_matches(&token, &state.config.telegram_token) {
        return Err(AppError::Unauthorized);
    }
    let Json(update) = payload.map_err(|e| AppError::BadRequest(e.body_text()))?;

    process_update(&state, update).await;
    Ok(StatusCode::OK)
}

/// Compares the path token with the bot token in constant time.
fn token_matches(provided: &str, expected: &str) -> bool {
    provided.as_bytes().ct_eq(expected.as_bytes()).into()
}

/// Runs one update to completion, including the outbound reply.
pub async fn process_update(state: &AppState, update: Update) {
    let Some(dispatch) = update.dispatch() else {
        debug!("Ignoring update {}", update.update_id);
        return;
    };

    let (chat_id, reply) = match dispatch {
        Dispatch::Hello {
            chat_id,
            first_name,
        } => (chat_id, Some(messages::hello(&first_name))),
        Dispatch::Conversation(key, inbound) => {
            match state.controller.handle(key, inbound).await {
                Ok(reply) => (key.chat_id, reply),
                Err(e) => {
                    warn!("Update {} caused error: {e}", update.update_id);
                    (key.chat_id, Some(messages::GENERATION_FAILED.to_string()))
                }
            }
        }
    };

    let Some(text) = reply else {
        return;
    };
    if let Err(e) = state.transport.send_message(chat_id, &text).await {
        error!(
            "Failed to deliver reply for update {} to chat {chat_id}: {e}",
            update.update_id
        );
    }
}
