use serde::{Deserialize, Serialize};

use crate::conversation::controller::Inbound;
use crate::conversation::session::SessionKey;

/// Incoming update pushed to the webhook. Only plain messages are handled;
/// every other update kind deserializes with `message: None`.
#[derive(Debug, Clone, Deserialize)]
pub struct Update {
    pub update_id: i64,
    pub message: Option<Message>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Message {
    pub from: Option<User>,
    pub chat: Chat,
    pub text: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct User {
    pub id: i64,
    pub first_name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Chat {
    pub id: i64,
}

/// Bot commands the bot reacts to. Anything else starting with `/` is dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Start,
    Cancel,
    Hello,
}

impl Command {
    /// Parses `/name`, `/name@BotName` and `/name args`.
    pub fn parse(text: &str) -> Option<Self> {
        let word = text.trim_start().strip_prefix('/')?.split_whitespace().next()?;
        let name = word.split('@').next().unwrap_or(word);
        match name {
            "start" => Some(Command::Start),
            "cancel" => Some(Command::Cancel),
            "hello" => Some(Command::Hello),
            _ => None,
        }
    }
}

/// What the webhook should do with a message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dispatch {
    /// Feed the conversation.
    Conversation(SessionKey, Inbound),
    /// Standalone greeting outside the conversation.
    Hello { chat_id: i64, first_name: String },
}

impl Update {
    /// Maps the update to a dispatch target. Non-message updates, messages
    /// without text or sender, and unknown commands yield `None`.
    pub fn dispatch(&self) -> Option<Dispatch> {
        let message = self.message.as_ref()?;
        let text = message.text.as_deref()?;
        let from = message.from.as_ref()?;
        let key = SessionKey {
            chat_id: message.chat.id,
            user_id: from.id,
        };

        if text.trim_start().starts_with('/') {
            return match Command::parse(text)? {
                Command::Start => Some(Dispatch::Conversation(key, Inbound::Start)),
                Command::Cancel => Some(Dispatch::Conversation(key, Inbound::Cancel)),
                Command::Hello => Some(Dispatch::Hello {
                    chat_id: message.chat.id,
                    first_name: from.first_name.clone(),
                }),
            };
        }

        Some(Dispatch::Conversation(key, Inbound::Text(text.to_string())))
    }
}

/// Body of `sendMessage`.
#[derive(Debug, Serialize)]
pub struct SendMessage<'a> {
    pub chat_id: i64,
    pub text: &'a str,
}

/// Body of `setWebhook`.
#[derive(Debug, Serialize)]
pub struct SetWebhook<'a> {
    pub url: &'a str,
}

/// Envelope of every Bot API response.
#[derive(Debug, Deserialize)]
pub struct ApiResponse {
    pub ok: bool,
    pub description: Option<String>,
}
