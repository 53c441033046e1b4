use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Errors surfaced on the HTTP side of the bot.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
/// Conversation failures never become HTTP errors; they are reported to the
/// user through the chat instead.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Unauthorized")]
    Unauthorized,

    #[error("Bad request: {0}")]
    BadRequest(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                "UNAUTHORIZED",
                "Unknown webhook token".to_string(),
            ),
            AppError::BadRequest(msg) => {
                tracing::warn!("Rejected webhook payload: {msg}");
                (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg.clone())
            }
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}
