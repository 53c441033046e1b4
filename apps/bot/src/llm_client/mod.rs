/// LLM Client — the single point of entry for all OpenAI calls in the bot.
///
/// Other modules depend on the `CompletionGateway` trait, never on the HTTP
/// client directly, so tests can substitute canned completions.
///
/// Model and temperature are hardcoded. No retries: a failed call surfaces
/// immediately to the conversation.
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

const OPENAI_COMPLETIONS_URL: &str = "https://api.openai.com/v1/completions";
/// The completion model used for every recommendation request.
pub const MODEL: &str = "gpt-3.5-turbo-instruct";
/// Moderate creativity: varied ideas that still follow the format instructions.
pub const TEMPERATURE: f32 = 0.7;
const MAX_TOKENS: u32 = 256;

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("LLM returned empty content")]
    EmptyContent,
}

/// Sends a prompt to a text completion provider and returns the raw completion.
#[async_trait]
pub trait CompletionGateway: Send + Sync {
    async fn complete(&self, prompt: &str) -> Result<String, LlmError>;
}

#[derive(Debug, Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Deserialize)]
pub struct CompletionResponse {
    pub choices: Vec<Choice>,
    pub usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
pub struct Choice {
    pub text: String,
}

#[derive(Debug, Deserialize)]
pub struct Usage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
}

impl CompletionResponse {
    /// Extracts the text of the first non-blank choice.
    pub fn text(&self) -> Option<&str> {
        self.choices
            .iter()
            .map(|c| c.text.as_str())
            .find(|t| !t.trim().is_empty())
    }
}

#[derive(Debug, Deserialize)]
struct OpenAiError {
    error: OpenAiErrorBody,
}

#[derive(Debug, Deserialize)]
struct OpenAiErrorBody {
    message: String,
}

/// Pulls the provider's error message out of an error body, falling back to the raw body.
fn api_error_message(body: String) -> String {
    serde_json::from_str::<OpenAiError>(&body)
        .map(|e| e.error.message)
        .unwrap_or(body)
}

/// OpenAI completions client. Cheap to clone; the connection pool is shared.
#[derive(Clone)]
pub struct LlmClient {
    client: Client,
    api_key: String,
}

impl LlmClient {
    pub fn new(api_key: String) -> Result<Self, LlmError> {
        Ok(Self {
            client: Client::builder()
                .timeout(std::time::Duration::from_secs(120))
                .build()?,
            api_key,
        })
    }

    /// Makes a raw call to the completions API, returning the full response object.
    pub async fn call(&self, prompt: &str) -> Result<CompletionResponse, LlmError> {
        let request_body = CompletionRequest {
            model: MODEL,
            prompt,
            temperature: TEMPERATURE,
            max_tokens: MAX_TOKENS,
        };

        let response = self
            .client
            .post(OPENAI_COMPLETIONS_URL)
            .bearer_auth(&self.api_key)
            .json(&request_body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(LlmError::Api {
                status: status.as_u16(),
                message: api_error_message(body),
            });
        }

        let body = response.text().await?;
        let completion: CompletionResponse = serde_json::from_str(&body)?;

        if let Some(usage) = &completion.usage {
            debug!(
                "LLM call succeeded: prompt_tokens={}, completion_tokens={}",
                usage.prompt_tokens, usage.completion_tokens
            );
        }

        Ok(completion)
    }
}

#[async_trait]
impl CompletionGateway for LlmClient {
    async fn complete(&self, prompt: &str) -> Result<String, LlmError> {
        let response = self.call(prompt).await?;
        response
            .text()
            .map(str::to_string)
            .ok_or(LlmError::EmptyContent)
    }
}
