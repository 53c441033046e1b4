//! Conversation Controller — drives the three-question intake dialog.
//!
//! Flow: /start → job title (validated) → job level → industry →
//!       build prompt → LLM completion → parse → summary reply.
//!
//! Each call to `handle` is one inbound message and runs to completion,
//! including the LLM call on the final step. The session is removed before
//! that call, so the conversation is over whatever the outcome.

use std::sync::Arc;

use thiserror::Error;
use tracing::{info, warn};

use crate::conversation::job_title::{JobTitle, JobValidator, ValidationError};
use crate::conversation::messages;
use crate::conversation::session::{SessionKey, SessionStore, Step};
use crate::llm_client::{CompletionGateway, LlmError};
use crate::recommendation::parser::{ParseError, RecommendationParser};
use crate::recommendation::request::RecommendationRequestBuilder;

/// Input the transport hands to the controller. Other commands and non-text
/// messages are filtered out before they get here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inbound {
    Start,
    Cancel,
    Text(String),
}

/// Failures on the final step. The conversation has already ended when these
/// are returned.
#[derive(Debug, Error)]
pub enum ConversationError {
    #[error("recommendation generation failed: {0}")]
    GenerationFailed(#[from] LlmError),

    #[error("could not parse recommendations: {0}")]
    Parse(#[from] ParseError),
}

pub struct ConversationController {
    sessions: SessionStore,
    validator: JobValidator,
    request_builder: RecommendationRequestBuilder,
    parser: RecommendationParser,
    llm: Arc<dyn CompletionGateway>,
}

impl ConversationController {
    pub fn new(
        sessions: SessionStore,
        validator: JobValidator,
        request_builder: RecommendationRequestBuilder,
        parser: RecommendationParser,
        llm: Arc<dyn CompletionGateway>,
    ) -> Self {
        Self {
            sessions,
            validator,
            request_builder,
            parser,
            llm,
        }
    }

    pub fn sessions(&self) -> &SessionStore {
        &self.sessions
    }

    /// Applies one inbound message to the user's conversation and returns the
    /// reply to send, if any.
    pub async fn handle(
        &self,
        key: SessionKey,
        inbound: Inbound,
    ) -> Result<Option<String>, ConversationError> {
        match inbound {
            Inbound::Start => Ok(self.start(key).await),
            Inbound::Cancel => Ok(self.cancel(key).await),
            Inbound::Text(text) => self.text(key, text).await,
        }
    }

    async fn start(&self, key: SessionKey) -> Option<String> {
        if !self.sessions.begin(key).await {
            // No re-entry: /start inside a running conversation is ignored.
            return None;
        }
        info!("Conversation started for user {}", key.user_id);
        Some(messages::GREETING.to_string())
    }

    async fn cancel(&self, key: SessionKey) -> Option<String> {
        let session = self.sessions.take(key).await?;
        info!(
            "Conversation cancelled for user {} at step {}",
            key.user_id,
            session.step.id()
        );
        Some(messages::CANCELLED.to_string())
    }

    async fn text(&self, key: SessionKey, text: String) -> Result<Option<String>, ConversationError> {
        let Some(session) = self.sessions.take(key).await else {
            return Ok(None);
        };

        match session.step {
            Step::AwaitingTitle => match self.validator.validate(&text) {
                Ok(job_title) => {
                    let reply = messages::ask_level(job_title.as_entered());
                    self.sessions.put(key, Step::AwaitingLevel { job_title }).await;
                    Ok(Some(reply))
                }
                Err(e) => {
                    let ValidationError::InvalidJobTitle { rejected } = &e;
                    info!("Rejected job title {rejected:?} from user {}", key.user_id);
                    Ok(Some(e.to_string()))
                }
            },
            Step::AwaitingLevel { job_title } => {
                self.sessions
                    .put(
                        key,
                        Step::AwaitingIndustry {
                            job_title,
                            job_level: text,
                        },
                    )
                    .await;
                Ok(Some(messages::ASK_INDUSTRY.to_string()))
            }
            Step::AwaitingIndustry {
                job_title,
                job_level,
            } => {
                let reply = self.recommend(&job_title, &job_level, &text).await;
                if let Err(e) = &reply {
                    warn!("Recommendation failed for user {}: {e}", key.user_id);
                }
                reply.map(Some)
            }
        }
    }

    async fn recommend(
        &self,
        job_title: &JobTitle,
        job_level: &str,
        industry: &str,
    ) -> Result<String, ConversationError> {
        let prompt = self.request_builder.build(job_title, job_level, industry);
        let raw = self.llm.complete(&prompt).await?;
        let ideas = self.parser.parse(&raw)?;

        info!(
            "Generated {} recommendations for {}",
            ideas.as_slice().len(),
            job_title.canonical()
        );

        Ok(messages::summary(
            job_title.as_entered(),
            job_level,
            industry,
            &ideas,
        ))
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use std::sync::Mutex;
    use std::time::Duration;

    use async_trait::async_trait;

    use super::*;

    /// Returns a fixed completion and records every prompt it receives.
    pub(crate) struct CannedGateway {
        reply: Result<String, u16>,
        pub prompts: Mutex<Vec<String>>,
    }

    impl CannedGateway {
        pub(crate) fn ok(text: &str) -> Self {
            Self {
                reply: Ok(text.to_string()),
                prompts: Mutex::new(Vec::new()),
            }
        }

        pub(crate) fn failing(status: u16) -> Self {
            Self {
                reply: Err(status),
                prompts: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl CompletionGateway for CannedGateway {
        async fn complete(&self, prompt: &str) -> Result<String, LlmError> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            self.reply.clone().map_err(|status| LlmError::Api {
                status,
                message: "provider unavailable".to_string(),
            })
        }
    }

    pub(crate) const FIVE_IDEAS: &str = r#"{"project_ideas": ["Build a fraud model", "Create a dashboard", "Forecast loan defaults", "Automate risk reporting", "Detect trading anomalies"]}"#;

    pub(crate) fn controller_with(gateway: Arc<CannedGateway>) -> ConversationController {
        ConversationController::new(
            SessionStore::new(Duration::from_secs(1800)),
            JobValidator::default(),
            RecommendationRequestBuilder::default(),
            RecommendationParser,
            gateway,
        )
    }

    const KEY: SessionKey = SessionKey {
        chat_id: 42,
        user_id: 7,
    };

    fn text(s: &str) -> Inbound {
        Inbound::Text(s.to_string())
    }

    async fn say(controller: &ConversationController, inbound: Inbound) -> Option<String> {
        controller.handle(KEY, inbound).await.unwrap()
    }

    #[tokio::test]
    async fn test_full_conversation_returns_summary() {
        let gateway = Arc::new(CannedGateway::ok(FIVE_IDEAS));
        let controller = controller_with(gateway.clone());

        let greeting = say(&controller, Inbound::Start).await.unwrap();
        assert_eq!(greeting, messages::GREETING);

        let ack = say(&controller, text("data scientist")).await.unwrap();
        assert_eq!(ack, "Got it, your job title is data scientist. What is your job level?");

        let ask = say(&controller, text("senior")).await.unwrap();
        assert_eq!(ask, messages::ASK_INDUSTRY);

        let summary = say(&controller, text("finance")).await.unwrap();
        assert!(summary.contains("Job Title: Data Scientist\n"));
        assert!(summary.contains("Job Level: Senior\n"));
        assert!(summary.contains("Industry: Finance\n"));

        let positions: Vec<usize> = [
            "Build a fraud model",
            "Create a dashboard",
            "Forecast loan defaults",
            "Automate risk reporting",
            "Detect trading anomalies",
        ]
        .iter()
        .map(|idea| summary.find(idea).expect("idea missing from summary"))
        .collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]));

        let prompts = gateway.prompts.lock().unwrap();
        assert_eq!(prompts.len(), 1);
        assert!(prompts[0].contains("data scientist, senior, finance"));
        drop(prompts);

        assert_eq!(controller.sessions().active_count().await, 0);
    }

    #[tokio::test]
    async fn test_title_validation_is_case_insensitive() {
        let controller = controller_with(Arc::new(CannedGateway::ok(FIVE_IDEAS)));
        say(&controller, Inbound::Start).await;

        let ack = say(&controller, text("DATA SCIENTIST")).await.unwrap();
        assert!(ack.contains("DATA SCIENTIST"));
        assert_eq!(say(&controller, text("lead")).await.unwrap(), messages::ASK_INDUSTRY);
    }

    #[tokio::test]
    async fn test_invalid_title_ends_conversation() {
        let gateway = Arc::new(CannedGateway::ok(FIVE_IDEAS));
        let controller = controller_with(gateway.clone());
        say(&controller, Inbound::Start).await;

        let reply = say(&controller, text("plumber")).await.unwrap();
        assert_eq!(
            reply,
            "Oops! Only Data Science and Analytics jobs are allowed for now! You can /start over!"
        );
        assert_eq!(controller.sessions().active_count().await, 0);

        // Nothing left to cancel or continue.
        assert!(say(&controller, Inbound::Cancel).await.is_none());
        assert!(say(&controller, text("senior")).await.is_none());
        assert!(gateway.prompts.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_cancel_discards_session_at_every_step() {
        for answers in [vec![], vec!["data analyst"], vec!["data analyst", "junior"]] {
            let controller = controller_with(Arc::new(CannedGateway::ok(FIVE_IDEAS)));
            say(&controller, Inbound::Start).await;
            for answer in &answers {
                say(&controller, text(answer)).await;
            }

            let reply = say(&controller, Inbound::Cancel).await.unwrap();
            assert_eq!(reply, messages::CANCELLED);
            assert_eq!(controller.sessions().active_count().await, 0);

            // A fresh /start remembers nothing: the next text is a job title again.
            assert_eq!(say(&controller, Inbound::Start).await.unwrap(), messages::GREETING);
            let reply = say(&controller, text("junior")).await.unwrap();
            assert!(reply.starts_with("Oops!"));
        }
    }

    #[tokio::test]
    async fn test_cancel_without_session_is_ignored() {
        let controller = controller_with(Arc::new(CannedGateway::ok(FIVE_IDEAS)));
        assert!(say(&controller, Inbound::Cancel).await.is_none());
    }

    #[tokio::test]
    async fn test_text_without_session_is_ignored() {
        let controller = controller_with(Arc::new(CannedGateway::ok(FIVE_IDEAS)));
        assert!(say(&controller, text("data scientist")).await.is_none());
        assert_eq!(controller.sessions().active_count().await, 0);
    }

    #[tokio::test]
    async fn test_start_during_conversation_is_ignored() {
        let gateway = Arc::new(CannedGateway::ok(FIVE_IDEAS));
        let controller = controller_with(gateway.clone());
        say(&controller, Inbound::Start).await;
        say(&controller, text("data engineer")).await;

        assert!(say(&controller, Inbound::Start).await.is_none());

        // Still waiting for the level.
        assert_eq!(say(&controller, text("mid")).await.unwrap(), messages::ASK_INDUSTRY);
        say(&controller, text("retail")).await.unwrap();
        assert!(gateway.prompts.lock().unwrap()[0].contains("data engineer, mid, retail"));
    }

    #[tokio::test]
    async fn test_generation_failure_propagates_and_ends_conversation() {
        let controller = controller_with(Arc::new(CannedGateway::failing(503)));
        say(&controller, Inbound::Start).await;
        say(&controller, text("statistician")).await;
        say(&controller, text("senior")).await;

        let err = controller.handle(KEY, text("healthcare")).await.unwrap_err();
        assert!(matches!(
            err,
            ConversationError::GenerationFailed(LlmError::Api { status: 503, .. })
        ));
        assert_eq!(controller.sessions().active_count().await, 0);
    }

    #[tokio::test]
    async fn test_unparseable_completion_propagates() {
        let controller = controller_with(Arc::new(CannedGateway::ok(
            "Here are some ideas: build things, ship things.",
        )));
        say(&controller, Inbound::Start).await;
        say(&controller, text("data architect")).await;
        say(&controller, text("staff")).await;

        let err = controller.handle(KEY, text("energy")).await.unwrap_err();
        assert!(matches!(err, ConversationError::Parse(ParseError::NoStructure)));
        assert_eq!(controller.sessions().active_count().await, 0);
    }

    #[tokio::test]
    async fn test_collapsed_completion_is_repaired() {
        let controller = controller_with(Arc::new(CannedGateway::ok(
            r#"{"project_ideas": ["Churn model, Pricing engine, Demand forecast, Customer segments, A/B platform"]}"#,
        )));
        say(&controller, Inbound::Start).await;
        say(&controller, text("data analyst")).await;
        say(&controller, text("junior")).await;

        let summary = say(&controller, text("retail")).await.unwrap();
        assert!(summary.contains("\n\nChurn model\n\nPricing engine\n\nDemand forecast\n\nCustomer segments\n\nA/B platform\n\nGood Luck!"));
    }

    #[tokio::test]
    async fn test_users_are_isolated() {
        let controller = controller_with(Arc::new(CannedGateway::ok(FIVE_IDEAS)));
        let other = SessionKey {
            chat_id: 42,
            user_id: 8,
        };
        say(&controller, Inbound::Start).await;
        say(&controller, text("data scientist")).await;

        assert!(controller.handle(other, text("senior")).await.unwrap().is_none());
        assert_eq!(
            controller.handle(other, Inbound::Start).await.unwrap().unwrap(),
            messages::GREETING
        );
        assert_eq!(say(&controller, text("senior")).await.unwrap(), messages::ASK_INDUSTRY);
    }
}
