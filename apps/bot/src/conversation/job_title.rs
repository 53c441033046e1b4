//! Job title validation against the fixed allow-list of data and analytics roles.

use thiserror::Error;

/// Job titles the bot accepts, lower-cased.
pub const ACCEPTED_JOB_TITLES: &[&str] = &[
    "data scientist",
    "machine learning engineer",
    "data analyst",
    "data engineer",
    "statistician",
    "ml researcher",
    "data architect",
    "data mining engineer",
    "applied ml scientist",
    "data science manager",
    "ml ops engineer",
    "data science intern",
    "research data scientist",
    "senior data scientist",
    "lead data scientist",
    "principal data scientist",
    "chief data scientist",
    "business intelligence analyst",
];

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// The message is sent to the user as-is.
    #[error("Oops! Only Data Science and Analytics jobs are allowed for now! You can /start over!")]
    InvalidJobTitle { rejected: String },
}

/// A job title that matched the allow-list.
///
/// Only [`JobValidator::validate`] constructs this, so holding one means the
/// title was accepted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobTitle {
    entered: String,
    canonical: &'static str,
}

impl JobTitle {
    /// The title as the user typed it (surrounding whitespace removed).
    pub fn as_entered(&self) -> &str {
        &self.entered
    }

    /// The allow-list entry the title matched.
    pub fn canonical(&self) -> &'static str {
        self.canonical
    }
}

/// Stateless validator, built once at startup and shared by the controller.
#[derive(Debug, Clone, Copy)]
pub struct JobValidator {
    accepted: &'static [&'static str],
}

impl Default for JobValidator {
    fn default() -> Self {
        Self {
            accepted: ACCEPTED_JOB_TITLES,
        }
    }
}

impl JobValidator {
    pub fn validate(&self, text: &str) -> Result<JobTitle, ValidationError> {
        let entered = text.trim();
        let folded = entered.to_lowercase();

        self.accepted
            .iter()
            .find(|accepted| **accepted == folded)
            .map(|canonical| JobTitle {
                entered: entered.to_string(),
                canonical,
            })
            .ok_or_else(|| ValidationError::InvalidJobTitle {
                rejected: entered.to_string(),
            })
    }
}
