//! Recommendation Parser — reduces a raw completion to exactly five project ideas.
//!
//! Primary path: decode `{"project_ideas": [...]}` and accept a 5-element list.
//! Repair path: when the model packs every idea into the first entry as one
//! comma-joined string, split it. The repair is best-effort; anything that does
//! not come out as five non-empty ideas is rejected.

use serde::Deserialize;
use serde_json::{json, Value};
use thiserror::Error;
use tracing::debug;

/// Number of recommendations every successful parse yields.
pub const RECOMMENDATION_COUNT: usize = 5;

/// Name of the single list field in the structured output.
pub const PROJECT_IDEAS_FIELD: &str = "project_ideas";

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("completion contains no JSON object")]
    NoStructure,

    #[error("completion does not match the project ideas schema: {0}")]
    Schema(#[from] serde_json::Error),

    #[error("completion contains an empty project ideas list")]
    EmptyList,

    #[error("expected {expected} project ideas, found {found}", expected = RECOMMENDATION_COUNT)]
    WrongCount { found: usize },

    #[error("project idea {index} is blank")]
    BlankIdea { index: usize },
}

/// Structured output the model is asked to produce.
#[derive(Debug, Deserialize)]
struct ProjectIdeas {
    project_ideas: Vec<String>,
}

/// JSON Schema of the structured output, embedded in the prompt's format instructions.
pub fn output_schema() -> Value {
    json!({
        "properties": {
            PROJECT_IDEAS_FIELD: {
                "title": "Project Ideas",
                "description": "List of project ideas.",
                "type": "array",
                "items": { "type": "string" }
            }
        },
        "required": [PROJECT_IDEAS_FIELD]
    })
}

/// Exactly five non-empty recommendations, in display order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecommendationSet([String; RECOMMENDATION_COUNT]);

impl RecommendationSet {
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }
}

impl TryFrom<Vec<String>> for RecommendationSet {
    type Error = ParseError;

    fn try_from(ideas: Vec<String>) -> Result<Self, Self::Error> {
        if let Some(index) = ideas.iter().position(|idea| idea.trim().is_empty()) {
            return Err(ParseError::BlankIdea { index });
        }
        let found = ideas.len();
        let ideas: [String; RECOMMENDATION_COUNT] = ideas
            .try_into()
            .map_err(|_| ParseError::WrongCount { found })?;
        Ok(Self(ideas))
    }
}

/// Stateless parser, built once at startup and shared by the controller.
#[derive(Debug, Clone, Copy, Default)]
pub struct RecommendationParser;

impl RecommendationParser {
    pub fn parse(&self, raw: &str) -> Result<RecommendationSet, ParseError> {
        // Raw control characters inside strings are invalid JSON.
        let flattened: String = raw
            .chars()
            .filter(|c| !matches!(c, '\n' | '\r'))
            .map(|c| if c == '\t' { ' ' } else { c })
            .collect();
        let payload = extract_json_object(&flattened).ok_or(ParseError::NoStructure)?;
        let decoded: ProjectIdeas = serde_json::from_str(payload)?;

        if decoded.project_ideas.len() == RECOMMENDATION_COUNT {
            return RecommendationSet::try_from(decoded.project_ideas);
        }

        debug!(
            "Completion held {} project ideas, trying comma-split repair",
            decoded.project_ideas.len()
        );
        let collapsed = decoded
            .project_ideas
            .into_iter()
            .next()
            .ok_or(ParseError::EmptyList)?;
        let pieces: Vec<String> = collapsed
            .split(',')
            .map(|piece| piece.trim().to_string())
            .collect();

        RecommendationSet::try_from(pieces)
    }
}

/// Returns the span from the first `{` to the last `}`, inclusive.
fn extract_json_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (start < end).then(|| &text[start..=end])
}
