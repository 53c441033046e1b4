//! Builds the recommendation prompt from the collected conversation fields.

use serde_json::json;

use crate::conversation::job_title::JobTitle;
use crate::recommendation::parser::{output_schema, PROJECT_IDEAS_FIELD, RECOMMENDATION_COUNT};
use crate::recommendation::prompts::{FORMAT_INSTRUCTIONS_TEMPLATE, RECOMMENDATION_PROMPT_TEMPLATE};

#[derive(Debug, Clone)]
pub struct RecommendationRequestBuilder {
    format_instructions: String,
}

impl Default for RecommendationRequestBuilder {
    fn default() -> Self {
        Self {
            format_instructions: format_instructions(),
        }
    }
}

impl RecommendationRequestBuilder {
    pub fn build(&self, job_title: &JobTitle, level: &str, industry: &str) -> String {
        fill_template(
            RECOMMENDATION_PROMPT_TEMPLATE,
            &[
                ("format_instructions", &self.format_instructions),
                ("job_title", job_title.as_entered()),
                ("level", level),
                ("industry", industry),
            ],
        )
    }
}

/// Substitutes every `{name}` placeholder in one pass over `template`.
/// Inserted values are never scanned again, so braces in user input stay as typed.
fn fill_template(template: &str, values: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let tail = &rest[open + 1..];
        let hit = values.iter().find_map(|(name, value)| {
            tail.strip_prefix(*name)
                .and_then(|after| after.strip_prefix('}'))
                .map(|after| (*value, after))
        });
        match hit {
            Some((value, after)) => {
                out.push_str(value);
                rest = after;
            }
            None => {
                out.push('{');
                rest = tail;
            }
        }
    }
    out.push_str(rest);
    out
}

/// Renders the schema and a well-formed example into the format instructions.
fn format_instructions() -> String {
    let example_ideas: Vec<String> = (1..=RECOMMENDATION_COUNT)
        .map(|n| format!("Project {n}"))
        .collect();
    let example = json!({ PROJECT_IDEAS_FIELD: example_ideas });

    fill_template(
        FORMAT_INSTRUCTIONS_TEMPLATE,
        &[
            ("example", &example.to_string()),
            ("schema", &output_schema().to_string()),
        ],
    )
}
