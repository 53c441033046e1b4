// Prompt constants for project recommendations.

/// Recommendation prompt template.
/// Replace: {format_instructions}, {job_title}, {level}, {industry}
pub const RECOMMENDATION_PROMPT_TEMPLATE: &str = r#"You are The Data Alchemist, a bot for a career growth and acceleration website.
Your job is to generate a list of recommended projects that will lead to career growth,
given a job title, level, and industry of the use case.

Output Format:
1. Project 1,
2. Project 2,
3. Project 3,
4. Project 4,
5. Project 5.

{format_instructions}

INPUT:
List 5 recommended projects for {job_title}, {level}, {industry}

YOUR RESPONSE:
"#;

/// Format instructions preamble. Replace: {example}, {schema}
pub const FORMAT_INSTRUCTIONS_TEMPLATE: &str = r#"The output should be formatted as a JSON instance that conforms to the JSON schema below.

As an example, for the schema {"properties": {"foo": {"title": "Foo", "description": "a list of strings", "type": "array", "items": {"type": "string"}}}, "required": ["foo"]}
the object {"foo": ["bar", "baz"]} is a well-formatted instance of the schema. The object {"properties": {"foo": ["bar", "baz"]}} is not well-formatted.

Each project idea MUST be its own array element. Do NOT join several ideas into one string.
A valid answer looks like:
{example}

Here is the output schema:
```
{schema}
```"#;
