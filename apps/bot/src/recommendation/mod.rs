// Project recommendations: prompt construction and completion parsing.
// The completion itself comes from llm_client via the CompletionGateway seam.

pub mod parser;
pub mod prompts;
pub mod request;
