// User-facing reply texts.

use crate::recommendation::parser::RecommendationSet;

pub const GREETING: &str = "Hi, I am The Data Alchemist, your AI assistant.\n\
    I am here to help you get started with your career growth.\n\
    Please tell me your job title.";

pub const ASK_INDUSTRY: &str = "Thanks. Finally, what industry are you looking to work in?";

pub const CANCELLED: &str = "Bye! I canceled the conversation.";

pub const GENERATION_FAILED: &str =
    "Sorry, I couldn't come up with your project ideas this time. Please /start again.";

pub fn hello(first_name: &str) -> String {
    format!("Hello {first_name}. I am The Data Alchemist. Click on /start to get started!")
}

pub fn ask_level(job_title: &str) -> String {
    format!("Got it, your job title is {job_title}. What is your job level?")
}

pub fn summary(job_title: &str, job_level: &str, industry: &str, ideas: &RecommendationSet) -> String {
    let projects = ideas.iter().collect::<Vec<_>>().join("\n\n");
    format!(
        "Here's the information I gathered: \n\
         Job Title: {}\n\
         Job Level: {}\n\
         Industry: {}\n\n\
         Here are 5 projects you can complete to take your career to the next level.\n\n\
         {projects}\n\n\
         Good Luck!",
        title_case(job_title),
        title_case(job_level),
        title_case(industry),
    )
}

/// Upper-cases the first letter of every word and lower-cases the rest.
/// A word starts at any letter not preceded by another letter.
pub fn title_case(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut prev_is_letter = false;
    for c in text.chars() {
        if c.is_alphabetic() {
            if prev_is_letter {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            prev_is_letter = true;
        } else {
            out.push(c);
            prev_is_letter = false;
        }
    }
    out
}
