//! Prompt builders for the three call shapes.
//!
//! Each builder renders one of the built-in templates with Handlebars and
//! returns plain text ready for the model gateway.

use crate::templates;
use handlebars::Handlebars;
use refdesk_core::{AppError, AppResult, IntentCategory};
use std::collections::HashMap;

/// Build the classification prompt for a query.
///
/// Contains the assistant's role label, the full category id list, worked
/// examples (id: description) per category, and the instruction to
/// respond with exactly one id.
pub fn build_classification_prompt(
    role: &str,
    categories: &[IntentCategory],
    query: &str,
) -> AppResult<String> {
    let ids = categories
        .iter()
        .map(|c| format!("'{}'", c.id))
        .collect::<Vec<_>>()
        .join(", ");

    let examples = categories
        .iter()
        .map(|c| format!("{}: {}", c.id, c.description))
        .collect::<Vec<_>>()
        .join(". ");

    let mut variables = HashMap::new();
    variables.insert("role".to_string(), role.to_string());
    variables.insert("ids".to_string(), ids);
    variables.insert("examples".to_string(), examples);
    variables.insert("query".to_string(), query.to_string());

    render_template(templates::CLASSIFY_TEMPLATE, &variables)
}

/// System role text for the classification call.
pub fn classification_system_prompt() -> &'static str {
    templates::CLASSIFY_SYSTEM
}

/// Build the rephrase prompt for a canned reply.
pub fn build_rephrase_prompt(text: &str) -> AppResult<String> {
    let mut variables = HashMap::new();
    variables.insert("text".to_string(), text.to_string());

    render_template(templates::REPHRASE_TEMPLATE, &variables)
}

/// Build the system prompt for the grounded answer call.
///
/// `sentinel` is the exact phrase the model should use when the context
/// is insufficient, so the router can recognize it literally.
pub fn build_answer_system_prompt(role: &str, sentinel: &str) -> AppResult<String> {
    let mut variables = HashMap::new();
    variables.insert("role".to_string(), role.to_string());
    variables.insert("sentinel".to_string(), format!("\"{}\"", sentinel));

    render_template(templates::ANSWER_SYSTEM_TEMPLATE, &variables)
}

/// Join retrieved chunk texts into a single context block.
pub fn build_context(chunks: &[String]) -> String {
    chunks
        .iter()
        .enumerate()
        .map(|(i, text)| format!("[Passage {}]\n{}", i + 1, text))
        .collect::<Vec<_>>()
        .join("\n\n---\n\n")
}

/// Render a Handlebars template with variables.
fn render_template(template: &str, variables: &HashMap<String, String>) -> AppResult<String> {
    let mut handlebars = Handlebars::new();

    // Disable HTML escaping for plain text
    handlebars.register_escape_fn(handlebars::no_escape);

    handlebars
        .register_template_string("prompt", template)
        .map_err(|e| AppError::Other(format!("Failed to register template: {}", e)))?;

    let rendered = handlebars
        .render("prompt", &variables)
        .map_err(|e| AppError::Other(format!("Failed to render template: {}", e)))?;

    Ok(rendered)
}

#[cfg(test)]
mod tests {
    use super::*;
    use refdesk_core::HandlingMode;

    fn test_categories() -> Vec<IntentCategory> {
        vec![
            IntentCategory {
                id: "Greeting".to_string(),
                description: "Anything similar to Hey or How are you".to_string(),
                mode: HandlingMode::Canned,
                reply: Some("Hello!".to_string()),
            },
            IntentCategory {
                id: "Topic".to_string(),
                description: "Questions about the reference document".to_string(),
                mode: HandlingMode::Rag,
                reply: None,
            },
        ]
    }

    #[test]
    fn test_classification_prompt_lists_all_ids() {
        let prompt =
            build_classification_prompt("HR Assistant", &test_categories(), "hi there").unwrap();

        assert!(prompt.contains("Role: HR Assistant"));
        assert!(prompt.contains("'Greeting', 'Topic'"));
        assert!(prompt.contains("Greeting: Anything similar to Hey or How are you"));
        assert!(prompt.contains("Query: hi there"));
        assert!(prompt.contains("ONLY be one of the categories"));
    }

    #[test]
    fn test_rephrase_prompt_embeds_text() {
        let prompt = build_rephrase_prompt("Hello, how can I help?").unwrap();
        assert!(prompt.starts_with("Rephrase the following text"));
        assert!(prompt.ends_with("Hello, how can I help?"));
        assert!(prompt.contains("no additional words"));
    }

    #[test]
    fn test_answer_system_prompt_names_sentinel() {
        let prompt = build_answer_system_prompt("HR Assistant", "I don't know").unwrap();
        assert!(prompt.contains("HR Assistant"));
        assert!(prompt.contains("\"I don't know\""));
        assert!(prompt.contains("only the provided context"));
    }

    #[test]
    fn test_no_html_escaping() {
        let prompt = build_rephrase_prompt("a & b <c>").unwrap();
        assert!(prompt.contains("a & b <c>"));
    }

    #[test]
    fn test_build_context_numbers_passages() {
        let chunks = vec!["First paragraph.".to_string(), "Second paragraph.".to_string()];
        let context = build_context(&chunks);

        assert!(context.contains("[Passage 1]\nFirst paragraph."));
        assert!(context.contains("[Passage 2]\nSecond paragraph."));
        assert!(context.contains("---"));
    }

    #[test]
    fn test_build_context_empty() {
        assert_eq!(build_context(&[]), "");
    }
}
