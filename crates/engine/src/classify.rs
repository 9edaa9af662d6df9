//! Intent classification.
//!
//! One model call maps the free-text query to a configured category id.
//! Anything the model returns that is not exactly a configured id —
//! empty, malformed, hallucinated, or the call failing outright — is
//! `Unrecognized`, and there is no retry: the router's generic fallback
//! handles it deterministically.

use refdesk_core::AssistantConfig;
use refdesk_llm::{ChatRequest, LlmClient};
use refdesk_prompt::{build_classification_prompt, classification_system_prompt};

/// Outcome of classifying a query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    /// The id of a configured intent category
    Recognized(String),
    /// No configured category matched
    Unrecognized,
}

/// Classify a query against the configured category set.
///
/// The match is case-sensitive against category ids. A gateway failure
/// during classification is logged and treated as `Unrecognized` (policy:
/// the query still gets the deterministic fallback rather than an error).
pub async fn classify(
    client: &dyn LlmClient,
    config: &AssistantConfig,
    query: &str,
) -> Intent {
    let prompt = match build_classification_prompt(&config.role, &config.categories, query) {
        Ok(prompt) => prompt,
        Err(e) => {
            tracing::warn!("Failed to build classification prompt: {}", e);
            return Intent::Unrecognized;
        }
    };

    let request = ChatRequest::new(prompt)
        .with_system(classification_system_prompt())
        .with_temperature(config.temperatures.classify)
        .with_max_tokens(config.max_tokens.classify);

    let response = match client.complete(&request).await {
        Ok(response) => response,
        Err(e) => {
            tracing::warn!("Classification call failed, treating as unrecognized: {}", e);
            return Intent::Unrecognized;
        }
    };

    let label = response.content.trim();

    match config.category(label) {
        Some(category) => {
            tracing::info!(category = %category.id, "Query classified");
            Intent::Recognized(category.id.clone())
        }
        None => {
            tracing::info!(label = %label, "Classifier output matched no category");
            Intent::Unrecognized
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use refdesk_llm::MockClient;

    fn config() -> AssistantConfig {
        AssistantConfig::default()
    }

    #[tokio::test]
    async fn test_exact_id_is_recognized() {
        let client = MockClient::new().with_responses(["Greeting"]);
        let intent = classify(&client, &config(), "hi there").await;
        assert_eq!(intent, Intent::Recognized("Greeting".to_string()));
    }

    #[tokio::test]
    async fn test_surrounding_whitespace_is_trimmed() {
        let client = MockClient::new().with_responses(["  HR-related\n"]);
        let intent = classify(&client, &config(), "leave policy?").await;
        assert_eq!(intent, Intent::Recognized("HR-related".to_string()));
    }

    #[tokio::test]
    async fn test_match_is_case_sensitive() {
        let client = MockClient::new().with_responses(["greeting"]);
        let intent = classify(&client, &config(), "hi").await;
        assert_eq!(intent, Intent::Unrecognized);
    }

    #[tokio::test]
    async fn test_hallucinated_label_is_unrecognized() {
        let client = MockClient::new().with_responses(["Weather Question"]);
        let intent = classify(&client, &config(), "will it rain?").await;
        assert_eq!(intent, Intent::Unrecognized);
    }

    #[tokio::test]
    async fn test_empty_output_is_unrecognized() {
        let client = MockClient::new().with_responses([""]);
        let intent = classify(&client, &config(), "???").await;
        assert_eq!(intent, Intent::Unrecognized);
    }

    #[tokio::test]
    async fn test_single_call_no_retry() {
        let client = MockClient::new().with_responses(["not-a-category"]);
        let _ = classify(&client, &config(), "query").await;
        assert_eq!(client.complete_calls(), 1);
    }
}
