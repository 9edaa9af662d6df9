//! Response routing.
//!
//! Three terminal outcomes per query: the fixed generic fallback for
//! unrecognized intents, a paraphrased canned reply, or a
//! retrieval-augmented answer (which itself falls back to a paraphrased
//! "no information" reply when the model signals the not-found sentinel).
//! Canned replies are always rephrased before returning so responses feel
//! non-repetitive even though the routing policy is deterministic.

use crate::answer;
use crate::classify::Intent;
use refdesk_core::{AppResult, AssistantConfig, HandlingMode};
use refdesk_knowledge::VectorIndex;
use refdesk_llm::{ChatRequest, LlmClient};
use refdesk_prompt::build_rephrase_prompt;

/// Route a classified query to its final response text.
pub async fn respond(
    client: &dyn LlmClient,
    config: &AssistantConfig,
    index: &VectorIndex,
    query: &str,
    intent: Intent,
) -> AppResult<String> {
    let category_id = match intent {
        Intent::Recognized(id) => id,
        Intent::Unrecognized => {
            tracing::info!("Unrecognized intent, returning generic fallback");
            return Ok(config.fallback_reply.clone());
        }
    };

    // classify() only returns configured ids, but don't trust that here
    let Some(category) = config.category(&category_id) else {
        tracing::warn!(category = %category_id, "Classified category not in configuration");
        return Ok(config.fallback_reply.clone());
    };

    match category.mode {
        HandlingMode::Canned => {
            let literal = category.reply.as_deref().unwrap_or(&config.fallback_reply);
            Ok(rephrase(client, config, literal).await)
        }
        HandlingMode::Rag => {
            let answer = answer::answer(client, config, index, query).await?;

            if is_not_found(config, &answer) {
                tracing::info!("Grounded answer hit the not-found sentinel");
                Ok(rephrase(client, config, &config.no_answer_reply).await)
            } else {
                Ok(answer)
            }
        }
    }
}

/// Paraphrase canned text through the model at high temperature.
///
/// Best-effort: a failed or empty paraphrase falls back to the literal
/// text so the query still gets answered.
async fn rephrase(client: &dyn LlmClient, config: &AssistantConfig, text: &str) -> String {
    let prompt = match build_rephrase_prompt(text) {
        Ok(prompt) => prompt,
        Err(e) => {
            tracing::warn!("Failed to build rephrase prompt: {}", e);
            return text.to_string();
        }
    };

    let request = ChatRequest::new(prompt)
        .with_temperature(config.temperatures.rephrase)
        .with_max_tokens(config.max_tokens.rephrase);

    match client.complete(&request).await {
        Ok(response) if !response.content.trim().is_empty() => response.content.trim().to_string(),
        Ok(_) => {
            tracing::warn!("Rephrase call returned empty text, using literal reply");
            text.to_string()
        }
        Err(e) => {
            tracing::warn!("Rephrase call failed, using literal reply: {}", e);
            text.to_string()
        }
    }
}

/// Check a grounded answer against the configured not-found sentinels.
///
/// Comparison is normalized: case-insensitive with trailing punctuation
/// stripped, so "I don't know." and "i don't know" both match.
fn is_not_found(config: &AssistantConfig, answer: &str) -> bool {
    let normalized = normalize(answer);
    config
        .not_found_phrases
        .iter()
        .any(|phrase| normalize(phrase) == normalized)
}

fn normalize(text: &str) -> String {
    text.trim()
        .trim_end_matches(['.', '!', '?', ','])
        .trim()
        .to_lowercase()
}
