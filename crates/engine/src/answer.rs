//! Retrieval-augmented answering.
//!
//! Embeds the query, retrieves the top-k most similar chunks, and asks
//! the model to answer using only that context. The grounded system
//! prompt explicitly allows the not-found sentinel; recognizing it is the
//! router's job.

use refdesk_core::{AppResult, AssistantConfig};
use refdesk_knowledge::VectorIndex;
use refdesk_llm::{ChatRequest, LlmClient};
use refdesk_prompt::{build_answer_system_prompt, build_context};

/// Answer a query from the document index.
///
/// Gateway failures surface as errors — an empty or missing answer is
/// never silently converted into text.
pub async fn answer(
    client: &dyn LlmClient,
    config: &AssistantConfig,
    index: &VectorIndex,
    query: &str,
) -> AppResult<String> {
    let query_embedding = client.embed(query).await?;

    let retrieved = index.search(&query_embedding, config.top_k);
    let chunk_texts: Vec<String> = retrieved.iter().map(|(chunk, _)| chunk.text.clone()).collect();

    tracing::debug!(
        retrieved = chunk_texts.len(),
        top_score = retrieved.first().map(|(_, s)| *s).unwrap_or(0.0),
        "Retrieved context for answer"
    );

    let sentinel = config
        .not_found_phrases
        .first()
        .map(String::as_str)
        .unwrap_or("I don't know");

    let system = build_answer_system_prompt(&config.role, sentinel)?;
    let context = build_context(&chunk_texts);

    let request = ChatRequest::new(query)
        .with_system(system)
        .with_context(context)
        .with_temperature(config.temperatures.answer)
        .with_max_tokens(config.max_tokens.answer);

    let response = client.complete(&request).await?;
    Ok(response.content)
}
