//! OpenAI provider implementation.
//!
//! Chat completions API: https://platform.openai.com/docs/api-reference/chat
//! Embeddings API: https://platform.openai.com/docs/api-reference/embeddings

use crate::client::{ChatRequest, ChatResponse, LlmClient, TokenUsage};
use refdesk_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use std::time::Duration;

const DEFAULT_ENDPOINT: &str = "https://api.openai.com";

/// OpenAI chat completions request format.
#[derive(Debug, Serialize)]
struct OpenAiChatRequest {
    model: String,
    messages: Vec<OpenAiMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
}

#[derive(Debug, Serialize)]
struct OpenAiMessage {
    role: &'static str,
    content: String,
}

/// OpenAI chat completions response format.
#[derive(Debug, Deserialize)]
struct OpenAiChatResponse {
    model: String,
    choices: Vec<OpenAiChoice>,
    #[serde(default)]
    usage: Option<OpenAiUsage>,
}

#[derive(Debug, Deserialize)]
struct OpenAiChoice {
    message: OpenAiChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct OpenAiChoiceMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
struct OpenAiUsage {
    #[serde(default)]
    prompt_tokens: u32,
    #[serde(default)]
    completion_tokens: u32,
}

/// OpenAI embeddings request format.
#[derive(Debug, Serialize)]
struct OpenAiEmbeddingRequest<'a> {
    model: &'a str,
    input: &'a [String],
}

#[derive(Debug, Deserialize)]
struct OpenAiEmbeddingResponse {
    data: Vec<OpenAiEmbeddingData>,
}

#[derive(Debug, Deserialize)]
struct OpenAiEmbeddingData {
    index: usize,
    embedding: Vec<f32>,
}

/// OpenAI client.
pub struct OpenAiClient {
    base_url: String,
    model: String,
    embedding_model: String,
    api_key: String,
    client: reqwest::Client,
}

impl OpenAiClient {
    /// Create a new OpenAI client.
    ///
    /// The per-call deadline is enforced by the underlying HTTP client;
    /// exceeding it maps to `ModelTimeout`.
    pub fn new(
        api_key: impl Into<String>,
        model: impl Into<String>,
        embedding_model: impl Into<String>,
        endpoint: Option<&str>,
        timeout: Duration,
    ) -> AppResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            base_url: endpoint.unwrap_or(DEFAULT_ENDPOINT).trim_end_matches('/').to_string(),
            model: model.into(),
            embedding_model: embedding_model.into(),
            api_key: api_key.into(),
            client,
        })
    }

    /// Convert a gateway request to the OpenAI wire format.
    fn to_openai_request(&self, request: &ChatRequest) -> OpenAiChatRequest {
        let mut messages = Vec::with_capacity(2);

        if let Some(system) = &request.system {
            messages.push(OpenAiMessage {
                role: "system",
                content: system.clone(),
            });
        }

        messages.push(OpenAiMessage {
            role: "user",
            content: request.user_content(),
        });

        OpenAiChatRequest {
            model: self.model.clone(),
            messages,
            temperature: request.temperature,
            max_tokens: request.max_tokens,
        }
    }

    /// Map a reqwest transport error to the gateway error taxonomy.
    fn map_transport_error(e: reqwest::Error) -> AppError {
        if e.is_timeout() {
            AppError::ModelTimeout(format!("OpenAI request exceeded deadline: {}", e))
        } else {
            AppError::ModelUnavailable(format!("Failed to reach OpenAI: {}", e))
        }
    }
}

#[async_trait::async_trait]
impl LlmClient for OpenAiClient {
    fn provider_name(&self) -> &str {
        "openai"
    }

    async fn complete(&self, request: &ChatRequest) -> AppResult<ChatResponse> {
        tracing::debug!(model = %self.model, "Sending completion request to OpenAI");

        let openai_request = self.to_openai_request(request);
        let url = format!("{}/v1/chat/completions", self.base_url);

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&openai_request)
            .send()
            .await
            .map_err(Self::map_transport_error)?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(AppError::ModelUnavailable(format!(
                "OpenAI API error ({}): {}",
                status, error_text
            )));
        }

        let openai_response: OpenAiChatResponse = response
            .json()
            .await
            .map_err(|e| AppError::ModelUnavailable(format!("Failed to parse OpenAI response: {}", e)))?;

        let content = openai_response
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .unwrap_or_default();

        let usage = openai_response.usage.unwrap_or_default();

        tracing::debug!("Received completion from OpenAI");

        Ok(ChatResponse {
            content,
            model: openai_response.model,
            usage: TokenUsage::new(usage.prompt_tokens, usage.completion_tokens),
        })
    }

    async fn embed_batch(&self, texts: &[String]) -> AppResult<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(vec![]);
        }

        tracing::debug!(count = texts.len(), "Requesting embeddings from OpenAI");

        let url = format!("{}/v1/embeddings", self.base_url);
        let body = OpenAiEmbeddingRequest {
            model: &self.embedding_model,
            input: texts,
        };

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(Self::map_transport_error)?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(AppError::ModelUnavailable(format!(
                "OpenAI embeddings error ({}): {}",
                status, error_text
            )));
        }

        let parsed: OpenAiEmbeddingResponse = response.json().await.map_err(|e| {
            AppError::ModelUnavailable(format!("Failed to parse embeddings response: {}", e))
        })?;

        // The API documents order-preserving output; sort by index anyway.
        let mut data = parsed.data;
        data.sort_by_key(|d| d.index);

        if data.len() != texts.len() {
            return Err(AppError::ModelUnavailable(format!(
                "Expected {} embeddings, got {}",
                texts.len(),
                data.len()
            )));
        }

        Ok(data.into_iter().map(|d| d.embedding).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_client() -> OpenAiClient {
        OpenAiClient::new(
            "sk-test",
            "gpt-4o-mini",
            "text-embedding-3-small",
            None,
            Duration::from_secs(30),
        )
        .unwrap()
    }

    #[test]
    fn test_openai_client_creation() {
        let client = test_client();
        assert_eq!(client.provider_name(), "openai");
        assert_eq!(client.base_url, "https://api.openai.com");
    }

    #[test]
    fn test_custom_endpoint_trailing_slash() {
        let client = OpenAiClient::new(
            "sk-test",
            "gpt-4o-mini",
            "text-embedding-3-small",
            Some("http://localhost:8080/"),
            Duration::from_secs(5),
        )
        .unwrap();
        assert_eq!(client.base_url, "http://localhost:8080");
    }

    #[test]
    fn test_request_conversion_plain() {
        let client = test_client();
        let request = ChatRequest::new("Classify this")
            .with_system("You are a classifier")
            .with_temperature(0.5)
            .with_max_tokens(20);

        let wire = client.to_openai_request(&request);
        assert_eq!(wire.model, "gpt-4o-mini");
        assert_eq!(wire.messages.len(), 2);
        assert_eq!(wire.messages[0].role, "system");
        assert_eq!(wire.messages[1].content, "Classify this");
        assert_eq!(wire.temperature, Some(0.5));
        assert_eq!(wire.max_tokens, Some(20));
    }

    #[test]
    fn test_request_conversion_grounded() {
        let client = test_client();
        let request = ChatRequest::new("What is the policy?").with_context("Policy text here.");

        let wire = client.to_openai_request(&request);
        assert_eq!(wire.messages.len(), 1);
        assert!(wire.messages[0].content.contains("Policy text here."));
        assert!(wire.messages[0].content.contains("What is the policy?"));
    }
}
