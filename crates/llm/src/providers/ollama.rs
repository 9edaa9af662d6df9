//! Ollama provider implementation.
//!
//! Ollama is a local LLM runtime; no API key required.
//! API: https://github.com/ollama/ollama/blob/main/docs/api.md

use crate::client::{ChatRequest, ChatResponse, LlmClient, TokenUsage};
use refdesk_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use std::time::Duration;

const DEFAULT_ENDPOINT: &str = "http://localhost:11434";

/// Ollama generate request format.
#[derive(Debug, Serialize)]
struct OllamaGenerateRequest {
    model: String,
    prompt: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    num_predict: Option<u32>,
    stream: bool,
}

/// Ollama generate response format.
#[derive(Debug, Deserialize)]
struct OllamaGenerateResponse {
    model: String,
    response: String,
    #[serde(default)]
    prompt_eval_count: Option<u32>,
    #[serde(default)]
    eval_count: Option<u32>,
}

#[derive(Debug, Serialize)]
struct OllamaEmbeddingRequest<'a> {
    model: &'a str,
    prompt: &'a str,
}

#[derive(Debug, Deserialize)]
struct OllamaEmbeddingResponse {
    embedding: Vec<f32>,
}

/// Ollama client.
pub struct OllamaClient {
    base_url: String,
    model: String,
    embedding_model: String,
    client: reqwest::Client,
}

impl OllamaClient {
    /// Create a new Ollama client.
    pub fn new(
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
            client,
        })
    }

    fn to_ollama_request(&self, request: &ChatRequest) -> OllamaGenerateRequest {
        OllamaGenerateRequest {
            model: self.model.clone(),
            prompt: request.user_content(),
            system: request.system.clone(),
            temperature: request.temperature,
            num_predict: request.max_tokens,
            stream: false,
        }
    }

    fn map_transport_error(e: reqwest::Error) -> AppError {
        if e.is_timeout() {
            AppError::ModelTimeout(format!("Ollama request exceeded deadline: {}", e))
        } else {
            AppError::ModelUnavailable(format!("Failed to reach Ollama: {}", e))
        }
    }
}

#[async_trait::async_trait]
impl LlmClient for OllamaClient {
    fn provider_name(&self) -> &str {
        "ollama"
    }

    async fn complete(&self, request: &ChatRequest) -> AppResult<ChatResponse> {
        tracing::debug!(model = %self.model, "Sending completion request to Ollama");

        let ollama_request = self.to_ollama_request(request);
        let url = format!("{}/api/generate", self.base_url);

        let response = self
            .client
            .post(&url)
            .json(&ollama_request)
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
                "Ollama API error ({}): {}",
                status, error_text
            )));
        }

        let ollama_response: OllamaGenerateResponse = response
            .json()
            .await
            .map_err(|e| AppError::ModelUnavailable(format!("Failed to parse Ollama response: {}", e)))?;

        tracing::debug!("Received completion from Ollama");

        Ok(ChatResponse {
            content: ollama_response.response,
            model: ollama_response.model,
            usage: TokenUsage::new(
                ollama_response.prompt_eval_count.unwrap_or(0),
                ollama_response.eval_count.unwrap_or(0),
            ),
        })
    }

    async fn embed_batch(&self, texts: &[String]) -> AppResult<Vec<Vec<f32>>> {
        // Ollama's embeddings endpoint takes one prompt per call.
        let url = format!("{}/api/embeddings", self.base_url);
        let mut embeddings = Vec::with_capacity(texts.len());

        for text in texts {
            let body = OllamaEmbeddingRequest {
                model: &self.embedding_model,
                prompt: text,
            };

            let response = self
                .client
                .post(&url)
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
                    "Ollama embeddings error ({}): {}",
                    status, error_text
                )));
            }

            let parsed: OllamaEmbeddingResponse = response.json().await.map_err(|e| {
                AppError::ModelUnavailable(format!("Failed to parse embedding response: {}", e))
            })?;

            embeddings.push(parsed.embedding);
        }

        Ok(embeddings)
    }
}
