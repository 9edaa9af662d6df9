//! Model gateway abstraction and request/response types.
//!
//! Two call shapes share one request type: a plain chat completion
//! (classification, rephrasing) and a context-grounded completion (RAG
//! answering) that carries retrieved passages separately from the user's
//! literal query.

use refdesk_core::AppResult;
use serde::{Deserialize, Serialize};

/// Chat completion request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatRequest {
    /// The user prompt
    pub prompt: String,

    /// System role text (optional)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system: Option<String>,

    /// Retrieved passages for the grounded call shape (optional)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,

    /// Temperature for sampling (0.0 - 2.0)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,

    /// Maximum tokens to generate
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
}

impl ChatRequest {
    /// Create a new request with just a prompt.
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            system: None,
            context: None,
            temperature: None,
            max_tokens: None,
        }
    }

    /// Set the system role text.
    pub fn with_system(mut self, system: impl Into<String>) -> Self {
        self.system = Some(system.into());
        self
    }

    /// Attach retrieved context, switching to the grounded call shape.
    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    /// Set the sampling temperature.
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// Set the output token budget.
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    /// Render the user-facing content, folding in context when present.
    ///
    /// Providers that have no separate slot for context (all of them, at
    /// the wire level) use this to build the final user message.
    pub fn user_content(&self) -> String {
        match &self.context {
            Some(context) => format!("Context:\n{}\n\nQuestion:\n{}", context, self.prompt),
            None => self.prompt.clone(),
        }
    }
}

/// Chat completion response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatResponse {
    /// The generated text. May legitimately be empty; emptiness is
    /// distinct from a gateway failure.
    pub content: String,

    /// Model that generated the response
    pub model: String,

    /// Token usage statistics
    #[serde(default)]
    pub usage: TokenUsage,
}

/// Token usage statistics.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct TokenUsage {
    #[serde(default)]
    pub prompt_tokens: u32,

    #[serde(default)]
    pub completion_tokens: u32,

    #[serde(default)]
    pub total_tokens: u32,
}

impl TokenUsage {
    pub fn new(prompt_tokens: u32, completion_tokens: u32) -> Self {
        Self {
            prompt_tokens,
            completion_tokens,
            total_tokens: prompt_tokens + completion_tokens,
        }
    }
}

/// Trait for model providers.
///
/// This abstracts the underlying provider (OpenAI, Ollama, mock) behind a
/// uniform interface for chat completion and embeddings. Failures are
/// always surfaced as errors (`ModelUnavailable`, `ModelTimeout`), never
/// as empty strings, so callers can branch on them.
#[async_trait::async_trait]
pub trait LlmClient: Send + Sync {
    /// Get the provider name (e.g., "openai", "ollama", "mock").
    fn provider_name(&self) -> &str;

    /// Perform a chat completion (plain or grounded shape).
    async fn complete(&self, request: &ChatRequest) -> AppResult<ChatResponse>;

    /// Generate embeddings for multiple texts in a batch.
    async fn embed_batch(&self, texts: &[String]) -> AppResult<Vec<Vec<f32>>>;

    /// Generate an embedding for a single text (convenience method).
    async fn embed(&self, text: &str) -> AppResult<Vec<f32>> {
        let mut results = self.embed_batch(&[text.to_string()]).await?;
        results.pop().ok_or_else(|| {
            refdesk_core::AppError::ModelUnavailable("No embedding returned".to_string())
        })
    }
}
