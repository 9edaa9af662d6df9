//! Model gateway crate for refdesk.
//!
//! This crate provides a provider-agnostic abstraction over language
//! model calls: chat completion (plain and context-grounded shapes) and
//! embeddings, behind a unified trait-based interface.
//!
//! # Providers
//! - **OpenAI**: hosted chat completions and embeddings (default)
//! - **Ollama**: local LLM runtime
//! - **Mock**: deterministic scripted provider for tests/offline use
//!
//! # Example
//! ```no_run
//! use refdesk_llm::{ChatRequest, LlmClient, providers::MockClient};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = MockClient::new().with_responses(["Greeting"]);
//! let request = ChatRequest::new("hi there").with_temperature(0.5);
//! let response = client.complete(&request).await?;
//! println!("{}", response.content);
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod factory;
pub mod providers;

// Re-export main types
pub use client::{ChatRequest, ChatResponse, LlmClient, TokenUsage};
pub use factory::create_client;
pub use providers::{MockClient, OllamaClient, OpenAiClient};
