//! Model client factory.
//!
//! Creates an `LlmClient` from the provider section of the application
//! configuration, injecting the resolved API key where the provider
//! requires one.

use crate::client::LlmClient;
use crate::providers::{MockClient, OllamaClient, OpenAiClient};
use refdesk_core::{AppError, AppResult, ProviderConfig};
use std::sync::Arc;
use std::time::Duration;

/// Create a model client for the configured provider.
///
/// # Errors
/// Returns a config error if the provider is unknown or a required API
/// key is missing.
pub fn create_client(
    config: &ProviderConfig,
    api_key: Option<&str>,
) -> AppResult<Arc<dyn LlmClient>> {
    let timeout = Duration::from_secs(config.timeout_secs);

    match config.provider.to_lowercase().as_str() {
        "openai" => {
            let api_key = api_key.ok_or_else(|| {
                AppError::Config("OpenAI provider requires an API key".to_string())
            })?;
            let client = OpenAiClient::new(
                api_key,
                &config.model,
                &config.embedding_model,
                config.endpoint.as_deref(),
                timeout,
            )?;
            Ok(Arc::new(client))
        }
        "ollama" => {
            let client = OllamaClient::new(
                &config.model,
                &config.embedding_model,
                config.endpoint.as_deref(),
                timeout,
            )?;
            Ok(Arc::new(client))
        }
        "mock" => Ok(Arc::new(MockClient::new())),
        other => Err(AppError::Config(format!(
            "Unknown provider: {}. Supported: openai, ollama, mock",
            other
        ))),
    }
}
