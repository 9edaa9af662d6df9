//! The assistant facade: the two externally observable operations.
//!
//! `initialize` builds the document index (idempotent); `chat` answers a
//! single query. The assistant is stateless across queries apart from the
//! shared, read-only index handle.

use crate::classify;
use crate::router;
use refdesk_core::{AppConfig, AppError, AppResult};
use refdesk_knowledge::{build_index, DocumentSource, IndexHandle, IndexStats};
use refdesk_llm::LlmClient;
use std::sync::Arc;
use std::time::Duration;

/// Query-answering assistant for a single reference document.
pub struct Assistant {
    config: AppConfig,
    client: Arc<dyn LlmClient>,
    handle: IndexHandle,
}

impl Assistant {
    /// Create an assistant with a gateway client built from the config.
    pub fn new(config: AppConfig) -> AppResult<Self> {
        config.validate()?;
        let client = refdesk_llm::create_client(&config.llm, config.api_key.as_deref())?;
        Ok(Self {
            config,
            client,
            handle: IndexHandle::new(),
        })
    }

    /// Create an assistant with an injected gateway client.
    ///
    /// Used by tests and by embedders that manage their own client; only
    /// the assistant section of the config is validated.
    pub fn with_client(config: AppConfig, client: Arc<dyn LlmClient>) -> AppResult<Self> {
        config.assistant.validate()?;
        Ok(Self {
            config,
            client,
            handle: IndexHandle::new(),
        })
    }

    /// Build the document index if it does not exist yet.
    ///
    /// Idempotent: a second call returns the existing build's stats
    /// without re-ingesting. On failure the handle stays unset — the
    /// index is either built or absent, never partial.
    pub async fn initialize(&self) -> AppResult<IndexStats> {
        if let Some(index) = self.handle.snapshot() {
            tracing::debug!(build_id = %index.stats().build_id, "Index already built, skipping ingestion");
            return Ok(index.stats());
        }

        self.build_and_install().await
    }

    /// Force a fresh build, atomically replacing any existing index.
    ///
    /// In-flight queries keep reading the old index until they finish.
    pub async fn rebuild(&self) -> AppResult<IndexStats> {
        self.build_and_install().await
    }

    async fn build_and_install(&self) -> AppResult<IndexStats> {
        let source = DocumentSource::parse(&self.config.assistant.document);
        let fetch_timeout = Duration::from_secs(self.config.llm.timeout_secs);

        let index = build_index(&source, self.client.as_ref(), fetch_timeout).await?;
        let installed = self.handle.install(index);

        Ok(installed.stats())
    }

    /// Answer a single query.
    ///
    /// Precondition: the index must be initialized; otherwise
    /// `NotInitialized` is returned before any model call. The call
    /// sequence is strictly ordered: classification completes before
    /// routing, routing before any answer or rephrase call.
    pub async fn chat(&self, query: &str) -> AppResult<String> {
        let index = self.handle.snapshot().ok_or(AppError::NotInitialized)?;

        tracing::info!("Handling query");
        tracing::debug!(query = %query, "Query text");

        let intent = classify::classify(self.client.as_ref(), &self.config.assistant, query).await;

        router::respond(
            self.client.as_ref(),
            &self.config.assistant,
            &index,
            query,
            intent,
        )
        .await
    }

    /// Whether the index has been built.
    pub fn is_initialized(&self) -> bool {
        self.handle.is_ready()
    }

    /// Stats of the current index build, if any.
    pub fn index_stats(&self) -> Option<IndexStats> {
        self.handle.snapshot().map(|index| index.stats())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use refdesk_core::{AssistantConfig, HandlingMode, IntentCategory};
    use refdesk_llm::MockClient;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_document() -> NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(".txt").tempfile().unwrap();
        write!(
            file,
            "The leave policy grants 25 vacation days per year.\n\n\
             Remote work is allowed two days per week.\n\n\
             Payroll runs on the last business day of the month."
        )
        .unwrap();
        file
    }

    fn config(document: &NamedTempFile) -> AppConfig {
        let assistant = AssistantConfig {
            document: document.path().to_string_lossy().to_string(),
            categories: vec![
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
            ],
            ..AssistantConfig::default()
        };

        AppConfig {
            assistant,
            ..AppConfig::default()
        }
    }

    fn assistant_with(document: &NamedTempFile, client: Arc<MockClient>) -> Assistant {
        Assistant::with_client(config(document), client).unwrap()
    }

    #[tokio::test]
    async fn test_chat_before_initialize_makes_zero_model_calls() {
        let document = write_document();
        let client = Arc::new(MockClient::new());
        let assistant = assistant_with(&document, client.clone());

        let result = assistant.chat("hi there").await;

        assert!(matches!(result, Err(AppError::NotInitialized)));
        assert_eq!(client.total_calls(), 0);
    }

    #[tokio::test]
    async fn test_initialize_is_idempotent() {
        let document = write_document();
        let client = Arc::new(MockClient::new());
        let assistant = assistant_with(&document, client.clone());

        let first = assistant.initialize().await.unwrap();
        let second = assistant.initialize().await.unwrap();

        assert_eq!(first.build_id, second.build_id);
        // One embedding batch for the whole document, no duplicate ingestion
        assert_eq!(client.embed_calls(), 1);
        assert_eq!(first.chunk_count, 3);
    }

    #[tokio::test]
    async fn test_rebuild_swaps_build_id() {
        let document = write_document();
        let client = Arc::new(MockClient::new());
        let assistant = assistant_with(&document, client.clone());

        let first = assistant.initialize().await.unwrap();
        let second = assistant.rebuild().await.unwrap();

        assert_ne!(first.build_id, second.build_id);
        assert_eq!(assistant.index_stats().unwrap().build_id, second.build_id);
    }

    #[tokio::test]
    async fn test_failed_initialize_leaves_handle_unset() {
        let document = write_document();
        let mut cfg = config(&document);
        cfg.assistant.document = "/no/such/document.txt".to_string();

        let client = Arc::new(MockClient::new());
        let assistant = Assistant::with_client(cfg, client).unwrap();

        let result = assistant.initialize().await;
        assert!(matches!(result, Err(AppError::Ingestion(_))));
        assert!(!assistant.is_initialized());
    }

    #[tokio::test]
    async fn test_greeting_end_to_end() {
        let document = write_document();
        let client = Arc::new(
            MockClient::new().with_responses(["Greeting", "Hi! How can I help you today?"]),
        );
        let assistant = assistant_with(&document, client.clone());

        assistant.initialize().await.unwrap();
        let reply = assistant.chat("hi there").await.unwrap();

        assert_eq!(reply, "Hi! How can I help you today?");
        assert_ne!(reply, "Hello!");
        assert!(!reply.is_empty());
    }

    #[tokio::test]
    async fn test_rag_topic_end_to_end() {
        let document = write_document();
        let client = Arc::new(
            MockClient::new().with_responses(["Topic", "You get 25 vacation days per year."]),
        );
        let assistant = assistant_with(&document, client.clone());

        assistant.initialize().await.unwrap();
        let reply = assistant.chat("What is the leave policy?").await.unwrap();

        // The grounded answer is returned verbatim
        assert_eq!(reply, "You get 25 vacation days per year.");
    }

    #[tokio::test]
    async fn test_unrecognized_end_to_end() {
        let document = write_document();
        let client = Arc::new(MockClient::new().with_responses(["Some Invented Category"]));
        let assistant = assistant_with(&document, client.clone());

        assistant.initialize().await.unwrap();
        let reply = assistant.chat("eubcwucbi").await.unwrap();

        assert_eq!(reply, AssistantConfig::default().fallback_reply);
        // Exactly the classification call; no rephrase, no answer
        assert_eq!(client.complete_calls(), 1);
    }

    #[tokio::test]
    async fn test_sentinel_end_to_end() {
        let document = write_document();
        let client = Arc::new(MockClient::new().with_responses([
            "Topic",
            "I don't know.",
            "That information is not in the manual, sorry.",
        ]));
        let assistant = assistant_with(&document, client.clone());

        assistant.initialize().await.unwrap();
        let reply = assistant.chat("What about parking spots?").await.unwrap();

        assert_eq!(reply, "That information is not in the manual, sorry.");
    }

    #[tokio::test]
    async fn test_with_client_rejects_invalid_categories() {
        let document = write_document();
        let mut cfg = config(&document);
        cfg.assistant.categories.clear();

        let result = Assistant::with_client(cfg, Arc::new(MockClient::new()));
        assert!(result.is_err());
    }
}
