//! Configuration management for refdesk.
//!
//! Configuration is merged from three sources, lowest precedence first:
//! - Built-in defaults (the original HR-assistant deployment)
//! - A YAML config file (`refdesk.yaml` or `REFDESK_CONFIG`)
//! - Environment variables and command-line flags
//!
//! The intent category set is validated once at load time and is
//! immutable afterwards.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::PathBuf;

use crate::error::{AppError, AppResult};

/// How a recognized intent category is handled by the router.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HandlingMode {
    /// Answer from the document index via retrieval-augmented generation
    Rag,
    /// Reply with the category's canned text, paraphrased through a model call
    Canned,
}

/// A configured intent category.
///
/// The `description` doubles as the worked example shown to the
/// classifier. `reply` is required when `mode` is `canned`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IntentCategory {
    /// Unique identifier, matched case-sensitively against classifier output
    pub id: String,

    /// Human-readable description used as a classification example
    pub description: String,

    /// Handling mode for this category
    pub mode: HandlingMode,

    /// Canned reply text (only for `canned` mode)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reply: Option<String>,
}

/// Sampling temperatures per call shape.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Temperatures {
    /// Classification favors determinism
    #[serde(default = "default_classify_temperature")]
    pub classify: f32,

    /// Rephrasing favors variety
    #[serde(default = "default_rephrase_temperature")]
    pub rephrase: f32,

    /// Grounded answers favor factuality
    #[serde(default = "default_answer_temperature")]
    pub answer: f32,
}

fn default_classify_temperature() -> f32 {
    0.5
}

fn default_rephrase_temperature() -> f32 {
    0.9
}

fn default_answer_temperature() -> f32 {
    0.3
}

impl Default for Temperatures {
    fn default() -> Self {
        Self {
            classify: default_classify_temperature(),
            rephrase: default_rephrase_temperature(),
            answer: default_answer_temperature(),
        }
    }
}

/// Output token budgets per call shape.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenBudgets {
    /// Classifier only needs to emit a category id
    #[serde(default = "default_classify_tokens")]
    pub classify: u32,

    #[serde(default = "default_rephrase_tokens")]
    pub rephrase: u32,

    #[serde(default = "default_answer_tokens")]
    pub answer: u32,
}

fn default_classify_tokens() -> u32 {
    20
}

fn default_rephrase_tokens() -> u32 {
    100
}

fn default_answer_tokens() -> u32 {
    500
}

impl Default for TokenBudgets {
    fn default() -> Self {
        Self {
            classify: default_classify_tokens(),
            rephrase: default_rephrase_tokens(),
            answer: default_answer_tokens(),
        }
    }
}

/// Assistant behavior configuration: the document, the category set, and
/// the routing policy knobs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssistantConfig {
    /// Document source: a local file path or an http(s) URL
    pub document: String,

    /// Assistant role label injected into prompts
    pub role: String,

    /// Ordered intent categories (non-empty, unique ids)
    pub categories: Vec<IntentCategory>,

    /// Fixed fallback for unrecognized intents, returned verbatim
    #[serde(default = "default_fallback_reply", rename = "fallbackReply")]
    pub fallback_reply: String,

    /// Fixed "no information" text, paraphrased when RAG finds nothing
    #[serde(default = "default_no_answer_reply", rename = "noAnswerReply")]
    pub no_answer_reply: String,

    /// Sentinel phrases a grounded answer uses to signal "no answer found"
    #[serde(default = "default_not_found_phrases", rename = "notFoundPhrases")]
    pub not_found_phrases: Vec<String>,

    /// Retrieval width for RAG answering
    #[serde(default = "default_top_k", rename = "topK")]
    pub top_k: usize,

    #[serde(default)]
    pub temperatures: Temperatures,

    #[serde(default, rename = "maxTokens")]
    pub max_tokens: TokenBudgets,
}

fn default_fallback_reply() -> String {
    "Unfortunately, I am unable to help you with that. \
     Please provide more specific questions related to the topics I cover."
        .to_string()
}

fn default_no_answer_reply() -> String {
    "I apologize, but I don't have the information you're looking for at the moment. \
     Please let me know if there's anything else I can assist you with."
        .to_string()
}

fn default_not_found_phrases() -> Vec<String> {
    vec!["I don't know".to_string(), "I don't know.".to_string()]
}

fn default_top_k() -> usize {
    4
}

impl Default for AssistantConfig {
    /// The original HR-assistant deployment, kept as a working example.
    fn default() -> Self {
        Self {
            document: "Human_Resources_Manual.md".to_string(),
            role: "HR Assistant".to_string(),
            categories: vec![
                IntentCategory {
                    id: "HR-related".to_string(),
                    description: "Questions about HR regulations, policies, processes etc."
                        .to_string(),
                    mode: HandlingMode::Rag,
                    reply: None,
                },
                IntentCategory {
                    id: "Other Topic".to_string(),
                    description: "Inquiries/Statements non-related to HR".to_string(),
                    mode: HandlingMode::Canned,
                    reply: Some("Unfortunately, I am unable to help you with that.".to_string()),
                },
                IntentCategory {
                    id: "Greeting".to_string(),
                    description: "Anything similar to Hey or How are you".to_string(),
                    mode: HandlingMode::Canned,
                    reply: Some(
                        "Hello, I am an HR virtual assistant. How can I help you?".to_string(),
                    ),
                },
                IntentCategory {
                    id: "Not Understandable Word/Phrase".to_string(),
                    description: "Gibberish like eubcwucbi".to_string(),
                    mode: HandlingMode::Canned,
                    reply: Some(
                        "I apologize, I didn't quite get that. Could you ask again?".to_string(),
                    ),
                },
            ],
            fallback_reply: default_fallback_reply(),
            no_answer_reply: default_no_answer_reply(),
            not_found_phrases: default_not_found_phrases(),
            top_k: default_top_k(),
            temperatures: Temperatures::default(),
            max_tokens: TokenBudgets::default(),
        }
    }
}

impl AssistantConfig {
    /// Look up a category by its identifier (case-sensitive).
    pub fn category(&self, id: &str) -> Option<&IntentCategory> {
        self.categories.iter().find(|c| c.id == id)
    }

    /// Validate the category set: non-empty, unique ids, canned replies present.
    pub fn validate(&self) -> AppResult<()> {
        if self.categories.is_empty() {
            return Err(AppError::Config(
                "At least one intent category must be configured".to_string(),
            ));
        }

        let mut seen = HashSet::new();
        for category in &self.categories {
            if category.id.trim().is_empty() {
                return Err(AppError::Config(
                    "Intent category id must not be empty".to_string(),
                ));
            }
            if !seen.insert(category.id.as_str()) {
                return Err(AppError::Config(format!(
                    "Duplicate intent category id: '{}'",
                    category.id
                )));
            }
            if category.mode == HandlingMode::Canned
                && category.reply.as_deref().map_or(true, |r| r.trim().is_empty())
            {
                return Err(AppError::Config(format!(
                    "Canned category '{}' must have a reply text",
                    category.id
                )));
            }
        }

        if self.top_k == 0 {
            return Err(AppError::Config(
                "Retrieval width topK must be at least 1".to_string(),
            ));
        }

        Ok(())
    }
}

/// Model provider configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Provider name ("openai", "ollama", "mock")
    pub provider: String,

    /// Chat completion model
    pub model: String,

    /// Embedding model
    #[serde(rename = "embeddingModel")]
    pub embedding_model: String,

    /// Optional custom endpoint URL
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,

    /// Environment variable holding the API key
    #[serde(default, rename = "apiKeyEnv", skip_serializing_if = "Option::is_none")]
    pub api_key_env: Option<String>,

    /// Per-call deadline in seconds
    #[serde(default = "default_timeout_secs", rename = "timeoutSecs")]
    pub timeout_secs: u64,
}

fn default_timeout_secs() -> u64 {
    30
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            provider: "openai".to_string(),
            model: "gpt-4o-mini".to_string(),
            embedding_model: "text-embedding-3-small".to_string(),
            endpoint: None,
            api_key_env: Some("OPENAI_API_KEY".to_string()),
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Main application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Optional config file path
    pub config_file: Option<PathBuf>,

    /// Model provider settings
    pub llm: ProviderConfig,

    /// Assistant behavior settings
    pub assistant: AssistantConfig,

    /// API key resolved from the environment (never from the config file)
    #[serde(skip)]
    pub api_key: Option<String>,

    /// Log level override
    pub log_level: Option<String>,

    /// Verbose mode (enables debug logging)
    pub verbose: bool,

    /// Disable colored output
    pub no_color: bool,
}

/// Full configuration file structure.
#[derive(Debug, Clone, Deserialize)]
struct ConfigFile {
    llm: Option<ProviderConfig>,
    assistant: Option<AssistantConfig>,
    logging: Option<LoggingConfig>,
}

#[derive(Debug, Clone, Deserialize)]
struct LoggingConfig {
    level: Option<String>,
    color: Option<bool>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            config_file: None,
            llm: ProviderConfig::default(),
            assistant: AssistantConfig::default(),
            api_key: None,
            log_level: None,
            verbose: false,
            no_color: false,
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables and defaults.
    ///
    /// Environment variables:
    /// - `REFDESK_CONFIG`: Path to config file (default: ./refdesk.yaml)
    /// - `REFDESK_PROVIDER`: Model provider
    /// - `REFDESK_MODEL`: Model identifier
    /// - `REFDESK_API_KEY`: API key (overrides `apiKeyEnv`)
    /// - `RUST_LOG`: Log level
    /// - `NO_COLOR`: Disable colored output
    pub fn load() -> AppResult<Self> {
        Self::load_with(None)
    }

    /// Load configuration from an explicitly named config file.
    ///
    /// Unlike `load`, a missing file is an error here: the caller asked
    /// for it by name.
    pub fn load_from(path: impl Into<PathBuf>) -> AppResult<Self> {
        Self::load_with(Some(path.into()))
    }

    fn load_with(explicit_file: Option<PathBuf>) -> AppResult<Self> {
        let mut config = Self::default();

        config.config_file = explicit_file.or_else(|| {
            std::env::var("REFDESK_CONFIG").ok().map(PathBuf::from)
        });

        let named_explicitly = config.config_file.is_some();
        let config_path = config
            .config_file
            .clone()
            .unwrap_or_else(|| PathBuf::from("refdesk.yaml"));

        if config_path.exists() {
            config = config.merge_yaml(&config_path)?;
        } else if named_explicitly {
            return Err(AppError::Config(format!(
                "Config file {:?} not found",
                config_path
            )));
        }

        // Environment variables override YAML config
        if let Ok(provider) = std::env::var("REFDESK_PROVIDER") {
            config.llm.provider = provider;
        }

        if let Ok(model) = std::env::var("REFDESK_MODEL") {
            config.llm.model = model;
        }

        config.log_level = std::env::var("RUST_LOG").ok();

        if std::env::var("NO_COLOR").is_ok() {
            config.no_color = true;
        }

        config.api_key = config.resolve_api_key();

        Ok(config)
    }

    /// Merge a YAML configuration file into this config.
    fn merge_yaml(&self, path: &PathBuf) -> AppResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            AppError::Config(format!("Failed to read config file {:?}: {}", path, e))
        })?;

        let config_file: ConfigFile = serde_yaml::from_str(&contents).map_err(|e| {
            AppError::Config(format!("Failed to parse config file {:?}: {}", path, e))
        })?;

        let mut result = self.clone();

        if let Some(llm) = config_file.llm {
            result.llm = llm;
        }

        if let Some(assistant) = config_file.assistant {
            result.assistant = assistant;
        }

        if let Some(logging) = config_file.logging {
            if let Some(level) = logging.level {
                result.log_level = Some(level);
            }
            if let Some(color) = logging.color {
                result.no_color = !color;
            }
        }

        Ok(result)
    }

    /// Apply CLI overrides to the configuration.
    ///
    /// CLI flags take precedence over environment variables and the file.
    pub fn with_overrides(
        mut self,
        config_file: Option<PathBuf>,
        provider: Option<String>,
        model: Option<String>,
        document: Option<String>,
        log_level: Option<String>,
        verbose: bool,
        no_color: bool,
    ) -> Self {
        if let Some(config_file) = config_file {
            self.config_file = Some(config_file);
        }

        if let Some(provider) = provider {
            self.llm.provider = provider;
        }

        if let Some(model) = model {
            self.llm.model = model;
        }

        if let Some(document) = document {
            self.assistant.document = document;
        }

        if let Some(log_level) = log_level {
            self.log_level = Some(log_level);
        }

        if verbose {
            self.verbose = true;
            if self.log_level.is_none() {
                self.log_level = Some("debug".to_string());
            }
        }

        if no_color {
            self.no_color = true;
        }

        self
    }

    /// Resolve the API key from the environment.
    ///
    /// `REFDESK_API_KEY` wins; otherwise the provider's configured
    /// `apiKeyEnv` variable is consulted.
    pub fn resolve_api_key(&self) -> Option<String> {
        if let Ok(key) = std::env::var("REFDESK_API_KEY") {
            return Some(key);
        }

        self.llm
            .api_key_env
            .as_ref()
            .and_then(|var| std::env::var(var).ok())
    }

    /// Validate configuration for the active provider and category set.
    pub fn validate(&self) -> AppResult<()> {
        let provider = &self.llm.provider;
        let known_providers = ["openai", "ollama", "mock"];

        if !known_providers.contains(&provider.as_str()) {
            return Err(AppError::Config(format!(
                "Unknown provider: {}. Supported: {}",
                provider,
                known_providers.join(", ")
            )));
        }

        if provider == "openai" && self.api_key.is_none() {
            return Err(AppError::Config(format!(
                "OpenAI provider requires an API key (set {} or REFDESK_API_KEY)",
                self.llm.api_key_env.as_deref().unwrap_or("OPENAI_API_KEY")
            )));
        }

        if self.assistant.document.trim().is_empty() {
            return Err(AppError::Config(
                "Document source must be configured".to_string(),
            ));
        }

        self.assistant.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.llm.provider, "openai");
        assert_eq!(config.assistant.role, "HR Assistant");
        assert_eq!(config.assistant.top_k, 4);
        assert!(config.assistant.validate().is_ok());
    }

    #[test]
    fn test_default_categories_match_modes() {
        let config = AssistantConfig::default();
        let rag = config.category("HR-related").unwrap();
        assert_eq!(rag.mode, HandlingMode::Rag);

        let greeting = config.category("Greeting").unwrap();
        assert_eq!(greeting.mode, HandlingMode::Canned);
        assert!(greeting.reply.is_some());
    }

    #[test]
    fn test_category_lookup_is_case_sensitive() {
        let config = AssistantConfig::default();
        assert!(config.category("Greeting").is_some());
        assert!(config.category("greeting").is_none());
    }

    #[test]
    fn test_validate_empty_categories() {
        let mut config = AssistantConfig::default();
        config.categories.clear();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_duplicate_ids() {
        let mut config = AssistantConfig::default();
        let dup = config.categories[0].clone();
        config.categories.push(dup);
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("Duplicate"));
    }

    #[test]
    fn test_validate_canned_without_reply() {
        let mut config = AssistantConfig::default();
        config.categories.push(IntentCategory {
            id: "Broken".to_string(),
            description: "canned but no reply".to_string(),
            mode: HandlingMode::Canned,
            reply: None,
        });
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("Broken"));
    }

    #[test]
    fn test_validate_zero_top_k() {
        let mut config = AssistantConfig::default();
        config.top_k = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_unknown_provider() {
        let mut config = AppConfig::default();
        config.llm.provider = "unknown".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_with_overrides() {
        let config = AppConfig::default();
        let overridden = config.with_overrides(
            None,
            Some("ollama".to_string()),
            Some("llama3.2".to_string()),
            Some("./handbook.md".to_string()),
            None,
            true,
            false,
        );

        assert_eq!(overridden.llm.provider, "ollama");
        assert_eq!(overridden.llm.model, "llama3.2");
        assert_eq!(overridden.assistant.document, "./handbook.md");
        assert!(overridden.verbose);
        assert_eq!(overridden.log_level, Some("debug".to_string()));
    }

    #[test]
    fn test_load_from_missing_file_errors() {
        let err = AppConfig::load_from("/nonexistent/refdesk.yaml").unwrap_err();
        assert!(err.to_string().contains("not found"));
    }

    #[test]
    fn test_merge_yaml_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("refdesk.yaml");
        std::fs::write(
            &path,
            r#"
llm:
  provider: mock
  model: scripted
  embeddingModel: trigram
assistant:
  document: ./policies.md
  role: Policy Assistant
  categories:
    - id: Policy
      description: Questions about internal policies
      mode: rag
    - id: Greeting
      description: Hello or how are you
      mode: canned
      reply: "Hi! Ask me about policies."
  topK: 3
logging:
  level: warn
"#,
        )
        .unwrap();

        let config = AppConfig::default();
        let merged = config.merge_yaml(&path).unwrap();

        assert_eq!(merged.llm.provider, "mock");
        assert_eq!(merged.assistant.role, "Policy Assistant");
        assert_eq!(merged.assistant.categories.len(), 2);
        assert_eq!(merged.assistant.top_k, 3);
        assert_eq!(merged.log_level, Some("warn".to_string()));
        assert!(merged.assistant.validate().is_ok());
    }
}
