//! refdesk core library
//!
//! This crate provides the foundational utilities for refdesk:
//! - Error handling (`AppError`, `AppResult`)
//! - Logging infrastructure
//! - Configuration management (provider settings, the intent category
//!   set, routing policy knobs)

pub mod config;
pub mod error;
pub mod logging;

// Re-export commonly used types
pub use config::{AppConfig, AssistantConfig, HandlingMode, IntentCategory, ProviderConfig};
pub use error::{AppError, AppResult};
