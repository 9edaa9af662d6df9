//! Prompt system for refdesk.
//!
//! This crate owns the wording of every model call: the classification
//! prompt with its worked examples, the "rephrase only" instruction for
//! canned replies, and the grounded-answer system prompt with its
//! not-found sentinel. Templates are rendered with Handlebars.

pub mod builder;
pub mod templates;

// Re-export main builders
pub use builder::{
    build_answer_system_prompt, build_classification_prompt, build_context,
    build_rephrase_prompt, classification_system_prompt,
};
