//! Query-routing engine for refdesk.
//!
//! The pipeline per query: intent classification, then routing to either
//! a retrieval-augmented answer over the document index or a paraphrased
//! canned reply. The `Assistant` facade exposes the two external
//! operations (initialize, chat) to embedders and the CLI.

pub mod answer;
pub mod assistant;
pub mod classify;
pub mod router;

// Re-export main types
pub use assistant::Assistant;
pub use classify::{classify, Intent};
pub use router::respond;
