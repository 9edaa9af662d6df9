//! Document indexing for refdesk.
//!
//! Turns a single reference document (local file or URL) into an
//! in-memory vector index: load and clean the text, split on paragraph
//! boundaries, embed each paragraph through the model gateway, and hold
//! the result behind an atomically swappable handle.

pub mod handle;
pub mod index;
pub mod ingest;
pub mod source;
pub mod splitter;

// Re-export commonly used types
pub use handle::IndexHandle;
pub use index::{DocumentChunk, IndexStats, VectorIndex};
pub use ingest::build_index;
pub use source::DocumentSource;
pub use splitter::{split_paragraphs, ParagraphCandidate};
