//! In-memory vector index over document chunks.
//!
//! Built once by ingestion, then held as shared read-only state.
//! Similarity search is brute-force cosine over all chunks; reference
//! documents are a few hundred paragraphs at most.

use chrono::{DateTime, Utc};
use refdesk_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};

/// An embedded, immutable unit of the source document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentChunk {
    /// Paragraph ordinal in the source document
    pub position: u32,

    /// Chunk text
    pub text: String,

    /// Embedding vector
    pub embedding: Vec<f32>,
}

/// Summary of a built index, for logs and the CLI.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexStats {
    /// Unique id of this build
    pub build_id: String,

    /// When the build finished
    pub built_at: DateTime<Utc>,

    /// Number of retrievable chunks
    pub chunk_count: usize,

    /// Embedding dimension
    pub dimension: usize,
}

/// Similarity-searchable store of embedded document chunks.
#[derive(Debug)]
pub struct VectorIndex {
    build_id: String,
    built_at: DateTime<Utc>,
    dimension: usize,
    chunks: Vec<DocumentChunk>,
}

impl VectorIndex {
    /// Assemble an index from embedded chunks.
    ///
    /// All embeddings must share one dimension; a mismatch indicates a
    /// broken ingestion run and fails the build.
    pub fn new(chunks: Vec<DocumentChunk>) -> AppResult<Self> {
        let dimension = chunks.first().map(|c| c.embedding.len()).unwrap_or(0);

        for chunk in &chunks {
            if chunk.embedding.len() != dimension {
                return Err(AppError::Ingestion(format!(
                    "Inconsistent embedding dimensions: chunk {} has {}, expected {}",
                    chunk.position,
                    chunk.embedding.len(),
                    dimension
                )));
            }
        }

        Ok(Self {
            build_id: uuid::Uuid::new_v4().to_string(),
            built_at: Utc::now(),
            dimension,
            chunks,
        })
    }

    /// Number of chunks in the index.
    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    /// Build summary.
    pub fn stats(&self) -> IndexStats {
        IndexStats {
            build_id: self.build_id.clone(),
            built_at: self.built_at,
            chunk_count: self.chunks.len(),
            dimension: self.dimension,
        }
    }

    /// Retrieve the top-k chunks most similar to the query embedding.
    ///
    /// Results are sorted by cosine similarity, descending.
    pub fn search(&self, query_embedding: &[f32], top_k: usize) -> Vec<(DocumentChunk, f32)> {
        let mut results: Vec<(DocumentChunk, f32)> = self
            .chunks
            .iter()
            .map(|chunk| {
                let score = cosine_similarity(query_embedding, &chunk.embedding);
                (chunk.clone(), score)
            })
            .collect();

        results.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
        results.truncate(top_k);

        tracing::debug!(
            retrieved = results.len(),
            requested = top_k,
            "Vector index search"
        );

        results
    }
}

/// Calculate cosine similarity between two vectors.
fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() {
        return 0.0;
    }

    let dot_product: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    dot_product / (norm_a * norm_b)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chunk(position: u32, text: &str, embedding: Vec<f32>) -> DocumentChunk {
        DocumentChunk {
            position,
            text: text.to_string(),
            embedding,
        }
    }

    #[test]
    fn test_search_ranks_by_similarity() {
        let index = VectorIndex::new(vec![
            chunk(0, "exact", vec![1.0, 0.0, 0.0]),
            chunk(1, "orthogonal", vec![0.0, 1.0, 0.0]),
            chunk(2, "close", vec![0.9, 0.1, 0.0]),
        ])
        .unwrap();

        let results = index.search(&[1.0, 0.0, 0.0], 2);
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].0.text, "exact");
        assert_eq!(results[1].0.text, "close");
        assert!(results[0].1 > results[1].1);
    }

    #[test]
    fn test_search_truncates_to_top_k() {
        let chunks = (0..10)
            .map(|i| chunk(i, "text", vec![1.0, i as f32]))
            .collect();
        let index = VectorIndex::new(chunks).unwrap();

        assert_eq!(index.search(&[1.0, 0.0], 3).len(), 3);
    }

    #[test]
    fn test_empty_index_search() {
        let index = VectorIndex::new(vec![]).unwrap();
        assert!(index.is_empty());
        assert!(index.search(&[1.0, 0.0], 5).is_empty());
    }

    #[test]
    fn test_dimension_mismatch_rejected() {
        let result = VectorIndex::new(vec![
            chunk(0, "a", vec![1.0, 0.0]),
            chunk(1, "b", vec![1.0, 0.0, 0.0]),
        ]);
        assert!(matches!(result, Err(AppError::Ingestion(_))));
    }

    #[test]
    fn test_stats() {
        let index = VectorIndex::new(vec![chunk(0, "a", vec![1.0, 0.0])]).unwrap();
        let stats = index.stats();
        assert_eq!(stats.chunk_count, 1);
        assert_eq!(stats.dimension, 2);
        assert!(!stats.build_id.is_empty());
    }

    #[test]
    fn test_cosine_similarity_basics() {
        assert!((cosine_similarity(&[1.0, 0.0], &[1.0, 0.0]) - 1.0).abs() < 1e-6);
        assert!(cosine_similarity(&[1.0, 0.0], &[0.0, 1.0]).abs() < 1e-6);
        assert_eq!(cosine_similarity(&[1.0], &[1.0, 0.0]), 0.0);
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 0.0]), 0.0);
    }
}
