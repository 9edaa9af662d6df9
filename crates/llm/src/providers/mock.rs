//! Mock provider for testing and offline development.
//!
//! Completions come from a scripted queue; embeddings are deterministic,
//! content-aware trigram vectors. Both call paths are counted so tests
//! can assert exactly how many model calls a scenario makes.

use crate::client::{ChatRequest, ChatResponse, LlmClient, TokenUsage};
use refdesk_core::AppResult;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

/// Scripted, deterministic model client.
pub struct MockClient {
    dimensions: usize,
    responses: Mutex<VecDeque<String>>,
    default_reply: String,
    complete_calls: AtomicUsize,
    embed_calls: AtomicUsize,
}

impl MockClient {
    /// Create a new mock client with 384-dimensional embeddings.
    pub fn new() -> Self {
        Self::with_dimensions(384)
    }

    /// Create a mock client with the given embedding dimensions.
    pub fn with_dimensions(dimensions: usize) -> Self {
        Self {
            dimensions,
            responses: Mutex::new(VecDeque::new()),
            default_reply: "mock reply".to_string(),
            complete_calls: AtomicUsize::new(0),
            embed_calls: AtomicUsize::new(0),
        }
    }

    /// Queue scripted completion responses, consumed in order.
    pub fn with_responses<I, S>(self, responses: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        {
            let mut queue = self.responses.lock().unwrap_or_else(|e| e.into_inner());
            queue.extend(responses.into_iter().map(Into::into));
        }
        self
    }

    /// Set the reply returned once the scripted queue is exhausted.
    pub fn with_default_reply(mut self, reply: impl Into<String>) -> Self {
        self.default_reply = reply.into();
        self
    }

    /// Number of completion calls made so far.
    pub fn complete_calls(&self) -> usize {
        self.complete_calls.load(Ordering::SeqCst)
    }

    /// Number of embedding calls made so far.
    pub fn embed_calls(&self) -> usize {
        self.embed_calls.load(Ordering::SeqCst)
    }

    /// Total model calls of either shape.
    pub fn total_calls(&self) -> usize {
        self.complete_calls() + self.embed_calls()
    }

    /// Generate a deterministic trigram-based embedding for text.
    ///
    /// Not semantically accurate like a real embedding model, but
    /// consistent and content-dependent: identical texts produce
    /// identical vectors and shared vocabulary raises similarity.
    fn trigram_embedding(&self, text: &str) -> Vec<f32> {
        let mut embedding = vec![0.0f32; self.dimensions];

        let lower = text.to_lowercase();

        // Filter stop words for better discrimination
        let stop_words: std::collections::HashSet<&str> = [
            "the", "is", "at", "which", "on", "a", "an", "as", "are", "was", "were", "for", "to",
            "of", "in", "and", "or", "but", "with", "by", "from", "this", "that", "be", "have",
            "has", "had", "it", "its", "their", "they", "them",
        ]
        .iter()
        .copied()
        .collect();

        let words: Vec<&str> = lower
            .split_whitespace()
            .filter(|w| !stop_words.contains(w) && w.len() > 2)
            .collect();

        let mut word_freq = std::collections::HashMap::new();
        for word in &words {
            *word_freq.entry(*word).or_insert(0u32) += 1;
        }

        for (word, freq) in word_freq.iter() {
            // Character trigrams spread each word over several dimensions
            let chars: Vec<char> = word.chars().collect();
            for i in 0..chars.len().saturating_sub(2) {
                let trigram = format!("{}{}{}", chars[i], chars[i + 1], chars[i + 2]);
                let trigram_hash = trigram
                    .bytes()
                    .fold(0u64, |acc, b| acc.wrapping_mul(37).wrapping_add(b as u64));

                let dim_idx = (trigram_hash as usize) % self.dimensions;
                embedding[dim_idx] += (*freq as f32).sqrt();
            }

            // Also encode the whole word
            let word_hash = word
                .bytes()
                .fold(0u64, |acc, b| acc.wrapping_mul(31).wrapping_add(b as u64));
            let base_dim = (word_hash as usize) % self.dimensions;
            embedding[base_dim] += *freq as f32;
        }

        // Normalize to unit vector
        let norm: f32 = embedding.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            for v in &mut embedding {
                *v /= norm;
            }
        }

        embedding
    }
}

impl Default for MockClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl LlmClient for MockClient {
    fn provider_name(&self) -> &str {
        "mock"
    }

    async fn complete(&self, _request: &ChatRequest) -> AppResult<ChatResponse> {
        self.complete_calls.fetch_add(1, Ordering::SeqCst);

        let content = self
            .responses
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .pop_front()
            .unwrap_or_else(|| self.default_reply.clone());

        Ok(ChatResponse {
            content,
            model: "mock".to_string(),
            usage: TokenUsage::default(),
        })
    }

    async fn embed_batch(&self, texts: &[String]) -> AppResult<Vec<Vec<f32>>> {
        self.embed_calls.fetch_add(1, Ordering::SeqCst);
        Ok(texts.iter().map(|t| self.trigram_embedding(t)).collect())
    }
}
