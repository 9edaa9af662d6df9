//! Document ingestion: load, split, embed, assemble.

use crate::index::{DocumentChunk, VectorIndex};
use crate::source::DocumentSource;
use crate::splitter;
use refdesk_core::{AppError, AppResult};
use refdesk_llm::LlmClient;
use std::time::{Duration, Instant};

/// Build a vector index from a document source.
///
/// The pipeline is all-or-nothing: any failure (unreachable source,
/// embedding error, dimension mismatch) returns an error and every
/// intermediate artifact is dropped. No partially built index is ever
/// observable — installation into a handle is the caller's final step.
pub async fn build_index(
    source: &DocumentSource,
    client: &dyn LlmClient,
    fetch_timeout: Duration,
) -> AppResult<VectorIndex> {
    let start = Instant::now();

    tracing::info!(source = %source.describe(), "Building document index");

    let text = source.load(fetch_timeout).await?;

    let candidates = splitter::split_paragraphs(&text);
    if candidates.is_empty() {
        return Err(AppError::Ingestion(format!(
            "Document {} contains no indexable paragraphs",
            source.describe()
        )));
    }

    let texts: Vec<String> = candidates.iter().map(|c| c.text.clone()).collect();
    let embeddings = client.embed_batch(&texts).await?;

    if embeddings.len() != candidates.len() {
        return Err(AppError::Ingestion(format!(
            "Embedding count mismatch: {} chunks, {} embeddings",
            candidates.len(),
            embeddings.len()
        )));
    }

    let chunks: Vec<DocumentChunk> = candidates
        .into_iter()
        .zip(embeddings)
        .map(|(candidate, embedding)| DocumentChunk {
            position: candidate.position,
            text: candidate.text,
            embedding,
        })
        .collect();

    let index = VectorIndex::new(chunks)?;

    tracing::info!(
        chunks = index.len(),
        elapsed_ms = start.elapsed().as_millis() as u64,
        "Document index built"
    );

    Ok(index)
}

#[cfg(test)]
mod tests {
    use super::*;
    use refdesk_llm::MockClient;
    use std::io::Write;

    fn write_temp(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(".txt").tempfile().unwrap();
        write!(file, "{}", content).unwrap();
        file
    }

    #[tokio::test]
    async fn test_build_index_counts_paragraphs() {
        let file = write_temp("Leave policy: 25 days.\n\nRemote work is allowed.\n\nPayroll runs monthly.");
        let source = DocumentSource::Path(file.path().to_path_buf());
        let client = MockClient::with_dimensions(64);

        let index = build_index(&source, &client, Duration::from_secs(5))
            .await
            .unwrap();

        assert_eq!(index.len(), 3);
        assert_eq!(index.stats().dimension, 64);
    }

    #[tokio::test]
    async fn test_verbatim_chunk_query_ranks_first() {
        let file = write_temp(
            "Employees accrue vacation days every calendar month.\n\n\
             Expense reports require a manager signature.\n\n\
             The cafeteria opens at eight in the morning.",
        );
        let source = DocumentSource::Path(file.path().to_path_buf());
        let client = MockClient::with_dimensions(384);

        let index = build_index(&source, &client, Duration::from_secs(5))
            .await
            .unwrap();

        let query = client
            .embed("Expense reports require a manager signature.")
            .await
            .unwrap();
        let results = index.search(&query, 2);

        assert!(results[0].0.text.contains("Expense reports"));
    }

    #[tokio::test]
    async fn test_unreachable_source_fails_cleanly() {
        let source = DocumentSource::Path("/no/such/file.txt".into());
        let client = MockClient::new();

        let err = build_index(&source, &client, Duration::from_secs(5))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Ingestion(_)));
    }

    #[tokio::test]
    async fn test_blank_document_rejected() {
        let file = write_temp("\n\n   \n\n");
        let source = DocumentSource::Path(file.path().to_path_buf());
        let client = MockClient::new();

        let err = build_index(&source, &client, Duration::from_secs(5))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("no indexable paragraphs"));
    }
}
