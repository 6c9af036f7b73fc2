//! Per-document vector index storage and retrieval.
//!
//! Each ingested document owns two co-located artifacts keyed by its id: a
//! flat vector index and the parallel chunk list, with `chunks[i]` described
//! by vector `i`. Indexes are built once per ingestion, replaced atomically,
//! and read-only afterwards.

mod flat;
mod fs;
mod memory;

pub use flat::{FlatIndex, Hit};
pub use fs::FsIndexStore;
pub use memory::MemoryIndexStore;

use crate::chunking::Chunk;
use crate::error::{LaereError, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A retrieved chunk with its distance to the query.
#[derive(Debug, Clone, Serialize)]
pub struct ScoredChunk {
    /// Chunk position within the document.
    pub index: usize,
    /// Chunk text.
    pub text: String,
    /// Squared-L2 distance to the query (lower is better).
    pub distance: f32,
}

/// Summary information about one ingested document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentSummary {
    /// Document (video) identifier.
    pub document_id: String,
    /// Number of indexed chunks.
    pub chunk_count: usize,
    /// When the document was ingested.
    pub indexed_at: DateTime<Utc>,
}

/// Trait for per-document index store implementations.
#[async_trait]
pub trait IndexStore: Send + Sync {
    /// Build an index over `embeddings` and persist it together with the
    /// parallel `chunks` list, replacing any prior content for this id.
    async fn build_and_persist(
        &self,
        document_id: &str,
        embeddings: &[Vec<f32>],
        chunks: &[Chunk],
    ) -> Result<()>;

    /// Return the `k` chunks nearest to `query`, nearest first.
    async fn search(&self, document_id: &str, query: &[f32], k: usize) -> Result<Vec<ScoredChunk>>;

    /// Load the persisted index and chunk list for a document.
    async fn load(&self, document_id: &str) -> Result<(FlatIndex, Vec<Chunk>)>;

    /// Whether an index exists for this document.
    async fn exists(&self, document_id: &str) -> Result<bool>;

    /// List all ingested documents.
    async fn list(&self) -> Result<Vec<DocumentSummary>>;

    /// The vector dimension this store was configured with.
    fn dimensions(&self) -> usize;
}

/// Validate a build request before any storage is touched.
pub(crate) fn validate_build(
    dim: usize,
    embeddings: &[Vec<f32>],
    chunks: &[Chunk],
) -> Result<()> {
    if embeddings.is_empty() || chunks.is_empty() {
        return Err(LaereError::EmptyIndex);
    }
    if embeddings.len() != chunks.len() {
        return Err(LaereError::IndexMismatch {
            embeddings: embeddings.len(),
            chunks: chunks.len(),
        });
    }
    for embedding in embeddings {
        if embedding.len() != dim {
            return Err(LaereError::DimensionMismatch {
                expected: dim,
                actual: embedding.len(),
            });
        }
    }
    Ok(())
}

/// Map index hits onto their chunk texts.
pub(crate) fn hits_to_chunks(hits: Vec<Hit>, chunks: &[Chunk]) -> Vec<ScoredChunk> {
    hits.into_iter()
        .map(|hit| ScoredChunk {
            index: hit.index,
            text: chunks[hit.index].text.clone(),
            distance: hit.distance,
        })
        .collect()
}
