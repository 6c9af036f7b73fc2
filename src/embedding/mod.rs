//! Embedding generation for chunks and queries.
//!
//! The embedder is a capability boundary: the rest of the pipeline only
//! relies on the contract that `embed_batch` preserves input order, that all
//! vectors share one fixed dimension, and that the mapping is deterministic
//! for a fixed model.

mod openai;

pub use openai::OpenAIEmbedder;

use crate::error::Result;
use async_trait::async_trait;

/// Trait for embedding generation.
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Generate an embedding for a single text.
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;

    /// Generate embeddings for multiple texts, one per input, in input order.
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>>;

    /// The fixed dimension of every vector this embedder produces.
    fn dimensions(&self) -> usize;
}
