//! Retrieval service: chunking, embedding, and index access for one document.
//!
//! Ingestion runs chunker → embedder → index store; queries run embedder →
//! index store. Chunk order is preserved end to end, so `embeddings[i]`
//! always describes `chunks[i]`.

use crate::chunking::{chunk_words, ChunkingConfig};
use crate::embedding::Embedder;
use crate::error::{LaereError, Result};
use crate::index::{IndexStore, ScoredChunk};
use std::sync::Arc;
use tracing::{debug, info, instrument};

/// Orchestrates chunking, embedding and nearest-neighbor retrieval.
pub struct RetrievalService {
    embedder: Arc<dyn Embedder>,
    store: Arc<dyn IndexStore>,
    chunking: ChunkingConfig,
}

/// Result of ingesting one document.
#[derive(Debug, Clone)]
pub struct IngestResult {
    /// Number of chunks indexed.
    pub chunks_indexed: usize,
}

impl RetrievalService {
    /// Create a service over an embedder and an index store.
    pub fn new(
        embedder: Arc<dyn Embedder>,
        store: Arc<dyn IndexStore>,
        chunking: ChunkingConfig,
    ) -> Self {
        Self {
            embedder,
            store,
            chunking,
        }
    }

    /// Chunk, embed and index a transcript, replacing any prior index for
    /// this document.
    #[instrument(skip(self, transcript_text), fields(chars = transcript_text.len()))]
    pub async fn ingest(&self, document_id: &str, transcript_text: &str) -> Result<IngestResult> {
        let chunks = chunk_words(transcript_text, &self.chunking)?;
        if chunks.is_empty() {
            return Err(LaereError::EmptyTranscript(document_id.to_string()));
        }
        debug!("Chunked transcript into {} chunks", chunks.len());

        let texts: Vec<String> = chunks.iter().map(|c| c.text.clone()).collect();
        let embeddings = self.embedder.embed_batch(&texts).await?;

        self.store
            .build_and_persist(document_id, &embeddings, &chunks)
            .await?;

        info!("Ingested {} with {} chunks", document_id, chunks.len());
        Ok(IngestResult {
            chunks_indexed: chunks.len(),
        })
    }

    /// Retrieve the `k` chunks most similar to a question.
    ///
    /// A document that was never ingested yields `NotIngested`, so callers
    /// can tell "process the video first" apart from other failures.
    #[instrument(skip(self, question), fields(question = %question))]
    pub async fn query(
        &self,
        document_id: &str,
        question: &str,
        k: usize,
    ) -> Result<Vec<ScoredChunk>> {
        let query_embedding = self.embedder.embed(question).await?;

        match self.store.search(document_id, &query_embedding, k).await {
            Ok(results) => Ok(results),
            Err(LaereError::IndexNotFound(id)) => Err(LaereError::NotIngested(id)),
            Err(e) => Err(e),
        }
    }

    /// Whether a document has a built index.
    pub async fn is_ingested(&self, document_id: &str) -> Result<bool> {
        self.store.exists(document_id).await
    }
}
