//! In-memory index store.
//!
//! Useful for tests and ephemeral runs.

use super::{hits_to_chunks, validate_build, DocumentSummary, FlatIndex, IndexStore, ScoredChunk};
use crate::chunking::Chunk;
use crate::error::{LaereError, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::RwLock;

struct Entry {
    index: FlatIndex,
    chunks: Vec<Chunk>,
    indexed_at: DateTime<Utc>,
}

/// In-memory index store.
pub struct MemoryIndexStore {
    dim: usize,
    documents: RwLock<HashMap<String, Entry>>,
}

impl MemoryIndexStore {
    /// Create a new in-memory store with a fixed vector dimension.
    pub fn new(dim: usize) -> Self {
        Self {
            dim,
            documents: RwLock::new(HashMap::new()),
        }
    }
}

#[async_trait]
impl IndexStore for MemoryIndexStore {
    async fn build_and_persist(
        &self,
        document_id: &str,
        embeddings: &[Vec<f32>],
        chunks: &[Chunk],
    ) -> Result<()> {
        validate_build(self.dim, embeddings, chunks)?;
        let index = FlatIndex::from_vectors(self.dim, embeddings)?;

        let mut documents = self
            .documents
            .write()
            .map_err(|e| LaereError::Storage(format!("lock poisoned: {}", e)))?;
        documents.insert(
            document_id.to_string(),
            Entry {
                index,
                chunks: chunks.to_vec(),
                indexed_at: Utc::now(),
            },
        );
        Ok(())
    }

    async fn search(&self, document_id: &str, query: &[f32], k: usize) -> Result<Vec<ScoredChunk>> {
        let (index, chunks) = self.load(document_id).await?;
        let hits = index.search(query, k)?;
        Ok(hits_to_chunks(hits, &chunks))
    }

    async fn load(&self, document_id: &str) -> Result<(FlatIndex, Vec<Chunk>)> {
        let documents = self
            .documents
            .read()
            .map_err(|e| LaereError::Storage(format!("lock poisoned: {}", e)))?;
        let entry = documents
            .get(document_id)
            .ok_or_else(|| LaereError::IndexNotFound(document_id.to_string()))?;
        Ok((entry.index.clone(), entry.chunks.clone()))
    }

    async fn exists(&self, document_id: &str) -> Result<bool> {
        let documents = self
            .documents
            .read()
            .map_err(|e| LaereError::Storage(format!("lock poisoned: {}", e)))?;
        Ok(documents.contains_key(document_id))
    }

    async fn list(&self) -> Result<Vec<DocumentSummary>> {
        let documents = self
            .documents
            .read()
            .map_err(|e| LaereError::Storage(format!("lock poisoned: {}", e)))?;

        let mut summaries: Vec<DocumentSummary> = documents
            .iter()
            .map(|(id, entry)| DocumentSummary {
                document_id: id.clone(),
                chunk_count: entry.chunks.len(),
                indexed_at: entry.indexed_at,
            })
            .collect();
        summaries.sort_by(|a, b| b.indexed_at.cmp(&a.indexed_at));
        Ok(summaries)
    }

    fn dimensions(&self) -> usize {
        self.dim
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chunk(index: usize, text: &str) -> Chunk {
        Chunk {
            index,
            text: text.to_string(),
            word_count: text.split_whitespace().count(),
        }
    }

    #[tokio::test]
    async fn test_memory_store_round_trip() {
        let store = MemoryIndexStore::new(2);

        store
            .build_and_persist(
                "vid-1",
                &[vec![1.0, 0.0], vec![0.0, 1.0]],
                &[chunk(0, "first"), chunk(1, "second")],
            )
            .await
            .unwrap();

        let results = store.search("vid-1", &[1.0, 0.0], 1).await.unwrap();
        assert_eq!(results[0].text, "first");
        assert_eq!(results[0].distance, 0.0);

        assert!(store.exists("vid-1").await.unwrap());
        assert!(!store.exists("vid-2").await.unwrap());

        let err = store.search("vid-2", &[1.0, 0.0], 1).await.unwrap_err();
        assert!(matches!(err, LaereError::IndexNotFound(_)));
    }

    #[tokio::test]
    async fn test_memory_store_replaces_on_rebuild() {
        let store = MemoryIndexStore::new(2);

        store
            .build_and_persist("vid-1", &[vec![1.0, 0.0]], &[chunk(0, "old")])
            .await
            .unwrap();
        store
            .build_and_persist("vid-1", &[vec![0.0, 1.0]], &[chunk(0, "new")])
            .await
            .unwrap();

        let results = store.search("vid-1", &[0.0, 1.0], 10).await.unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].text, "new");
    }
}
