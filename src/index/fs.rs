//! Filesystem-backed index store.
//!
//! Each document is stored as two artifacts under the store root:
//! `{id}.index` (flat vector index) and `{id}.chunks.json` (parallel chunk
//! list). Writes go through a temp file in the same directory and are renamed
//! into place, so each artifact is replaced atomically. The two renames are
//! not one atomic step, so a store-level lock pairs them with the reads in
//! `load`: a reader observes either the old artifact pair or the new one,
//! never a fresh index next to stale chunk text.

use super::{hits_to_chunks, validate_build, DocumentSummary, FlatIndex, IndexStore, ScoredChunk};
use crate::chunking::Chunk;
use crate::error::{LaereError, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::RwLock;
use tempfile::NamedTempFile;
use tracing::{debug, instrument};

/// Index store persisting one index + chunk-list artifact pair per document.
pub struct FsIndexStore {
    root: PathBuf,
    dim: usize,
    /// Pairs the two artifact renames with the two reads in `load`.
    lock: RwLock<()>,
}

impl FsIndexStore {
    /// Create a store rooted at `root`, creating the directory if needed.
    pub fn new(root: &Path, dim: usize) -> Result<Self> {
        std::fs::create_dir_all(root)?;
        Ok(Self {
            root: root.to_path_buf(),
            dim,
            lock: RwLock::new(()),
        })
    }

    fn index_path(&self, document_id: &str) -> PathBuf {
        self.root.join(format!("{}.index", document_id))
    }

    fn chunks_path(&self, document_id: &str) -> PathBuf {
        self.root.join(format!("{}.chunks.json", document_id))
    }

    /// Document ids become file names, so restrict them to safe characters.
    fn validate_id(document_id: &str) -> Result<()> {
        if document_id.is_empty()
            || !document_id
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
        {
            return Err(LaereError::InvalidInput(format!(
                "invalid document id: '{}'",
                document_id
            )));
        }
        Ok(())
    }

    /// Write bytes to a temp file in the store root, then rename into place.
    fn write_atomic(&self, path: &Path, bytes: &[u8]) -> Result<()> {
        let mut file = NamedTempFile::new_in(&self.root)?;
        file.write_all(bytes)?;
        file.persist(path)
            .map_err(|e| LaereError::Storage(format!("failed to replace {}: {}", path.display(), e)))?;
        Ok(())
    }
}

#[async_trait]
impl IndexStore for FsIndexStore {
    #[instrument(skip(self, embeddings, chunks), fields(count = chunks.len()))]
    async fn build_and_persist(
        &self,
        document_id: &str,
        embeddings: &[Vec<f32>],
        chunks: &[Chunk],
    ) -> Result<()> {
        Self::validate_id(document_id)?;
        validate_build(self.dim, embeddings, chunks)?;

        let index = FlatIndex::from_vectors(self.dim, embeddings)?;
        let chunk_json = serde_json::to_vec(chunks)?;

        // Both renames happen under the write lock so a concurrent load
        // cannot pair the new index with the old chunk list.
        let _guard = self
            .lock
            .write()
            .map_err(|e| LaereError::Storage(format!("lock poisoned: {}", e)))?;
        self.write_atomic(&self.index_path(document_id), &index.to_bytes())?;
        self.write_atomic(&self.chunks_path(document_id), &chunk_json)?;

        debug!("Persisted {} vectors for {}", chunks.len(), document_id);
        Ok(())
    }

    #[instrument(skip(self, query))]
    async fn search(&self, document_id: &str, query: &[f32], k: usize) -> Result<Vec<ScoredChunk>> {
        let (index, chunks) = self.load(document_id).await?;
        let hits = index.search(query, k)?;
        Ok(hits_to_chunks(hits, &chunks))
    }

    async fn load(&self, document_id: &str) -> Result<(FlatIndex, Vec<Chunk>)> {
        Self::validate_id(document_id)?;

        let _guard = self
            .lock
            .read()
            .map_err(|e| LaereError::Storage(format!("lock poisoned: {}", e)))?;

        let index_bytes = match std::fs::read(self.index_path(document_id)) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(LaereError::IndexNotFound(document_id.to_string()));
            }
            Err(e) => return Err(e.into()),
        };
        let index = FlatIndex::from_bytes(&index_bytes)?;

        if index.dim() != self.dim {
            return Err(LaereError::DimensionMismatch {
                expected: self.dim,
                actual: index.dim(),
            });
        }

        let chunk_bytes = match std::fs::read(self.chunks_path(document_id)) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(LaereError::Storage(format!(
                    "chunk list missing for document '{}'",
                    document_id
                )));
            }
            Err(e) => return Err(e.into()),
        };
        let chunks: Vec<Chunk> = serde_json::from_slice(&chunk_bytes).map_err(|e| {
            LaereError::Storage(format!(
                "chunk list for document '{}' is corrupt: {}",
                document_id, e
            ))
        })?;

        if index.len() != chunks.len() {
            return Err(LaereError::Storage(format!(
                "document '{}' has {} vectors but {} chunks",
                document_id,
                index.len(),
                chunks.len()
            )));
        }

        Ok((index, chunks))
    }

    async fn exists(&self, document_id: &str) -> Result<bool> {
        Self::validate_id(document_id)?;
        Ok(self.index_path(document_id).exists() && self.chunks_path(document_id).exists())
    }

    async fn list(&self) -> Result<Vec<DocumentSummary>> {
        let mut summaries = Vec::new();

        for entry in std::fs::read_dir(&self.root)? {
            let entry = entry?;
            let name = entry.file_name();
            let Some(document_id) = name.to_str().and_then(|n| n.strip_suffix(".chunks.json"))
            else {
                continue;
            };

            let chunks: Vec<Chunk> = match std::fs::read(entry.path())
                .ok()
                .and_then(|bytes| serde_json::from_slice(&bytes).ok())
            {
                Some(chunks) => chunks,
                None => continue,
            };

            let indexed_at: DateTime<Utc> = entry
                .metadata()?
                .modified()
                .map(DateTime::from)
                .unwrap_or_else(|_| Utc::now());

            summaries.push(DocumentSummary {
                document_id: document_id.to_string(),
                chunk_count: chunks.len(),
                indexed_at,
            });
        }

        summaries.sort_by(|a, b| b.indexed_at.cmp(&a.indexed_at));
        Ok(summaries)
    }

    fn dimensions(&self) -> usize {
        self.dim
    }
}
