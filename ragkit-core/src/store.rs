//! Vector store lifecycle management.
//!
//! [`StoreManager`] owns the persisted [`FlatIndex`] and the single shared
//! mutable resource of the system. It loads the index at startup (degrading
//! to an explicit empty state when the artifact is absent or unreadable),
//! serializes all mutations through a write gate, and persists to a temp
//! file followed by a rename so readers only ever observe a pre-mutation or
//! post-mutation index, never a partial one.

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::sync::{Mutex, RwLock};
use tracing::{debug, error, info, warn};

use crate::document::{Chunk, DocumentSummary, SearchResult, StoreStats, StoreStatus};
use crate::embedding::EmbeddingProvider;
use crate::error::Result;
use crate::index::{FlatIndex, IndexEntry};

/// Shared index state guarded by one lock so the index and its load status
/// stay consistent.
struct IndexState {
    /// `None` is the explicit empty state.
    index: Option<FlatIndex>,
    /// Set when a persisted artifact existed but could not be read; cleared
    /// by the next successful mutation.
    load_error: bool,
}

/// Manages the lifecycle of the persisted vector store.
///
/// Reads (`search`, `list_documents`, `stats`) run concurrently against a
/// consistent snapshot. Mutations (`insert`, `delete_by_source`) are
/// serialized through a write gate and swap the in-memory index only after
/// the new artifact has been persisted.
pub struct StoreManager {
    embedder: Arc<dyn EmbeddingProvider>,
    path: PathBuf,
    state: RwLock<IndexState>,
    write_gate: Mutex<()>,
}

impl StoreManager {
    /// Open the store at `path`, loading any persisted artifact.
    ///
    /// A missing artifact yields the empty state. An unreadable artifact is
    /// logged and likewise degrades to empty; it never prevents startup.
    pub async fn open(embedder: Arc<dyn EmbeddingProvider>, path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let (index, load_error) = Self::load_artifact(&path, embedder.dimensions()).await;
        Self {
            embedder,
            path,
            state: RwLock::new(IndexState { index, load_error }),
            write_gate: Mutex::new(()),
        }
    }

    async fn load_artifact(path: &Path, expected_dimensions: usize) -> (Option<FlatIndex>, bool) {
        match tokio::fs::read(path).await {
            Ok(bytes) => match serde_json::from_slice::<FlatIndex>(&bytes) {
                Ok(index) => {
                    if index.dimensions() != expected_dimensions {
                        warn!(
                            artifact.dimensions = index.dimensions(),
                            embedder.dimensions = expected_dimensions,
                            "store artifact dimensionality disagrees with embedding provider"
                        );
                    }
                    info!(
                        path = %path.display(),
                        entry_count = index.len(),
                        "loaded persisted vector store"
                    );
                    (Some(index), false)
                }
                Err(e) => {
                    error!(
                        path = %path.display(),
                        error = %e,
                        "failed to parse persisted vector store, starting empty"
                    );
                    (None, true)
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                info!(path = %path.display(), "no persisted vector store found, starting empty");
                (None, false)
            }
            Err(e) => {
                error!(
                    path = %path.display(),
                    error = %e,
                    "failed to read persisted vector store, starting empty"
                );
                (None, true)
            }
        }
    }

    /// Insert chunks into the store: embed, merge, persist, swap.
    ///
    /// Returns `true` once the chunks are searchable and persisted. An empty
    /// batch is a caller error and returns `false` without touching the
    /// store, as does any embedding, validation, or persistence failure;
    /// the cause is logged.
    pub async fn insert(&self, chunks: Vec<Chunk>) -> bool {
        if chunks.is_empty() {
            warn!("insert called with no chunks");
            return false;
        }

        let chunk_count = chunks.len();
        match self.try_insert(chunks).await {
            Ok(total) => {
                info!(chunk_count, total_chunks = total, "inserted chunks");
                true
            }
            Err(e) => {
                error!(chunk_count, error = %e, "failed to insert chunks");
                false
            }
        }
    }

    async fn try_insert(&self, chunks: Vec<Chunk>) -> Result<usize> {
        // 1. Embed outside the write gate; concurrent inserts only serialize
        //    on the index update itself.
        let texts: Vec<&str> = chunks.iter().map(|c| c.content.as_str()).collect();
        let embeddings = self.embedder.embed_batch(&texts).await?;

        let entries: Vec<IndexEntry> = chunks
            .into_iter()
            .zip(embeddings)
            .map(|(chunk, embedding)| IndexEntry { chunk, embedding })
            .collect();

        // 2. Snapshot the current index under the gate so no concurrent
        //    mutation can be lost.
        let _gate = self.write_gate.lock().await;
        let mut next = {
            let state = self.state.read().await;
            state
                .index
                .clone()
                .unwrap_or_else(|| FlatIndex::new(self.embedder.dimensions()))
        };

        // 3. Merge, persist, and only then swap the shared reference.
        next.merge(entries)?;
        self.persist(&next).await?;
        let total = next.len();

        let mut state = self.state.write().await;
        state.index = Some(next);
        state.load_error = false;
        Ok(total)
    }

    /// Delete every chunk belonging to `filename` by rebuilding the index
    /// from the surviving entries.
    ///
    /// Returns `false` when no chunk matched or the rebuild failed; in the
    /// failure case the previous index stays active on disk and in memory.
    /// Deleting the last source clears the store to its empty state.
    pub async fn delete_by_source(&self, filename: &str) -> bool {
        match self.try_delete_by_source(filename).await {
            Ok(Some(removed)) => {
                info!(source_file = %filename, removed_chunks = removed, "deleted document");
                true
            }
            Ok(None) => {
                warn!(source_file = %filename, "no stored chunks for source");
                false
            }
            Err(e) => {
                error!(source_file = %filename, error = %e, "failed to delete document");
                false
            }
        }
    }

    async fn try_delete_by_source(&self, filename: &str) -> Result<Option<usize>> {
        let _gate = self.write_gate.lock().await;
        let current = {
            let state = self.state.read().await;
            state.index.clone()
        };
        let Some(current) = current else {
            return Ok(None);
        };

        // Partition entries, reusing the stored embeddings for survivors so
        // the rebuild never calls the embedding provider.
        let mut survivors = Vec::with_capacity(current.len());
        let mut removed = 0usize;
        for entry in current.entries() {
            if entry.chunk.metadata.source_file == filename {
                removed += 1;
            } else {
                survivors.push(entry.clone());
            }
        }
        if removed == 0 {
            return Ok(None);
        }

        if survivors.is_empty() {
            // Last source removed: clear the artifact and swap in the empty state.
            if let Err(e) = tokio::fs::remove_file(&self.path).await {
                if e.kind() != std::io::ErrorKind::NotFound {
                    return Err(e.into());
                }
            }
            let mut state = self.state.write().await;
            state.index = None;
            state.load_error = false;
            return Ok(Some(removed));
        }

        let next = FlatIndex::from_entries(current.dimensions(), survivors)?;
        self.persist(&next).await?;

        let mut state = self.state.write().await;
        state.index = Some(next);
        state.load_error = false;
        Ok(Some(removed))
    }

    /// Search for the `top_k` chunks nearest to `query`.
    ///
    /// Results come back in ascending distance order. An empty store yields
    /// an empty `Vec`, and so does any embedding or index failure; retrieval
    /// problems are logged, never surfaced to the conversation flow.
    pub async fn search(&self, query: &str, top_k: usize) -> Vec<SearchResult> {
        match self.try_search(query, top_k).await {
            Ok(results) => results,
            Err(e) => {
                warn!(error = %e, "search failed, returning no results");
                Vec::new()
            }
        }
    }

    async fn try_search(&self, query: &str, top_k: usize) -> Result<Vec<SearchResult>> {
        {
            let state = self.state.read().await;
            if state.index.is_none() {
                debug!("search against empty store");
                return Ok(Vec::new());
            }
        }

        // Embed before re-taking the lock; the scan itself is synchronous.
        let embedding = self.embedder.embed(query).await?;

        let state = self.state.read().await;
        match &state.index {
            Some(index) => index.search(&embedding, top_k),
            None => Ok(Vec::new()),
        }
    }

    /// Per-source summaries recomputed from the live entry set, ordered by
    /// filename. Never persisted.
    pub async fn list_documents(&self) -> Vec<DocumentSummary> {
        let state = self.state.read().await;
        let Some(index) = &state.index else {
            return Vec::new();
        };

        let mut by_source: BTreeMap<&str, (usize, usize)> = BTreeMap::new();
        for entry in index.entries() {
            let counts = by_source.entry(entry.chunk.metadata.source_file.as_str()).or_default();
            counts.0 += 1;
            counts.1 += entry.chunk.content.len();
        }

        by_source
            .into_iter()
            .map(|(filename, (chunk_count, total_characters))| DocumentSummary {
                filename: filename.to_string(),
                chunk_count,
                total_characters,
            })
            .collect()
    }

    /// A point-in-time snapshot of store status and counts.
    pub async fn stats(&self) -> StoreStats {
        let state = self.state.read().await;
        match &state.index {
            Some(index) => {
                let sources: BTreeSet<&str> = index
                    .entries()
                    .iter()
                    .map(|entry| entry.chunk.metadata.source_file.as_str())
                    .collect();
                StoreStats {
                    status: StoreStatus::Active,
                    document_count: sources.len(),
                    total_chunks: index.len(),
                }
            }
            None => StoreStats {
                status: if state.load_error { StoreStatus::Error } else { StoreStatus::Empty },
                document_count: 0,
                total_chunks: 0,
            },
        }
    }

    /// Whether any chunks are stored for `filename`.
    pub async fn has_source(&self, filename: &str) -> bool {
        let state = self.state.read().await;
        match &state.index {
            Some(index) => index
                .entries()
                .iter()
                .any(|entry| entry.chunk.metadata.source_file == filename),
            None => false,
        }
    }

    /// Write the artifact to a sibling temp file and rename it into place so
    /// a crash mid-write can never corrupt the active artifact.
    async fn persist(&self, index: &FlatIndex) -> Result<()> {
        let bytes = serde_json::to_vec(index)?;
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }
        let tmp = self.path.with_extension("tmp");
        tokio::fs::write(&tmp, &bytes).await?;
        tokio::fs::rename(&tmp, &self.path).await?;
        debug!(path = %self.path.display(), bytes = bytes.len(), "persisted vector store");
        Ok(())
    }
}
