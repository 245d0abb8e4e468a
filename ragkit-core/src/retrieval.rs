//! Retrieval and context assembly.
//!
//! The [`ContextAssembler`] turns a question into grounded context: it runs
//! a scored search against the store, keeps only results strictly below the
//! distance threshold, and serializes the survivors into a source-attributed
//! context block. Filtering and formatting are free functions so they are
//! testable without a store.

use std::sync::Arc;

use tracing::debug;

use crate::document::{Chunk, SearchResult};
use crate::store::StoreManager;

/// Keep results with distance strictly below `threshold`, preserving order.
///
/// A result exactly at the threshold is excluded. Distances come back from
/// the store in ascending order, so the survivors stay ranked best-first.
pub fn filter_by_threshold(results: Vec<SearchResult>, threshold: f32) -> Vec<SearchResult> {
    results.into_iter().filter(|r| r.distance < threshold).collect()
}

/// Format chunks into a source-attributed context block.
///
/// Each chunk renders as `[Document {i} - {source_file}]` followed by its
/// trimmed content, 1-indexed in retrieval order, with a blank line between
/// entries. An empty slice yields an empty string.
pub fn assemble_context(chunks: &[Chunk]) -> String {
    chunks
        .iter()
        .enumerate()
        .map(|(i, chunk)| {
            format!("[Document {} - {}]\n{}", i + 1, chunk.metadata.source_file, chunk.content.trim())
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Retrieves and ranks store content relevant to a question.
pub struct ContextAssembler {
    store: Arc<StoreManager>,
    top_k: usize,
    distance_threshold: f32,
}

impl ContextAssembler {
    /// Create an assembler over `store` with the given retrieval parameters.
    pub fn new(store: Arc<StoreManager>, top_k: usize, distance_threshold: f32) -> Self {
        Self { store, top_k, distance_threshold }
    }

    /// Retrieve the chunks relevant to `query`: top-k search followed by the
    /// strict threshold filter.
    ///
    /// Returns an empty `Vec` when the store is empty, when nothing clears
    /// the threshold, or when the search itself failed; the caller answers
    /// without grounding in all three cases.
    pub async fn retrieve(&self, query: &str) -> Vec<Chunk> {
        let results = self.store.search(query, self.top_k).await;
        let searched = results.len();
        let relevant = filter_by_threshold(results, self.distance_threshold);
        debug!(
            searched,
            relevant = relevant.len(),
            threshold = self.distance_threshold,
            "filtered retrieval results"
        );
        relevant.into_iter().map(|r| r.chunk).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::ChunkMetadata;

    fn result(distance: f32) -> SearchResult {
        SearchResult {
            chunk: Chunk {
                content: format!("chunk at {distance}"),
                metadata: ChunkMetadata {
                    source_file: "doc.txt".to_string(),
                    chunk_id: format!("doc.txt_{distance}"),
                },
            },
            distance,
        }
    }

    fn chunk(source: &str, content: &str) -> Chunk {
        Chunk {
            content: content.to_string(),
            metadata: ChunkMetadata {
                source_file: source.to_string(),
                chunk_id: format!("{source}_0"),
            },
        }
    }

    #[test]
    fn threshold_filter_is_strictly_less_than() {
        let results = vec![result(0.5), result(1.9), result(2.0), result(2.1)];
        let kept = filter_by_threshold(results, 2.0);
        assert_eq!(kept.len(), 2);
        assert_eq!(kept[0].distance, 0.5);
        assert_eq!(kept[1].distance, 1.9);
    }

    #[test]
    fn threshold_filter_preserves_order() {
        let results = vec![result(0.1), result(0.7), result(0.3)];
        let kept = filter_by_threshold(results, 1.0);
        let distances: Vec<f32> = kept.iter().map(|r| r.distance).collect();
        assert_eq!(distances, vec![0.1, 0.7, 0.3]);
    }

    #[test]
    fn assemble_empty_yields_empty_string() {
        assert_eq!(assemble_context(&[]), "");
    }

    #[test]
    fn assemble_single_chunk() {
        let chunks = vec![chunk("manual.pdf", "Install the widget.")];
        assert_eq!(assemble_context(&chunks), "[Document 1 - manual.pdf]\nInstall the widget.");
    }

    #[test]
    fn assemble_numbers_chunks_in_order_with_blank_lines() {
        let chunks = vec![
            chunk("a.txt", "First passage."),
            chunk("b.txt", "Second passage."),
        ];
        assert_eq!(
            assemble_context(&chunks),
            "[Document 1 - a.txt]\nFirst passage.\n\n[Document 2 - b.txt]\nSecond passage."
        );
    }

    #[test]
    fn assemble_trims_chunk_content() {
        let chunks = vec![chunk("c.txt", "  padded content\n")];
        assert_eq!(assemble_context(&chunks), "[Document 1 - c.txt]\npadded content");
    }
}
