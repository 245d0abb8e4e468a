//! Flat vector index using exact L2 distance search.
//!
//! This module provides [`FlatIndex`], an exhaustive-scan index over
//! `(chunk, embedding)` entries. Search is exact, not approximate: every
//! entry is scored against the query and results are returned in ascending
//! distance order. Entries are immutable once added; removal happens by
//! rebuilding a new index from the surviving entries.

use serde::{Deserialize, Serialize};

use crate::document::{Chunk, SearchResult};
use crate::error::{RagError, Result};

/// A stored `(chunk, embedding)` pair.
///
/// Created at insert time and never individually updated. The embedding is
/// kept alongside the chunk so a rebuild can reuse it without calling the
/// embedding provider again.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct IndexEntry {
    /// The stored chunk.
    pub chunk: Chunk,
    /// The embedding vector for the chunk's content.
    pub embedding: Vec<f32>,
}

/// An exhaustive-scan vector index over in-memory entries.
///
/// Distances are squared Euclidean (L2), so lower means more similar and an
/// exact content match scores 0.0. The whole index serializes as part of the
/// store artifact.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlatIndex {
    dimensions: usize,
    entries: Vec<IndexEntry>,
}

/// Compute squared Euclidean distance between two vectors.
fn l2_distance_squared(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b.iter()).map(|(x, y)| (x - y) * (x - y)).sum()
}

impl FlatIndex {
    /// Create an empty index for embeddings of the given dimensionality.
    pub fn new(dimensions: usize) -> Self {
        Self { dimensions, entries: Vec::new() }
    }

    /// Build an index from existing entries, validating their dimensions.
    pub fn from_entries(dimensions: usize, entries: Vec<IndexEntry>) -> Result<Self> {
        let mut index = Self::new(dimensions);
        index.merge(entries)?;
        Ok(index)
    }

    /// Append entries to the index, validating their dimensions.
    pub fn merge(&mut self, entries: Vec<IndexEntry>) -> Result<()> {
        for entry in &entries {
            if entry.embedding.len() != self.dimensions {
                return Err(RagError::IndexError(format!(
                    "dimension mismatch for chunk '{}': expected {}, got {}",
                    entry.chunk.metadata.chunk_id,
                    self.dimensions,
                    entry.embedding.len()
                )));
            }
        }
        self.entries.extend(entries);
        Ok(())
    }

    /// Search for the `top_k` entries nearest to the query embedding.
    ///
    /// Results are ordered by ascending distance. An empty index returns an
    /// empty `Vec`.
    pub fn search(&self, query: &[f32], top_k: usize) -> Result<Vec<SearchResult>> {
        if query.len() != self.dimensions {
            return Err(RagError::IndexError(format!(
                "query dimension mismatch: expected {}, got {}",
                self.dimensions,
                query.len()
            )));
        }

        let mut scored: Vec<SearchResult> = self
            .entries
            .iter()
            .map(|entry| SearchResult {
                chunk: entry.chunk.clone(),
                distance: l2_distance_squared(&entry.embedding, query),
            })
            .collect();

        scored.sort_by(|a, b| {
            a.distance.partial_cmp(&b.distance).unwrap_or(std::cmp::Ordering::Equal)
        });
        scored.truncate(top_k);
        Ok(scored)
    }

    /// The dimensionality this index accepts.
    pub fn dimensions(&self) -> usize {
        self.dimensions
    }

    /// All stored entries, in insertion order.
    pub fn entries(&self) -> &[IndexEntry] {
        &self.entries
    }

    /// Number of stored entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the index holds no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::ChunkMetadata;

    fn entry(id: &str, embedding: Vec<f32>) -> IndexEntry {
        IndexEntry {
            chunk: Chunk {
                content: format!("content of {id}"),
                metadata: ChunkMetadata {
                    source_file: "test.txt".to_string(),
                    chunk_id: id.to_string(),
                },
            },
            embedding,
        }
    }

    #[test]
    fn empty_index_returns_no_results() {
        let index = FlatIndex::new(3);
        let results = index.search(&[0.0, 0.0, 0.0], 5).unwrap();
        assert!(results.is_empty());
    }

    #[test]
    fn exact_match_has_zero_distance() {
        let index =
            FlatIndex::from_entries(3, vec![entry("a_0", vec![0.1, 0.2, 0.3])]).unwrap();
        let results = index.search(&[0.1, 0.2, 0.3], 1).unwrap();
        assert_eq!(results.len(), 1);
        assert!(results[0].distance.abs() < 1e-6);
    }

    #[test]
    fn nearest_entry_ranks_first() {
        let index = FlatIndex::from_entries(
            2,
            vec![entry("far_0", vec![10.0, 10.0]), entry("near_0", vec![1.0, 1.0])],
        )
        .unwrap();
        let results = index.search(&[1.1, 1.1], 2).unwrap();
        assert_eq!(results[0].chunk.metadata.chunk_id, "near_0");
        assert!(results[0].distance < results[1].distance);
    }

    #[test]
    fn rejects_mismatched_entry_dimensions() {
        let mut index = FlatIndex::new(3);
        let err = index.merge(vec![entry("bad_0", vec![1.0, 2.0])]).unwrap_err();
        assert!(matches!(err, RagError::IndexError(_)));
        assert!(index.is_empty());
    }

    #[test]
    fn rejects_mismatched_query_dimensions() {
        let index = FlatIndex::from_entries(3, vec![entry("a_0", vec![0.0; 3])]).unwrap();
        let err = index.search(&[0.0; 4], 1).unwrap_err();
        assert!(matches!(err, RagError::IndexError(_)));
    }

    #[test]
    fn mismatched_batch_leaves_index_unchanged() {
        let mut index = FlatIndex::from_entries(2, vec![entry("a_0", vec![0.0, 0.0])]).unwrap();
        let batch = vec![entry("b_0", vec![1.0, 1.0]), entry("b_1", vec![1.0])];
        assert!(index.merge(batch).is_err());
        assert_eq!(index.len(), 1);
    }
}
