//! Data types for documents, chunks, and search results.

use serde::{Deserialize, Serialize};

/// A source document containing extracted text content.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Document {
    /// The filename the text was extracted from.
    pub filename: String,
    /// The extracted text content.
    pub text: String,
}

/// Provenance metadata attached to every chunk.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChunkMetadata {
    /// The filename of the source document.
    pub source_file: String,
    /// Identifier unique per `(source_file, ordinal)`, formatted as
    /// `"{filename}_{ordinal}"`.
    pub chunk_id: String,
}

/// A segment of a [`Document`] with provenance metadata.
///
/// Chunks are immutable once inserted into the store; deletion replaces the
/// containing index rather than mutating entries in place.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Chunk {
    /// The text content of the chunk.
    pub content: String,
    /// Provenance metadata for the chunk.
    pub metadata: ChunkMetadata,
}

/// A retrieved [`Chunk`] paired with its distance from the query.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResult {
    /// The retrieved chunk.
    pub chunk: Chunk,
    /// Non-negative distance between the query and the chunk embedding.
    /// Lower is more similar.
    pub distance: f32,
}

/// Per-source aggregate computed from the live entry set.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DocumentSummary {
    /// The source filename.
    pub filename: String,
    /// Number of chunks stored for this source.
    pub chunk_count: usize,
    /// Sum of chunk content lengths for this source, in bytes.
    pub total_characters: usize,
}

/// Lifecycle state of the vector store.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StoreStatus {
    /// No entries are stored. A valid state, not an error.
    Empty,
    /// At least one entry is stored and searchable.
    Active,
    /// The persisted artifact existed but could not be read at load time.
    Error,
}

/// A point-in-time snapshot of store contents.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StoreStats {
    /// Lifecycle state of the store.
    pub status: StoreStatus,
    /// Number of distinct source files.
    pub document_count: usize,
    /// Total number of chunks across all sources.
    pub total_chunks: usize,
}
