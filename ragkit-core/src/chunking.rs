//! Document chunking strategies.
//!
//! This module provides the [`Chunker`] trait and two implementations:
//!
//! - [`RecursiveChunker`] — splits hierarchically by paragraphs, lines,
//!   sentences, then words
//! - [`FixedSizeChunker`] — splits by character count with configurable overlap

use crate::document::{Chunk, ChunkMetadata, Document};

/// A strategy for splitting documents into chunks.
///
/// Implementations produce [`Chunk`]s with content and provenance metadata.
/// Embeddings are attached later by the store.
pub trait Chunker: Send + Sync {
    /// Split a document into chunks.
    ///
    /// Returns an empty `Vec` if the document has no extractable text.
    /// Chunk IDs are assigned as `{filename}_{ordinal}` where the ordinal is
    /// the position in the returned sequence, so two chunks with identical
    /// content still receive distinct IDs.
    fn chunk(&self, document: &Document) -> Vec<Chunk>;
}

fn make_chunk(document: &Document, ordinal: usize, content: String) -> Chunk {
    Chunk {
        content,
        metadata: ChunkMetadata {
            source_file: document.filename.clone(),
            chunk_id: format!("{}_{ordinal}", document.filename),
        },
    }
}

/// Splits text hierarchically: paragraphs → lines → sentences → words.
///
/// First splits by paragraph separators (`\n\n`). Segments exceeding
/// `chunk_size` are split by line breaks, then sentence boundaries
/// (`. `, `! `, `? `), then word boundaries. Consecutive chunks of one
/// source share roughly `chunk_overlap` characters of trailing context.
#[derive(Debug, Clone)]
pub struct RecursiveChunker {
    chunk_size: usize,
    chunk_overlap: usize,
}

impl RecursiveChunker {
    /// Create a new `RecursiveChunker`.
    ///
    /// # Arguments
    ///
    /// * `chunk_size` — maximum number of characters per chunk
    /// * `chunk_overlap` — number of overlapping characters between consecutive chunks
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Self {
        Self { chunk_size, chunk_overlap }
    }
}

impl Chunker for RecursiveChunker {
    fn chunk(&self, document: &Document) -> Vec<Chunk> {
        if document.text.trim().is_empty() {
            return Vec::new();
        }

        let separators = ["\n\n", "\n", ". ", "! ", "? ", " "];
        let raw_chunks =
            split_and_merge(&document.text, self.chunk_size, self.chunk_overlap, &separators);

        raw_chunks
            .into_iter()
            .enumerate()
            .map(|(i, content)| make_chunk(document, i, content))
            .collect()
    }
}

/// Splits text into fixed-size chunks by character count with configurable overlap.
#[derive(Debug, Clone)]
pub struct FixedSizeChunker {
    chunk_size: usize,
    chunk_overlap: usize,
}

impl FixedSizeChunker {
    /// Create a new `FixedSizeChunker`.
    ///
    /// # Arguments
    ///
    /// * `chunk_size` — maximum number of characters per chunk
    /// * `chunk_overlap` — number of overlapping characters between consecutive chunks
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Self {
        Self { chunk_size, chunk_overlap }
    }
}

impl Chunker for FixedSizeChunker {
    fn chunk(&self, document: &Document) -> Vec<Chunk> {
        if document.text.trim().is_empty() {
            return Vec::new();
        }

        split_by_size(&document.text, self.chunk_size, self.chunk_overlap)
            .into_iter()
            .enumerate()
            .map(|(i, content)| make_chunk(document, i, content))
            .collect()
    }
}

/// Split text by a separator, then merge segments into chunks that respect
/// `chunk_size`. If a merged run exceeds `chunk_size`, it is split further
/// using the next-level separator. Each chunk after the first starts with
/// the tail of its predecessor so neighbouring chunks share context.
fn split_and_merge(
    text: &str,
    chunk_size: usize,
    chunk_overlap: usize,
    separators: &[&str],
) -> Vec<String> {
    if text.len() <= chunk_size || separators.is_empty() {
        return split_by_size(text, chunk_size, chunk_overlap);
    }

    let separator = separators[0];
    let remaining_separators = &separators[1..];
    let segments = split_keeping_separator(text, separator);

    let mut chunks = Vec::new();
    let mut current = String::new();

    for segment in segments {
        if current.is_empty() {
            current = segment.to_string();
        } else if current.len() + segment.len() <= chunk_size {
            current.push_str(segment);
        } else {
            // Current chunk is full. Flush it and seed the next one with its tail.
            let tail = overlap_tail(&current, chunk_overlap).to_string();
            if current.len() > chunk_size {
                chunks.extend(split_and_merge(
                    &current,
                    chunk_size,
                    chunk_overlap,
                    remaining_separators,
                ));
            } else {
                chunks.push(current);
            }
            current = tail;
            current.push_str(segment);
        }
    }

    if !current.is_empty() {
        if current.len() > chunk_size {
            chunks.extend(split_and_merge(
                &current,
                chunk_size,
                chunk_overlap,
                remaining_separators,
            ));
        } else {
            chunks.push(current);
        }
    }

    chunks
}

/// Split text at a separator while keeping the separator attached to the preceding segment.
fn split_keeping_separator<'a>(text: &'a str, separator: &str) -> Vec<&'a str> {
    let mut result = Vec::new();
    let mut start = 0;

    while let Some(pos) = text[start..].find(separator) {
        let end = start + pos + separator.len();
        result.push(&text[start..end]);
        start = end;
    }

    if start < text.len() {
        result.push(&text[start..]);
    }

    result
}

/// Simple character-based splitting with overlap. Window boundaries are
/// snapped to char boundaries so multi-byte text never splits mid-codepoint.
fn split_by_size(text: &str, chunk_size: usize, chunk_overlap: usize) -> Vec<String> {
    if text.is_empty() {
        return Vec::new();
    }

    let mut chunks = Vec::new();
    let mut start = 0;

    while start < text.len() {
        let mut end = floor_char_boundary(text, (start + chunk_size).min(text.len()));
        if end <= start {
            end = ceil_char_boundary(text, start + 1);
        }
        chunks.push(text[start..end].to_string());

        let step = chunk_size.saturating_sub(chunk_overlap);
        if step == 0 {
            break;
        }
        start = ceil_char_boundary(text, start + step);
    }

    chunks
}

/// The trailing `overlap` characters of `text`, snapped to a char boundary.
fn overlap_tail(text: &str, overlap: usize) -> &str {
    if overlap == 0 {
        return "";
    }
    if text.len() <= overlap {
        return text;
    }
    let start = ceil_char_boundary(text, text.len() - overlap);
    &text[start..]
}

/// Largest index `<= index` that lies on a char boundary.
fn floor_char_boundary(text: &str, index: usize) -> usize {
    if index >= text.len() {
        return text.len();
    }
    let mut i = index;
    while !text.is_char_boundary(i) {
        i -= 1;
    }
    i
}

/// Smallest index `>= index` that lies on a char boundary.
fn ceil_char_boundary(text: &str, index: usize) -> usize {
    if index >= text.len() {
        return text.len();
    }
    let mut i = index;
    while !text.is_char_boundary(i) {
        i += 1;
    }
    i
}
