//! Environment-driven server settings.
//!
//! Every knob reads a `RAGKIT_*` variable and falls back to a default, so a
//! bare `cargo run` starts a working server. Malformed values fall back to
//! the default rather than aborting startup; combinations are still checked
//! by [`RagConfig`] validation.

use std::path::PathBuf;
use std::str::FromStr;

use ragkit_core::{RagConfig, Result};

/// Server settings resolved from the environment.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Bind address, from `RAGKIT_HOST`. Defaults to `127.0.0.1`.
    pub host: String,
    /// Bind port, from `RAGKIT_PORT`. Defaults to `8000`.
    pub port: u16,
    /// Store artifact location, from `RAGKIT_STORE_PATH`. Defaults to
    /// `vector_store/store.json`.
    pub store_path: PathBuf,
    /// Chunk size in characters, from `RAGKIT_CHUNK_SIZE`.
    pub chunk_size: usize,
    /// Overlap between consecutive chunks, from `RAGKIT_CHUNK_OVERLAP`.
    pub chunk_overlap: usize,
    /// Results per vector search, from `RAGKIT_TOP_K`.
    pub top_k: usize,
    /// Relevance cutoff distance, from `RAGKIT_DISTANCE_THRESHOLD`.
    pub distance_threshold: f32,
    /// Maximum accepted question length, from `RAGKIT_MAX_QUESTION_CHARS`.
    pub max_question_chars: usize,
    /// Per-attempt completion timeout in seconds, from
    /// `RAGKIT_COMPLETION_TIMEOUT_SECS`.
    pub completion_timeout_secs: u64,
    /// Completion attempts before giving up, from
    /// `RAGKIT_COMPLETION_MAX_RETRIES`.
    pub completion_max_retries: u32,
}

impl Settings {
    /// Resolve settings from the environment.
    pub fn from_env() -> Self {
        let defaults = RagConfig::default();
        Self {
            host: std::env::var("RAGKIT_HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port: env_parse("RAGKIT_PORT", 8000),
            store_path: std::env::var("RAGKIT_STORE_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("vector_store/store.json")),
            chunk_size: env_parse("RAGKIT_CHUNK_SIZE", defaults.chunk_size),
            chunk_overlap: env_parse("RAGKIT_CHUNK_OVERLAP", defaults.chunk_overlap),
            top_k: env_parse("RAGKIT_TOP_K", defaults.top_k),
            distance_threshold: env_parse("RAGKIT_DISTANCE_THRESHOLD", defaults.distance_threshold),
            max_question_chars: env_parse("RAGKIT_MAX_QUESTION_CHARS", defaults.max_question_chars),
            completion_timeout_secs: env_parse(
                "RAGKIT_COMPLETION_TIMEOUT_SECS",
                defaults.completion_timeout_secs,
            ),
            completion_max_retries: env_parse(
                "RAGKIT_COMPLETION_MAX_RETRIES",
                defaults.completion_max_retries,
            ),
        }
    }

    /// Build the validated retrieval configuration from these settings.
    ///
    /// # Errors
    ///
    /// Returns a configuration error when the combined values are invalid,
    /// for example `RAGKIT_CHUNK_OVERLAP` at or above `RAGKIT_CHUNK_SIZE`.
    pub fn rag_config(&self) -> Result<RagConfig> {
        RagConfig::builder()
            .chunk_size(self.chunk_size)
            .chunk_overlap(self.chunk_overlap)
            .top_k(self.top_k)
            .distance_threshold(self.distance_threshold)
            .max_question_chars(self.max_question_chars)
            .completion_timeout_secs(self.completion_timeout_secs)
            .completion_max_retries(self.completion_max_retries)
            .build()
    }
}

fn env_parse<T: FromStr>(key: &str, default: T) -> T {
    std::env::var(key).ok().and_then(|value| value.parse().ok()).unwrap_or(default)
}
