//! Error types for the `ragkit-core` crate.

use thiserror::Error;

/// Errors that can occur in retrieval and conversation operations.
#[derive(Debug, Error)]
pub enum RagError {
    /// An error occurred during embedding generation.
    #[error("Embedding error ({provider}): {message}")]
    EmbeddingError {
        /// The embedding provider that produced the error.
        provider: String,
        /// A description of the failure.
        message: String,
    },

    /// An error occurred during text completion.
    #[error("Completion error ({provider}): {message}")]
    CompletionError {
        /// The completion provider that produced the error.
        provider: String,
        /// A description of the failure.
        message: String,
    },

    /// An error occurred in the vector index.
    #[error("Index error: {0}")]
    IndexError(String),

    /// An error occurred while persisting or loading the store artifact.
    #[error("Store persistence error: {0}")]
    PersistenceError(#[from] std::io::Error),

    /// The store artifact could not be serialized or deserialized.
    #[error("Store serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    /// A prompt template was missing a required placeholder.
    #[error("Prompt template error: {0}")]
    TemplateError(String),

    /// A configuration validation error.
    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// A convenience result type for retrieval operations.
pub type Result<T> = std::result::Result<T, RagError>;
