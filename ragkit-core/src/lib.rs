//! # ragkit-core
//!
//! Retrieval-augmented document QA engine: chunk documents, index them in a
//! persisted vector store, retrieve relevant chunks for a question, and run
//! the grounded conversation pipeline.
//!
//! ## Overview
//!
//! The crate is organized around a handful of collaborators:
//!
//! - [`RagService`] - the facade: ingest, ask, list, delete, stats
//! - [`StoreManager`] - vector store lifecycle with atomic persistence
//! - [`ContextAssembler`] - scored retrieval with threshold filtering
//! - [`ConversationPipeline`] - the five-stage question flow
//! - [`Chunker`] implementations - [`RecursiveChunker`], [`FixedSizeChunker`]
//! - Capability traits - [`EmbeddingProvider`], [`CompletionModel`]
//! - [`MockEmbedding`] / [`MockCompletion`] - deterministic keyless providers
//!
//! Scores are distances: lower means more similar, and only results strictly
//! below the configured distance threshold count as relevant.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use ragkit_core::{MockCompletion, MockEmbedding, RagConfig, RagService};
//!
//! # async fn run() -> ragkit_core::Result<()> {
//! let service = RagService::builder()
//!     .config(RagConfig::default())
//!     .embedding_provider(Arc::new(MockEmbedding::new(64)))
//!     .completion_model(Arc::new(MockCompletion::replying("Grounded answer.")))
//!     .store_path("data/store.json")
//!     .build()
//!     .await?;
//!
//! service.ingest("manual.txt", "The widget is installed with the blue lever.").await;
//! let outcome = service.ask("How do I install the widget?", true).await;
//! println!("{}", outcome.message);
//! # Ok(())
//! # }
//! ```
//!
//! With the `openai` feature enabled, [`openai::OpenAIEmbeddingProvider`]
//! and [`openai::OpenAICompletionModel`] replace the mocks.

pub mod chunking;
pub mod completion;
pub mod config;
pub mod document;
pub mod embedding;
pub mod error;
pub mod index;
pub mod mock;
#[cfg(feature = "openai")]
pub mod openai;
pub mod pipeline;
pub mod prompt;
pub mod retrieval;
pub mod service;
pub mod store;

pub use chunking::{Chunker, FixedSizeChunker, RecursiveChunker};
pub use completion::CompletionModel;
pub use config::{RagConfig, RagConfigBuilder};
pub use document::{
    Chunk, ChunkMetadata, Document, DocumentSummary, SearchResult, StoreStats, StoreStatus,
};
pub use embedding::EmbeddingProvider;
pub use error::{RagError, Result};
pub use index::{FlatIndex, IndexEntry};
pub use mock::{MockCompletion, MockEmbedding};
pub use pipeline::{ConversationOutcome, ConversationPipeline};
pub use prompt::PromptTemplates;
pub use retrieval::{ContextAssembler, assemble_context, filter_by_threshold};
pub use service::{RagService, RagServiceBuilder};
pub use store::StoreManager;
