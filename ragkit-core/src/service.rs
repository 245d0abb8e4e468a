//! High-level service facade.
//!
//! [`RagService`] is the surface the HTTP layer holds: document ingestion,
//! question answering, listing, deletion, store statistics, and a raw scored
//! search for diagnostics. Construct one via [`RagService::builder()`].

use std::path::PathBuf;
use std::sync::Arc;

use tracing::{info, warn};

use crate::chunking::{Chunker, RecursiveChunker};
use crate::completion::CompletionModel;
use crate::config::RagConfig;
use crate::document::{Document, DocumentSummary, SearchResult, StoreStats};
use crate::embedding::EmbeddingProvider;
use crate::error::{RagError, Result};
use crate::pipeline::{ConversationOutcome, ConversationPipeline};
use crate::prompt::PromptTemplates;
use crate::retrieval::ContextAssembler;
use crate::store::StoreManager;

/// The composition of chunker, store, retrieval, and conversation pipeline.
pub struct RagService {
    store: Arc<StoreManager>,
    chunker: Arc<dyn Chunker>,
    pipeline: ConversationPipeline,
    config: RagConfig,
}

impl RagService {
    /// Create a new [`RagServiceBuilder`].
    pub fn builder() -> RagServiceBuilder {
        RagServiceBuilder::default()
    }

    /// Return a reference to the service configuration.
    pub fn config(&self) -> &RagConfig {
        &self.config
    }

    /// Ingest extracted text under `filename`: chunk, embed, store.
    ///
    /// Re-ingesting a filename replaces its previously stored chunks, so
    /// chunk IDs stay unique per source. Returns `false` when the text has
    /// no extractable content or any step fails; causes are logged.
    pub async fn ingest(&self, filename: &str, text: &str) -> bool {
        if text.trim().is_empty() {
            warn!(source_file = %filename, "no extractable text to ingest");
            return false;
        }

        let document = Document { filename: filename.to_string(), text: text.to_string() };
        let chunks = self.chunker.chunk(&document);
        if chunks.is_empty() {
            warn!(source_file = %filename, "document produced no chunks");
            return false;
        }

        if self.store.has_source(filename).await {
            if !self.store.delete_by_source(filename).await {
                // Inserting on top of the old chunks would duplicate IDs.
                return false;
            }
            info!(source_file = %filename, "replacing previously stored document");
        }

        let chunk_count = chunks.len();
        let inserted = self.store.insert(chunks).await;
        if inserted {
            info!(source_file = %filename, chunk_count, "ingested document");
        }
        inserted
    }

    /// Answer a question, optionally grounded in retrieved context.
    pub async fn ask(&self, question: &str, use_rag: bool) -> ConversationOutcome {
        self.pipeline.run(question, use_rag).await
    }

    /// Per-source summaries of stored documents, ordered by filename.
    pub async fn list_documents(&self) -> Vec<DocumentSummary> {
        self.store.list_documents().await
    }

    /// Delete every stored chunk belonging to `filename`.
    pub async fn delete_document(&self, filename: &str) -> bool {
        self.store.delete_by_source(filename).await
    }

    /// A point-in-time snapshot of store status and counts.
    pub async fn store_stats(&self) -> StoreStats {
        self.store.stats().await
    }

    /// Raw scored search without threshold filtering, for diagnostics.
    pub async fn search_scored(&self, query: &str, top_k: usize) -> Vec<SearchResult> {
        self.store.search(query, top_k).await
    }
}

/// Builder for constructing a [`RagService`].
///
/// The embedding provider, completion model, and store path are required.
/// Configuration, chunker, and prompt templates fall back to defaults.
#[derive(Default)]
pub struct RagServiceBuilder {
    config: Option<RagConfig>,
    embedding_provider: Option<Arc<dyn EmbeddingProvider>>,
    completion_model: Option<Arc<dyn CompletionModel>>,
    chunker: Option<Arc<dyn Chunker>>,
    templates: Option<PromptTemplates>,
    store_path: Option<PathBuf>,
}

impl RagServiceBuilder {
    /// Set the service configuration.
    pub fn config(mut self, config: RagConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Set the embedding provider.
    pub fn embedding_provider(mut self, provider: Arc<dyn EmbeddingProvider>) -> Self {
        self.embedding_provider = Some(provider);
        self
    }

    /// Set the completion model.
    pub fn completion_model(mut self, model: Arc<dyn CompletionModel>) -> Self {
        self.completion_model = Some(model);
        self
    }

    /// Set the document chunker. Defaults to a [`RecursiveChunker`] sized
    /// from the configuration.
    pub fn chunker(mut self, chunker: Arc<dyn Chunker>) -> Self {
        self.chunker = Some(chunker);
        self
    }

    /// Set custom prompt templates.
    pub fn prompt_templates(mut self, templates: PromptTemplates) -> Self {
        self.templates = Some(templates);
        self
    }

    /// Set the path of the persisted store artifact.
    pub fn store_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.store_path = Some(path.into());
        self
    }

    /// Build the [`RagService`], loading any persisted store artifact.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::ConfigError`] if a required field is missing.
    pub async fn build(self) -> Result<RagService> {
        let config = self.config.unwrap_or_default();
        let embedding_provider = self
            .embedding_provider
            .ok_or_else(|| RagError::ConfigError("embedding_provider is required".to_string()))?;
        let completion_model = self
            .completion_model
            .ok_or_else(|| RagError::ConfigError("completion_model is required".to_string()))?;
        let store_path = self
            .store_path
            .ok_or_else(|| RagError::ConfigError("store_path is required".to_string()))?;
        let chunker = self
            .chunker
            .unwrap_or_else(|| Arc::new(RecursiveChunker::new(config.chunk_size, config.chunk_overlap)));
        let templates = self.templates.unwrap_or_default();

        let store = Arc::new(StoreManager::open(embedding_provider, store_path).await);
        let assembler =
            ContextAssembler::new(Arc::clone(&store), config.top_k, config.distance_threshold);
        let pipeline =
            ConversationPipeline::new(assembler, completion_model, templates, config.clone());

        Ok(RagService { store, chunker, pipeline, config })
    }
}
