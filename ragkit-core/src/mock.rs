//! Deterministic mock providers for tests and keyless development.

use async_trait::async_trait;

use crate::completion::CompletionModel;
use crate::embedding::EmbeddingProvider;
use crate::error::{RagError, Result};

/// Deterministic hash-based embedding provider.
///
/// Hashes the text bytes and generates an L2-normalized vector whose
/// direction depends on the content, so identical text always embeds to the
/// identical vector and distinct text almost always differs. Needs no API
/// keys, which makes it the default provider for tests and local runs.
pub struct MockEmbedding {
    dimensions: usize,
    fail: bool,
}

impl MockEmbedding {
    /// Create a provider producing vectors of the given dimensionality.
    pub fn new(dimensions: usize) -> Self {
        Self { dimensions, fail: false }
    }

    /// A provider whose every call fails, for exercising degradation paths.
    pub fn failing(dimensions: usize) -> Self {
        Self { dimensions, fail: true }
    }
}

#[async_trait]
impl EmbeddingProvider for MockEmbedding {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        if self.fail {
            return Err(RagError::EmbeddingError {
                provider: "mock".to_string(),
                message: "mock embedding failure".to_string(),
            });
        }

        let hash = text.bytes().fold(0u64, |acc, b| acc.wrapping_mul(31).wrapping_add(b as u64));
        let mut embedding = vec![0.0f32; self.dimensions];
        for (i, v) in embedding.iter_mut().enumerate() {
            *v = ((hash.wrapping_add(i as u64)) as f32).sin();
        }
        let norm: f32 = embedding.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            embedding.iter_mut().for_each(|x| *x /= norm);
        }
        Ok(embedding)
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }
}

enum MockCompletionMode {
    Reply(String),
    Fail(String),
    Hang,
}

/// Scripted completion model for tests and local runs.
pub struct MockCompletion {
    mode: MockCompletionMode,
}

impl MockCompletion {
    /// A model that answers every prompt with the given text.
    pub fn replying(text: impl Into<String>) -> Self {
        Self { mode: MockCompletionMode::Reply(text.into()) }
    }

    /// A model that returns blank output, for exercising the apology path.
    pub fn empty() -> Self {
        Self::replying("")
    }

    /// A model whose every call fails with the given message.
    pub fn failing(message: impl Into<String>) -> Self {
        Self { mode: MockCompletionMode::Fail(message.into()) }
    }

    /// A model that never completes, for exercising the timeout path.
    pub fn hanging() -> Self {
        Self { mode: MockCompletionMode::Hang }
    }
}

#[async_trait]
impl CompletionModel for MockCompletion {
    fn name(&self) -> &str {
        "mock-completion"
    }

    async fn complete(&self, _prompt: &str) -> Result<String> {
        match &self.mode {
            MockCompletionMode::Reply(text) => Ok(text.clone()),
            MockCompletionMode::Fail(message) => Err(RagError::CompletionError {
                provider: "mock-completion".to_string(),
                message: message.clone(),
            }),
            MockCompletionMode::Hang => std::future::pending().await,
        }
    }
}
