//! Text completion trait for response generation.

use async_trait::async_trait;

use crate::error::Result;

/// A model capable of completing a text prompt.
///
/// The conversation pipeline treats generation as an opaque capability: one
/// prompt in, one string out. Provider response shapes (choices, candidates,
/// streaming deltas) are normalized to a single `String` inside the
/// implementation so the pipeline never inspects them. Transient failures
/// are expected; the pipeline applies its own timeout and retry policy
/// around [`complete`](CompletionModel::complete).
#[async_trait]
pub trait CompletionModel: Send + Sync {
    /// A short identifier for the backing model, used in logs and errors.
    fn name(&self) -> &str;

    /// Produce a completion for the given prompt.
    async fn complete(&self, prompt: &str) -> Result<String>;
}
