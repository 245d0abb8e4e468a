//! Conversation pipeline orchestrator.
//!
//! [`ConversationPipeline`] runs five stages over request-scoped state:
//! parse input, retrieve context, enhance prompt, generate response,
//! finalize output. Every stage after input parsing short-circuits once an
//! error is recorded, and finalization turns any recorded error into a
//! friendly fallback message, so the conversation path never propagates an
//! internal fault to the caller.

use std::sync::Arc;
use std::time::Instant;

use serde::{Deserialize, Serialize};
use tokio::time::timeout;
use tracing::{debug, info, warn};

use crate::completion::CompletionModel;
use crate::config::RagConfig;
use crate::document::Chunk;
use crate::prompt::{EMPTY_COMPLETION_FALLBACK, PromptTemplates, processing_failure_message};
use crate::retrieval::{ContextAssembler, assemble_context};

/// Request-scoped state threaded through the pipeline stages.
///
/// One instance per question; never shared across requests.
#[derive(Debug)]
struct ConversationContext {
    question: String,
    use_rag: bool,
    retrieved_chunks: Vec<Chunk>,
    context: String,
    prompt: String,
    response: String,
    error: Option<String>,
}

impl ConversationContext {
    fn new(question: &str, use_rag: bool) -> Self {
        Self {
            question: question.to_string(),
            use_rag,
            retrieved_chunks: Vec::new(),
            context: String::new(),
            prompt: String::new(),
            response: String::new(),
            error: None,
        }
    }
}

/// The result of running a question through the pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationOutcome {
    /// Whether the pipeline completed without recording an error.
    pub success: bool,
    /// The response text. On failure this is a user-facing fallback message,
    /// never an empty string.
    pub message: String,
    /// Wall-clock processing time in seconds.
    pub processing_time: f64,
    /// Whether retrieval was enabled for this request.
    pub use_rag: bool,
    /// Whether any retrieved context made it into the prompt.
    pub context_used: bool,
    /// Number of chunks that cleared the distance threshold.
    pub documents_found: usize,
    /// The recorded error detail, if any stage failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Runs questions through the five-stage conversation flow.
pub struct ConversationPipeline {
    assembler: ContextAssembler,
    completion: Arc<dyn CompletionModel>,
    templates: PromptTemplates,
    config: RagConfig,
}

impl ConversationPipeline {
    /// Create a pipeline over the given assembler and completion model.
    pub fn new(
        assembler: ContextAssembler,
        completion: Arc<dyn CompletionModel>,
        templates: PromptTemplates,
        config: RagConfig,
    ) -> Self {
        Self { assembler, completion, templates, config }
    }

    /// Run `question` through all five stages and report the outcome.
    pub async fn run(&self, question: &str, use_rag: bool) -> ConversationOutcome {
        let started = Instant::now();
        let mut ctx = ConversationContext::new(question, use_rag);

        self.parse_input(&mut ctx);
        self.retrieve_context(&mut ctx).await;
        self.enhance_prompt(&mut ctx);
        self.generate_response(&mut ctx).await;
        self.finalize_output(&mut ctx);

        let outcome = ConversationOutcome {
            success: ctx.error.is_none(),
            message: ctx.response,
            processing_time: started.elapsed().as_secs_f64(),
            use_rag: ctx.use_rag,
            context_used: !ctx.context.is_empty(),
            documents_found: ctx.retrieved_chunks.len(),
            error: ctx.error,
        };
        info!(
            success = outcome.success,
            use_rag = outcome.use_rag,
            context_used = outcome.context_used,
            documents_found = outcome.documents_found,
            processing_time = outcome.processing_time,
            "conversation complete"
        );
        outcome
    }

    /// Stage 1: validate the question, recording an error instead of failing.
    fn parse_input(&self, ctx: &mut ConversationContext) {
        if ctx.question.trim().is_empty() {
            ctx.error = Some("Invalid question: empty or whitespace only".to_string());
            return;
        }
        let length = ctx.question.chars().count();
        if length > self.config.max_question_chars {
            ctx.error = Some(format!(
                "Question too long (max {} characters)",
                format_thousands(self.config.max_question_chars)
            ));
        }
    }

    /// Stage 2: retrieve and assemble grounding context.
    ///
    /// Retrieval failures never fail the conversation; the store already
    /// degrades them to an empty result set, which leaves `context` empty.
    async fn retrieve_context(&self, ctx: &mut ConversationContext) {
        if ctx.error.is_some() {
            return;
        }
        if !ctx.use_rag {
            debug!("retrieval disabled for this request");
            return;
        }

        let chunks = self.assembler.retrieve(&ctx.question).await;
        ctx.context = assemble_context(&chunks);
        ctx.retrieved_chunks = chunks;
        debug!(
            documents_found = ctx.retrieved_chunks.len(),
            context_chars = ctx.context.len(),
            "retrieved context"
        );
    }

    /// Stage 3: interpolate the question and context into a prompt.
    fn enhance_prompt(&self, ctx: &mut ConversationContext) {
        if ctx.error.is_some() {
            return;
        }
        ctx.prompt = if ctx.context.is_empty() {
            self.templates.render_ungrounded(&ctx.question)
        } else {
            self.templates.render_grounded(&ctx.question, &ctx.context)
        };
    }

    /// Stage 4: invoke the completion model with timeout and bounded retries.
    ///
    /// Blank output is normalized to a fixed apology; exhausted retries
    /// record the last failure for finalization.
    async fn generate_response(&self, ctx: &mut ConversationContext) {
        if ctx.error.is_some() {
            return;
        }

        let mut last_error = String::new();
        for attempt in 1..=self.config.completion_max_retries {
            match timeout(self.config.completion_timeout(), self.completion.complete(&ctx.prompt))
                .await
            {
                Ok(Ok(text)) => {
                    if text.trim().is_empty() {
                        warn!(
                            model = self.completion.name(),
                            attempt, "completion returned blank output"
                        );
                        ctx.response = EMPTY_COMPLETION_FALLBACK.to_string();
                    } else {
                        ctx.response = text;
                    }
                    debug!(model = self.completion.name(), attempt, "generated response");
                    return;
                }
                Ok(Err(e)) => {
                    warn!(
                        model = self.completion.name(),
                        attempt, error = %e, "completion attempt failed"
                    );
                    last_error = e.to_string();
                }
                Err(_) => {
                    warn!(
                        model = self.completion.name(),
                        attempt,
                        timeout_secs = self.config.completion_timeout_secs,
                        "completion attempt timed out"
                    );
                    last_error = format!(
                        "completion timed out after {}s",
                        self.config.completion_timeout_secs
                    );
                }
            }
        }
        ctx.error = Some(last_error);
    }

    /// Stage 5: substitute the failure message when an error was recorded.
    fn finalize_output(&self, ctx: &mut ConversationContext) {
        if let Some(error) = &ctx.error {
            ctx.response = processing_failure_message(error);
        }
    }
}

/// Format a count with thousands separators, e.g. `10000` → `"10,000"`.
fn format_thousands(n: usize) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_thousands_separators() {
        assert_eq!(format_thousands(0), "0");
        assert_eq!(format_thousands(999), "999");
        assert_eq!(format_thousands(1000), "1,000");
        assert_eq!(format_thousands(10_000), "10,000");
        assert_eq!(format_thousands(1_234_567), "1,234,567");
    }
}
