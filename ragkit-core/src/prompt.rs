//! Prompt templates and fixed fallback strings.
//!
//! Templates interpolate `{question}` and `{context}` placeholders. They are
//! parsed into segments at construction time, so rendering is a single pass
//! that never re-scans substituted text: a chunk whose content happens to
//! contain a placeholder marker is emitted literally.

use crate::error::{RagError, Result};

/// Shown when the completion model returns blank output.
pub const EMPTY_COMPLETION_FALLBACK: &str =
    "I apologize, but I couldn't generate a proper response. Please try asking your question again.";

/// The user-facing failure message, embedding the error detail.
pub fn processing_failure_message(error: &str) -> String {
    format!(
        "I'm sorry, I'm having trouble processing your question right now. \
         Please try again later. Error: {error}"
    )
}

const DEFAULT_GROUNDED: &str = "\
You are a helpful assistant answering questions about uploaded documents.

Use the following context to answer the question. If the context does not \
contain the answer, say so instead of guessing.

Context:
{context}

Question: {question}

Answer:";

const DEFAULT_UNGROUNDED: &str = "\
You are a helpful assistant.

Answer the following question concisely and accurately.

Question: {question}

Answer:";

#[derive(Debug, Clone, PartialEq)]
enum Segment {
    Literal(String),
    Question,
    Context,
}

/// A parsed prompt template.
#[derive(Debug, Clone)]
pub struct PromptTemplate {
    segments: Vec<Segment>,
}

impl PromptTemplate {
    /// Parse a template into segments. Unrecognized brace sequences are kept
    /// as literal text; only `{question}` and `{context}` are placeholders.
    fn parse(template: &str) -> Self {
        let mut segments = Vec::new();
        let mut literal = String::new();
        let mut rest = template;

        while !rest.is_empty() {
            if let Some(stripped) = rest.strip_prefix("{question}") {
                if !literal.is_empty() {
                    segments.push(Segment::Literal(std::mem::take(&mut literal)));
                }
                segments.push(Segment::Question);
                rest = stripped;
            } else if let Some(stripped) = rest.strip_prefix("{context}") {
                if !literal.is_empty() {
                    segments.push(Segment::Literal(std::mem::take(&mut literal)));
                }
                segments.push(Segment::Context);
                rest = stripped;
            } else {
                let mut chars = rest.chars();
                if let Some(c) = chars.next() {
                    literal.push(c);
                }
                rest = chars.as_str();
            }
        }
        if !literal.is_empty() {
            segments.push(Segment::Literal(literal));
        }

        Self { segments }
    }

    fn has_question(&self) -> bool {
        self.segments.contains(&Segment::Question)
    }

    fn has_context(&self) -> bool {
        self.segments.contains(&Segment::Context)
    }

    fn render(&self, question: &str, context: &str) -> String {
        let mut out = String::new();
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => out.push_str(text),
                Segment::Question => out.push_str(question),
                Segment::Context => out.push_str(context),
            }
        }
        out
    }
}

/// The pair of templates the pipeline chooses between: grounded when
/// retrieval produced context, ungrounded otherwise.
#[derive(Debug, Clone)]
pub struct PromptTemplates {
    grounded: PromptTemplate,
    ungrounded: PromptTemplate,
}

impl PromptTemplates {
    /// Build templates from custom text, validating their placeholders.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::TemplateError`] if the grounded template lacks a
    /// `{question}` or `{context}` placeholder, or the ungrounded template
    /// lacks `{question}`.
    pub fn new(grounded: &str, ungrounded: &str) -> Result<Self> {
        let grounded = PromptTemplate::parse(grounded);
        if !grounded.has_question() || !grounded.has_context() {
            return Err(RagError::TemplateError(
                "grounded template must contain {question} and {context}".to_string(),
            ));
        }
        let ungrounded = PromptTemplate::parse(ungrounded);
        if !ungrounded.has_question() {
            return Err(RagError::TemplateError(
                "ungrounded template must contain {question}".to_string(),
            ));
        }
        Ok(Self { grounded, ungrounded })
    }

    /// Render the grounded template with question and retrieved context.
    pub fn render_grounded(&self, question: &str, context: &str) -> String {
        self.grounded.render(question, context)
    }

    /// Render the ungrounded template with the question alone.
    pub fn render_ungrounded(&self, question: &str) -> String {
        self.ungrounded.render(question, "")
    }
}

impl Default for PromptTemplates {
    fn default() -> Self {
        Self {
            grounded: PromptTemplate::parse(DEFAULT_GROUNDED),
            ungrounded: PromptTemplate::parse(DEFAULT_UNGROUNDED),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_templates_interpolate_both_fields() {
        let templates = PromptTemplates::default();
        let prompt = templates.render_grounded("What is a widget?", "[Document 1 - a.txt]\nWidgets.");
        assert!(prompt.contains("Question: What is a widget?"));
        assert!(prompt.contains("[Document 1 - a.txt]\nWidgets."));
    }

    #[test]
    fn ungrounded_template_has_no_context_section() {
        let templates = PromptTemplates::default();
        let prompt = templates.render_ungrounded("What is a widget?");
        assert!(prompt.contains("Question: What is a widget?"));
        assert!(!prompt.contains("Context:"));
    }

    #[test]
    fn rejects_grounded_template_without_context() {
        let err = PromptTemplates::new("Q: {question}", "Q: {question}").unwrap_err();
        assert!(matches!(err, RagError::TemplateError(_)));
    }

    #[test]
    fn rejects_ungrounded_template_without_question() {
        let err =
            PromptTemplates::new("{context} {question}", "no placeholders here").unwrap_err();
        assert!(matches!(err, RagError::TemplateError(_)));
    }

    #[test]
    fn placeholder_markers_in_values_stay_literal() {
        let templates = PromptTemplates::new("{context}|{question}", "{question}").unwrap();
        let prompt = templates.render_grounded("{context}", "{question}");
        assert_eq!(prompt, "{question}|{context}");
    }

    #[test]
    fn unknown_braces_render_literally() {
        let templates = PromptTemplates::new("{other} {context} {question}", "{question}").unwrap();
        let prompt = templates.render_grounded("q", "c");
        assert_eq!(prompt, "{other} c q");
    }
}
