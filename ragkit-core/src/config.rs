//! Configuration for the retrieval engine and conversation pipeline.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{RagError, Result};

/// Configuration parameters for retrieval and conversation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RagConfig {
    /// Maximum chunk size in characters.
    pub chunk_size: usize,
    /// Number of overlapping characters between consecutive chunks.
    pub chunk_overlap: usize,
    /// Number of top results to return from vector search.
    pub top_k: usize,
    /// Maximum distance for a result to count as relevant. Results at or
    /// above this distance are filtered out. The default of 2.0 is
    /// calibrated against squared L2 distance over the paired embedding
    /// model; switching models requires recalibration.
    pub distance_threshold: f32,
    /// Maximum accepted question length in characters.
    pub max_question_chars: usize,
    /// Per-attempt timeout for completion calls, in seconds.
    pub completion_timeout_secs: u64,
    /// Number of completion attempts before giving up.
    pub completion_max_retries: u32,
}

impl Default for RagConfig {
    fn default() -> Self {
        Self {
            chunk_size: 1000,
            chunk_overlap: 100,
            top_k: 6,
            distance_threshold: 2.0,
            max_question_chars: 10_000,
            completion_timeout_secs: 60,
            completion_max_retries: 3,
        }
    }
}

impl RagConfig {
    /// Create a new builder for constructing a [`RagConfig`].
    pub fn builder() -> RagConfigBuilder {
        RagConfigBuilder::default()
    }

    /// The per-attempt completion timeout as a [`Duration`].
    pub fn completion_timeout(&self) -> Duration {
        Duration::from_secs(self.completion_timeout_secs)
    }
}

/// Builder for constructing a validated [`RagConfig`].
#[derive(Debug, Clone, Default)]
pub struct RagConfigBuilder {
    config: RagConfig,
}

impl RagConfigBuilder {
    /// Set the maximum chunk size in characters.
    pub fn chunk_size(mut self, size: usize) -> Self {
        self.config.chunk_size = size;
        self
    }

    /// Set the overlap between consecutive chunks in characters.
    pub fn chunk_overlap(mut self, overlap: usize) -> Self {
        self.config.chunk_overlap = overlap;
        self
    }

    /// Set the number of top results to return from vector search.
    pub fn top_k(mut self, k: usize) -> Self {
        self.config.top_k = k;
        self
    }

    /// Set the maximum distance for a result to count as relevant.
    pub fn distance_threshold(mut self, threshold: f32) -> Self {
        self.config.distance_threshold = threshold;
        self
    }

    /// Set the maximum accepted question length in characters.
    pub fn max_question_chars(mut self, max: usize) -> Self {
        self.config.max_question_chars = max;
        self
    }

    /// Set the per-attempt timeout for completion calls, in seconds.
    pub fn completion_timeout_secs(mut self, secs: u64) -> Self {
        self.config.completion_timeout_secs = secs;
        self
    }

    /// Set the number of completion attempts before giving up.
    pub fn completion_max_retries(mut self, retries: u32) -> Self {
        self.config.completion_max_retries = retries;
        self
    }

    /// Build the [`RagConfig`], validating that parameters are consistent.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::ConfigError`] if:
    /// - `chunk_overlap >= chunk_size`
    /// - `top_k == 0`
    /// - `distance_threshold` is negative or not finite
    /// - `max_question_chars == 0`
    /// - `completion_max_retries == 0`
    pub fn build(self) -> Result<RagConfig> {
        if self.config.chunk_overlap >= self.config.chunk_size {
            return Err(RagError::ConfigError(format!(
                "chunk_overlap ({}) must be less than chunk_size ({})",
                self.config.chunk_overlap, self.config.chunk_size
            )));
        }
        if self.config.top_k == 0 {
            return Err(RagError::ConfigError("top_k must be greater than zero".to_string()));
        }
        if !self.config.distance_threshold.is_finite() || self.config.distance_threshold < 0.0 {
            return Err(RagError::ConfigError(format!(
                "distance_threshold ({}) must be a non-negative finite number",
                self.config.distance_threshold
            )));
        }
        if self.config.max_question_chars == 0 {
            return Err(RagError::ConfigError(
                "max_question_chars must be greater than zero".to_string(),
            ));
        }
        if self.config.completion_max_retries == 0 {
            return Err(RagError::ConfigError(
                "completion_max_retries must be greater than zero".to_string(),
            ));
        }
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_passes_validation() {
        let config = RagConfig::builder().build().unwrap();
        assert_eq!(config, RagConfig::default());
    }

    #[test]
    fn rejects_overlap_not_below_size() {
        let err = RagConfig::builder().chunk_size(100).chunk_overlap(100).build().unwrap_err();
        assert!(matches!(err, RagError::ConfigError(_)));
    }

    #[test]
    fn rejects_zero_top_k() {
        let err = RagConfig::builder().top_k(0).build().unwrap_err();
        assert!(matches!(err, RagError::ConfigError(_)));
    }

    #[test]
    fn rejects_negative_threshold() {
        let err = RagConfig::builder().distance_threshold(-0.5).build().unwrap_err();
        assert!(matches!(err, RagError::ConfigError(_)));
    }
}
