//! Configuration for the positional index.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::analysis::analyzer::{Analyzer, SimpleAnalyzer};
use crate::error::{Result, SpanmarkError};

/// Configuration of an [`Index`](super::Index).
///
/// # Example
///
/// ```
/// use spanmark::index::config::IndexConfig;
///
/// let config = IndexConfig::from_json(r#"{ "max_buffered_docs": 2 }"#).unwrap();
/// assert_eq!(config.max_buffered_docs, 2);
/// assert_eq!(config.analyzer.name(), "simple");
/// ```
#[derive(Clone, Serialize, Deserialize)]
pub struct IndexConfig {
    /// Number of buffered documents that triggers sealing a new segment.
    #[serde(default = "default_max_buffered_docs")]
    pub max_buffered_docs: usize,

    /// Analyzer for text fields.
    ///
    /// Defaults to whitespace tokenization without filters.
    #[serde(skip)]
    #[serde(default = "default_analyzer")]
    pub analyzer: Arc<dyn Analyzer>,
}

fn default_max_buffered_docs() -> usize {
    1000
}

fn default_analyzer() -> Arc<dyn Analyzer> {
    Arc::new(SimpleAnalyzer::whitespace())
}

impl IndexConfig {
    /// Parse a configuration from JSON; the analyzer is always the default.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: IndexConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Replace the analyzer.
    pub fn with_analyzer(mut self, analyzer: Arc<dyn Analyzer>) -> Self {
        self.analyzer = analyzer;
        self
    }

    /// Set the segment flush threshold.
    pub fn with_max_buffered_docs(mut self, max_buffered_docs: usize) -> Self {
        self.max_buffered_docs = max_buffered_docs;
        self
    }

    /// Check the configuration for unusable values.
    pub fn validate(&self) -> Result<()> {
        if self.max_buffered_docs == 0 {
            return Err(SpanmarkError::invalid_config(
                "max_buffered_docs must be at least 1",
            ));
        }
        Ok(())
    }
}

impl Default for IndexConfig {
    fn default() -> Self {
        IndexConfig {
            max_buffered_docs: default_max_buffered_docs(),
            analyzer: default_analyzer(),
        }
    }
}

impl std::fmt::Debug for IndexConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IndexConfig")
            .field("max_buffered_docs", &self.max_buffered_docs)
            .field("analyzer", &self.analyzer.name())
            .finish()
    }
}
