//! Analyzers: a tokenizer followed by a chain of token filters.
//!
//! The same analyzer must index a field and re-tokenize it for annotation.
//! Any other analyzer produces positions that drift away from the indexed
//! intervals, and annotation of the document fails as misaligned.
//!
//! # Examples
//!
//! ```
//! use spanmark::analysis::analyzer::{Analyzer, StandardAnalyzer};
//!
//! let analyzer = StandardAnalyzer::new().unwrap();
//! let tokens: Vec<_> = analyzer.analyze("The Quick fox").unwrap().collect();
//!
//! assert_eq!(tokens[0].text, "quick");
//! assert_eq!(tokens[0].position, 1);
//! ```

use std::fmt;
use std::sync::Arc;

use crate::analysis::token::TokenStream;
use crate::analysis::token_filter::{Filter, LowercaseFilter, StopFilter, StopMode};
use crate::analysis::tokenizer::{RegexTokenizer, Tokenizer, WhitespaceTokenizer};
use crate::error::Result;

/// Turns field text into positioned tokens.
///
/// `Send + Sync` so one analyzer can serve the index writer and any number
/// of position cursors.
pub trait Analyzer: Send + Sync {
    /// Analyze the given text and return a stream of tokens.
    fn analyze(&self, text: &str) -> Result<TokenStream>;

    /// Short name used in `Debug` output.
    fn name(&self) -> &'static str;
}

/// Tokenization only, words keep their text.
#[derive(Clone)]
pub struct SimpleAnalyzer {
    tokenizer: Arc<dyn Tokenizer>,
}

impl SimpleAnalyzer {
    /// Analyze with `tokenizer` alone.
    pub fn new(tokenizer: Arc<dyn Tokenizer>) -> Self {
        SimpleAnalyzer { tokenizer }
    }

    /// Whitespace words, the index default.
    pub fn whitespace() -> Self {
        Self::new(Arc::new(WhitespaceTokenizer))
    }
}

impl Default for SimpleAnalyzer {
    fn default() -> Self {
        Self::whitespace()
    }
}

impl Analyzer for SimpleAnalyzer {
    fn analyze(&self, text: &str) -> Result<TokenStream> {
        self.tokenizer.tokenize(text)
    }

    fn name(&self) -> &'static str {
        "simple"
    }
}

impl fmt::Debug for SimpleAnalyzer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SimpleAnalyzer")
            .field("tokenizer", &self.tokenizer.name())
            .finish()
    }
}

/// Word characters, lowercased, with English stop words filtered.
///
/// Stop words either disappear from the stream or stay marked as stopped;
/// in both cases they are never indexed and their positions stay empty.
pub struct StandardAnalyzer {
    tokenizer: RegexTokenizer,
    filters: Vec<Box<dyn Filter>>,
}

impl StandardAnalyzer {
    /// Drop stop words from the stream.
    pub fn new() -> Result<Self> {
        Self::with_stop_mode(StopMode::Remove)
    }

    /// Keep stop words in the stream, so annotated text still shows them.
    pub fn marking_stop_words() -> Result<Self> {
        Self::with_stop_mode(StopMode::Mark)
    }

    fn with_stop_mode(mode: StopMode) -> Result<Self> {
        Ok(StandardAnalyzer {
            tokenizer: RegexTokenizer::words()?,
            filters: vec![
                Box::new(LowercaseFilter),
                Box::new(StopFilter::english(mode)),
            ],
        })
    }
}

impl Analyzer for StandardAnalyzer {
    fn analyze(&self, text: &str) -> Result<TokenStream> {
        let tokens: Vec<_> = self
            .tokenizer
            .tokenize(text)?
            .filter_map(|token| {
                self.filters
                    .iter()
                    .try_fold(token, |token, filter| filter.apply(token))
            })
            .collect();
        Ok(Box::new(tokens.into_iter()))
    }

    fn name(&self) -> &'static str {
        "standard"
    }
}

impl fmt::Debug for StandardAnalyzer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let filters: Vec<&str> = self.filters.iter().map(|filter| filter.name()).collect();
        f.debug_struct("StandardAnalyzer")
            .field("tokenizer", &self.tokenizer.name())
            .field("filters", &filters)
            .finish()
    }
}
