//! Token filters applied after tokenization.
//!
//! A filter sees one token at a time and may rewrite it, mark it stopped or
//! drop it. It never touches `position`, so a dropped word leaves a hole in
//! the position sequence exactly where the word used to be.
//!
//! # Examples
//!
//! ```
//! use spanmark::analysis::token::Token;
//! use spanmark::analysis::token_filter::{Filter, StopFilter, StopMode};
//!
//! let stop = StopFilter::new(["the"], StopMode::Remove);
//! assert_eq!(stop.apply(Token::new("the", 0)), None);
//! assert_eq!(stop.apply(Token::new("fox", 1)), Some(Token::new("fox", 1)));
//! ```

use std::collections::HashSet;

use crate::analysis::token::Token;

/// A per-token transformation.
pub trait Filter: Send + Sync {
    /// Rewrite `token`, or return `None` to drop it.
    fn apply(&self, token: Token) -> Option<Token>;

    /// Short name used in `Debug` output.
    fn name(&self) -> &'static str;
}

/// Lowercases token text.
#[derive(Clone, Copy, Debug, Default)]
pub struct LowercaseFilter;

impl Filter for LowercaseFilter {
    fn apply(&self, mut token: Token) -> Option<Token> {
        token.text = token.text.to_lowercase();
        Some(token)
    }

    fn name(&self) -> &'static str {
        "lowercase"
    }
}

/// Common English words that carry no meaning for span matching.
pub const ENGLISH_STOP_WORDS: &[&str] = &[
    "a", "an", "and", "are", "as", "at", "be", "but", "by", "for", "if", "in", "into", "is", "it",
    "no", "not", "of", "on", "or", "such", "that", "the", "their", "then", "there", "these",
    "they", "this", "to", "was", "will", "with",
];

/// What a [`StopFilter`] does with a stop word.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StopMode {
    /// Drop the word from the stream.
    Remove,
    /// Keep the word for rendering but never index it.
    Mark,
}

/// Removes or marks stop words, leaving their positions unused in the index.
#[derive(Clone, Debug)]
pub struct StopFilter {
    words: HashSet<String>,
    mode: StopMode,
}

impl StopFilter {
    /// Filter the given stop words.
    pub fn new<I, S>(words: I, mode: StopMode) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        StopFilter {
            words: words.into_iter().map(Into::into).collect(),
            mode,
        }
    }

    /// Filter [`ENGLISH_STOP_WORDS`].
    pub fn english(mode: StopMode) -> Self {
        Self::new(ENGLISH_STOP_WORDS.iter().copied(), mode)
    }

    /// Whether `word` is a stop word.
    pub fn is_stop_word(&self, word: &str) -> bool {
        self.words.contains(word)
    }
}

impl Filter for StopFilter {
    fn apply(&self, token: Token) -> Option<Token> {
        if !self.is_stop_word(&token.text) {
            return Some(token);
        }
        match self.mode {
            StopMode::Remove => None,
            StopMode::Mark => Some(token.mark_stopped()),
        }
    }

    fn name(&self) -> &'static str {
        "stop"
    }
}
