//! Tokenizers: the first analysis stage, splitting raw text into words.
//!
//! Both tokenizers number their words consecutively from zero, so a field's
//! positions depend only on the tokenizer and never on the filters after it.
//!
//! # Examples
//!
//! ```
//! use spanmark::analysis::tokenizer::{RegexTokenizer, Tokenizer, WhitespaceTokenizer};
//!
//! let words: Vec<_> = WhitespaceTokenizer.tokenize("red  fox").unwrap().collect();
//! assert_eq!(words[1].text, "fox");
//! assert_eq!(words[1].position, 1);
//!
//! // One token per pair of words: positions no longer follow the words.
//! let pairs = RegexTokenizer::new(r"\S+\s+\S+|\S+").unwrap();
//! let tokens: Vec<_> = pairs.tokenize("the red fox").unwrap().collect();
//! assert_eq!(tokens[0].text, "the red");
//! assert_eq!(tokens[1].position, 1);
//! ```

use std::ops::Range;

use regex::Regex;

use crate::analysis::token::{Token, TokenStream, to_position};
use crate::error::{Result, SpanmarkError};

/// Splits text into positioned tokens.
pub trait Tokenizer: Send + Sync {
    /// Tokenize the given text into a stream of tokens.
    fn tokenize(&self, text: &str) -> Result<TokenStream>;

    /// Short name used in `Debug` output.
    fn name(&self) -> &'static str;
}

/// Number the byte ranges of `text` as consecutive tokens.
fn number_words<I>(text: &str, words: I) -> Result<TokenStream>
where
    I: IntoIterator<Item = Range<usize>>,
{
    let tokens = words
        .into_iter()
        .filter(|range| !range.is_empty())
        .enumerate()
        .map(|(ordinal, range)| -> Result<Token> {
            Ok(Token::new(&text[range], to_position(ordinal)?))
        })
        .collect::<Result<Vec<_>>>()?;
    Ok(Box::new(tokens.into_iter()))
}

/// Splits on Unicode whitespace; every word takes exactly one position.
#[derive(Clone, Copy, Debug, Default)]
pub struct WhitespaceTokenizer;

impl Tokenizer for WhitespaceTokenizer {
    fn tokenize(&self, text: &str) -> Result<TokenStream> {
        let mut words = Vec::new();
        let mut start = None;

        for (offset, ch) in text.char_indices() {
            match (ch.is_whitespace(), start) {
                (true, Some(word_start)) => {
                    words.push(word_start..offset);
                    start = None;
                }
                (false, None) => start = Some(offset),
                _ => {}
            }
        }
        if let Some(word_start) = start {
            words.push(word_start..text.len());
        }

        number_words(text, words)
    }

    fn name(&self) -> &'static str {
        "whitespace"
    }
}

/// Emits every non-empty match of a pattern as one token.
#[derive(Clone, Debug)]
pub struct RegexTokenizer {
    pattern: Regex,
}

impl RegexTokenizer {
    /// Tokenize with a custom pattern.
    pub fn new(pattern: &str) -> Result<Self> {
        let pattern = Regex::new(pattern)
            .map_err(|e| SpanmarkError::analysis(format!("invalid token pattern: {e}")))?;
        Ok(RegexTokenizer { pattern })
    }

    /// Runs of word characters; punctuation never takes a position.
    pub fn words() -> Result<Self> {
        Self::new(r"\w+")
    }
}

impl Tokenizer for RegexTokenizer {
    fn tokenize(&self, text: &str) -> Result<TokenStream> {
        number_words(text, self.pattern.find_iter(text).map(|m| m.range()))
    }

    fn name(&self) -> &'static str {
        "regex"
    }
}
