//! Text analysis: tokenizers, token filters and analyzers.
//!
//! ```text
//! Raw Text → Tokenizer → Filter 1 … Filter N → Token Stream
//! ```
//!
//! Token positions assigned by the tokenizer survive every filter, so the
//! positions stored in the index and the positions seen while re-tokenizing a
//! stored field agree whenever both sides use the same analyzer.

pub mod analyzer;
pub mod token;
pub mod token_filter;
pub mod tokenizer;
