//! Positioned tokens.
//!
//! A [`Token`] is what an analyzer hands to the index writer and, when a
//! stored field is re-tokenized for annotation, to a
//! [`PositionCursor`](crate::span::cursor::PositionCursor). Its `position` is
//! the slot recorded in the postings. Filters that drop a token leave that
//! slot empty instead of renumbering the rest.

use crate::error::{Result, SpanmarkError};
use crate::span::interval::Position;

/// A word of a field together with its position.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Token {
    /// Text written to the index and to annotated output.
    pub text: String,

    /// Ordinal slot of the token in its field.
    pub position: Position,

    /// Kept in the stream for rendering but never indexed.
    pub stopped: bool,
}

impl Token {
    /// Create an indexable token.
    pub fn new<S: Into<String>>(text: S, position: Position) -> Self {
        Token {
            text: text.into(),
            position,
            stopped: false,
        }
    }

    /// Mark this token so the writer skips it.
    pub fn mark_stopped(mut self) -> Self {
        self.stopped = true;
        self
    }

    /// Whether the writer should index this token.
    pub fn is_indexable(&self) -> bool {
        !self.stopped && !self.text.is_empty()
    }
}

/// The boxed iterator an analyzer returns.
pub type TokenStream = Box<dyn Iterator<Item = Token>>;

/// Turn the `ordinal`-th word of a field into its position.
pub(crate) fn to_position(ordinal: usize) -> Result<Position> {
    Position::try_from(ordinal).map_err(|_| {
        SpanmarkError::analysis(format!(
            "word {ordinal} of the field exceeds the position range"
        ))
    })
}
