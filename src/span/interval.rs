//! Positions, match intervals and the terminal-aware cursor results.
//!
//! Terminal states are explicit enum variants rather than reserved integers,
//! so a caller cannot compare a real position against an end-of-stream marker
//! by accident.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SpanmarkError};

/// Identifier of a document in the index.
pub type DocId = u64;

/// Ordinal slot of a token within a tokenized field.
pub type Position = u32;

/// Result of advancing a [`DocumentCursor`](super::cursor::DocumentCursor).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NextDoc {
    /// The next matching document.
    Doc(DocId),
    /// The cursor is exhausted.
    NoMoreDocs,
}

/// A position reported by a span cursor, or the end of its intervals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SpanPosition {
    /// A real token position.
    At(Position),
    /// No further intervals in this document.
    NoMore,
}

impl SpanPosition {
    /// Whether this is the terminal value.
    pub fn is_terminal(self) -> bool {
        matches!(self, SpanPosition::NoMore)
    }

    /// The position, if not terminal.
    pub fn position(self) -> Option<Position> {
        match self {
            SpanPosition::At(position) => Some(position),
            SpanPosition::NoMore => None,
        }
    }
}

impl fmt::Display for SpanPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SpanPosition::At(position) => write!(f, "{position}"),
            SpanPosition::NoMore => write!(f, "no-more"),
        }
    }
}

/// A matched range of token positions; `end` is exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct MatchInterval {
    /// Start position (inclusive)
    pub start: Position,
    /// End position (exclusive)
    pub end: Position,
}

impl MatchInterval {
    /// Create an interval, rejecting empty or inverted ranges.
    pub fn try_new(start: Position, end: Position) -> Result<Self> {
        if start >= end {
            return Err(SpanmarkError::protocol(format!(
                "interval end {end} does not follow start {start}"
            )));
        }
        Ok(MatchInterval { start, end })
    }

    /// Interval covering exactly one token.
    ///
    /// The last representable position has no exclusive end and is rejected.
    pub fn single(position: Position) -> Result<Self> {
        let end = position.checked_add(1).ok_or_else(|| {
            SpanmarkError::index(format!("position {position} has no following position"))
        })?;
        Ok(MatchInterval {
            start: position,
            end,
        })
    }

    /// Get the length of this interval.
    pub fn length(&self) -> u32 {
        self.end.saturating_sub(self.start)
    }

    /// Check if this interval overlaps with another interval.
    pub fn overlaps(&self, other: &MatchInterval) -> bool {
        self.start < other.end && other.start < self.end
    }

    /// Check if this interval contains another interval.
    pub fn contains(&self, other: &MatchInterval) -> bool {
        self.start <= other.start && other.end <= self.end
    }
}

impl fmt::Display for MatchInterval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {})", self.start, self.end)
    }
}
