//! Span-match annotation and frequency filtering.
//!
//! The modules build on each other:
//!
//! - [`interval`]: positions, match intervals and terminal-aware results.
//! - [`cursor`]: the document, span and position cursor contracts.
//! - [`position`]: a position cursor that re-analyzes stored text.
//! - [`evaluation`]: cursors produced by evaluating a span query on a segment.
//! - [`annotator`]: inline marking of match intervals.
//! - [`frequency`]: "at least N intervals" document filtering.

pub mod annotator;
pub mod cursor;
pub mod evaluation;
pub mod frequency;
pub mod interval;
pub mod position;
