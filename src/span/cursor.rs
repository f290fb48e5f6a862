//! Forward-only cursors over documents, match intervals and tokens.
//!
//! Three cursors cooperate while a span query is annotated or counted:
//!
//! - [`DocumentCursor`] yields the strictly increasing ids of matching documents.
//! - [`SpanCursor`] yields one document's match intervals, start first, end on demand.
//! - [`PositionCursor`] re-tokenizes one document field and yields its tokens.
//!
//! Every cursor has an explicit terminal value, and once it has been returned
//! every later call returns it again.

use std::fmt::Debug;

use ahash::AHashMap;

use crate::analysis::token::{Token, TokenStream};
use crate::error::{Result, SpanmarkError};
use crate::span::interval::{DocId, MatchInterval, NextDoc, Position, SpanPosition};

/// Result of advancing a [`PositionCursor`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NextToken {
    /// The next token of the field.
    Token(Token),
    /// The field has no more tokens.
    Exhausted,
}

/// Iterates the ascending ids of documents that satisfy a span query.
pub trait DocumentCursor: Debug {
    /// Advance to the next matching document.
    ///
    /// May evaluate the query against postings, so it can fail with an index error.
    fn next_document(&mut self) -> Result<NextDoc>;
}

/// Iterates the match intervals of a single document.
///
/// Each successful [`next_interval_start`](SpanCursor::next_interval_start)
/// may be followed by exactly one
/// [`current_interval_end`](SpanCursor::current_interval_end) read. Skipping the
/// read is allowed and simply drops the interval's end.
pub trait SpanCursor: Debug {
    /// Advance to the next interval and return its start.
    fn next_interval_start(&mut self) -> Result<SpanPosition>;

    /// Read the exclusive end of the interval the cursor is positioned on.
    fn current_interval_end(&mut self) -> Result<Position>;
}

/// Re-tokenizes one field of one document.
pub trait PositionCursor: Debug {
    /// Scope the cursor to a document field, discarding any previous scope.
    fn reset(&mut self, doc_id: DocId, field: &str) -> Result<()>;

    /// Return the next token of the current scope.
    fn advance(&mut self) -> Result<NextToken>;
}

/// Produces a fresh [`SpanCursor`] for each selected document.
pub trait SpanCursorFactory {
    /// Open the span cursor for `doc_id`.
    fn span_cursor(&self, doc_id: DocId) -> Result<Box<dyn SpanCursor>>;
}

impl<F> SpanCursorFactory for F
where
    F: Fn(DocId) -> Result<Box<dyn SpanCursor>>,
{
    fn span_cursor(&self, doc_id: DocId) -> Result<Box<dyn SpanCursor>> {
        self(doc_id)
    }
}

/// A document cursor over a precomputed id list.
#[derive(Debug, Clone)]
pub struct VecDocumentCursor {
    doc_ids: Vec<DocId>,
    next: usize,
}

impl VecDocumentCursor {
    /// Create a cursor; ids are sorted and deduplicated.
    pub fn new(mut doc_ids: Vec<DocId>) -> Self {
        doc_ids.sort_unstable();
        doc_ids.dedup();
        VecDocumentCursor { doc_ids, next: 0 }
    }
}

impl DocumentCursor for VecDocumentCursor {
    fn next_document(&mut self) -> Result<NextDoc> {
        match self.doc_ids.get(self.next) {
            Some(&doc_id) => {
                self.next += 1;
                Ok(NextDoc::Doc(doc_id))
            }
            None => Ok(NextDoc::NoMoreDocs),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum IntervalState {
    Unpositioned,
    Positioned { index: usize, end_read: bool },
    Exhausted,
}

/// A span cursor over one document's precomputed intervals.
#[derive(Debug, Clone)]
pub struct VecSpanCursor {
    intervals: Vec<MatchInterval>,
    state: IntervalState,
}

impl VecSpanCursor {
    /// Create a cursor; intervals are ordered by `(start, end)`.
    pub fn new(mut intervals: Vec<MatchInterval>) -> Self {
        intervals.sort_unstable();
        VecSpanCursor {
            intervals,
            state: IntervalState::Unpositioned,
        }
    }

    /// A cursor that is terminal from the first call.
    pub fn empty() -> Self {
        Self::new(Vec::new())
    }

    /// Number of intervals the cursor will yield in total.
    pub fn len(&self) -> usize {
        self.intervals.len()
    }

    /// Whether the cursor holds no intervals.
    pub fn is_empty(&self) -> bool {
        self.intervals.is_empty()
    }
}

impl SpanCursor for VecSpanCursor {
    fn next_interval_start(&mut self) -> Result<SpanPosition> {
        let index = match self.state {
            IntervalState::Unpositioned => 0,
            IntervalState::Positioned { index, .. } => index + 1,
            IntervalState::Exhausted => return Ok(SpanPosition::NoMore),
        };

        match self.intervals.get(index) {
            Some(interval) => {
                self.state = IntervalState::Positioned {
                    index,
                    end_read: false,
                };
                Ok(SpanPosition::At(interval.start))
            }
            None => {
                self.state = IntervalState::Exhausted;
                Ok(SpanPosition::NoMore)
            }
        }
    }

    fn current_interval_end(&mut self) -> Result<Position> {
        match self.state {
            IntervalState::Positioned {
                index,
                end_read: false,
            } => {
                self.state = IntervalState::Positioned {
                    index,
                    end_read: true,
                };
                Ok(self.intervals[index].end)
            }
            IntervalState::Positioned { end_read: true, .. } => Err(SpanmarkError::protocol(
                "interval end already read for the current interval",
            )),
            IntervalState::Unpositioned => Err(SpanmarkError::protocol(
                "interval end read before the first interval start",
            )),
            IntervalState::Exhausted => Err(SpanmarkError::protocol(
                "interval end read after the cursor was exhausted",
            )),
        }
    }
}

/// The token stream of one `reset` scope, checked for increasing positions.
pub(crate) struct TokenScope {
    doc_id: DocId,
    tokens: Option<TokenStream>,
    last_position: Option<Position>,
}

impl TokenScope {
    pub(crate) fn new(doc_id: DocId, tokens: TokenStream) -> Self {
        TokenScope {
            doc_id,
            tokens: Some(tokens),
            last_position: None,
        }
    }

    pub(crate) fn next_token(&mut self) -> Result<NextToken> {
        let Some(tokens) = self.tokens.as_mut() else {
            return Ok(NextToken::Exhausted);
        };

        match tokens.next() {
            Some(token) => {
                if let Some(last) = self.last_position
                    && token.position <= last
                {
                    return Err(SpanmarkError::protocol(format!(
                        "token position {} does not follow {} in document {}",
                        token.position, last, self.doc_id
                    )));
                }
                self.last_position = Some(token.position);
                Ok(NextToken::Token(token))
            }
            None => {
                // Drop the stream so exhaustion is sticky.
                self.tokens = None;
                Ok(NextToken::Exhausted)
            }
        }
    }
}

impl Debug for TokenScope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenScope")
            .field("doc_id", &self.doc_id)
            .field("exhausted", &self.tokens.is_none())
            .field("last_position", &self.last_position)
            .finish()
    }
}

/// A position cursor over tokens registered per document field.
#[derive(Debug, Default)]
pub struct VecPositionCursor {
    fields: AHashMap<(DocId, String), Vec<Token>>,
    scope: Option<TokenScope>,
}

impl VecPositionCursor {
    /// Create an empty cursor.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the tokens of one document field.
    pub fn insert<S: Into<String>>(&mut self, doc_id: DocId, field: S, tokens: Vec<Token>) {
        self.fields.insert((doc_id, field.into()), tokens);
    }

    /// Builder-style variant of [`insert`](Self::insert).
    pub fn with_tokens<S: Into<String>>(mut self, doc_id: DocId, field: S, tokens: Vec<Token>) -> Self {
        self.insert(doc_id, field, tokens);
        self
    }
}

impl PositionCursor for VecPositionCursor {
    fn reset(&mut self, doc_id: DocId, field: &str) -> Result<()> {
        let tokens = self
            .fields
            .get(&(doc_id, field.to_string()))
            .cloned()
            .ok_or_else(|| {
                SpanmarkError::field(format!("no tokens for field '{field}' of document {doc_id}"))
            })?;
        self.scope = Some(TokenScope::new(doc_id, Box::new(tokens.into_iter())));
        Ok(())
    }

    fn advance(&mut self) -> Result<NextToken> {
        match self.scope.as_mut() {
            Some(scope) => scope.next_token(),
            None => Err(SpanmarkError::protocol("position cursor advanced before reset")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn interval(start: Position, end: Position) -> MatchInterval {
        MatchInterval::try_new(start, end).unwrap()
    }

    #[test]
    fn test_document_cursor_sorted_and_terminal() {
        let mut cursor = VecDocumentCursor::new(vec![4, 1, 4, 2]);

        assert_eq!(cursor.next_document().unwrap(), NextDoc::Doc(1));
        assert_eq!(cursor.next_document().unwrap(), NextDoc::Doc(2));
        assert_eq!(cursor.next_document().unwrap(), NextDoc::Doc(4));
        for _ in 0..3 {
            assert_eq!(cursor.next_document().unwrap(), NextDoc::NoMoreDocs);
        }
    }

    #[test]
    fn test_span_cursor_order_and_terminal() {
        let mut cursor = VecSpanCursor::new(vec![interval(5, 7), interval(1, 4)]);

        assert_eq!(cursor.next_interval_start().unwrap(), SpanPosition::At(1));
        assert_eq!(cursor.current_interval_end().unwrap(), 4);
        assert_eq!(cursor.next_interval_start().unwrap(), SpanPosition::At(5));
        assert_eq!(cursor.current_interval_end().unwrap(), 7);
        for _ in 0..3 {
            assert_eq!(cursor.next_interval_start().unwrap(), SpanPosition::NoMore);
        }
    }

    #[test]
    fn test_span_cursor_skip_is_allowed() {
        let mut cursor = VecSpanCursor::new(vec![interval(0, 1), interval(2, 3)]);

        assert_eq!(cursor.next_interval_start().unwrap(), SpanPosition::At(0));
        assert_eq!(cursor.next_interval_start().unwrap(), SpanPosition::At(2));
        assert_eq!(cursor.current_interval_end().unwrap(), 3);
    }

    #[test]
    fn test_span_cursor_protocol_violations() {
        let mut cursor = VecSpanCursor::new(vec![interval(0, 2)]);
        assert!(matches!(
            cursor.current_interval_end(),
            Err(SpanmarkError::ProtocolViolation(_))
        ));

        cursor.next_interval_start().unwrap();
        cursor.current_interval_end().unwrap();
        assert!(matches!(
            cursor.current_interval_end(),
            Err(SpanmarkError::ProtocolViolation(_))
        ));

        assert_eq!(cursor.next_interval_start().unwrap(), SpanPosition::NoMore);
        assert!(matches!(
            cursor.current_interval_end(),
            Err(SpanmarkError::ProtocolViolation(_))
        ));
    }

    #[test]
    fn test_empty_span_cursor() {
        let mut cursor = VecSpanCursor::empty();
        assert!(cursor.is_empty());
        assert_eq!(cursor.next_interval_start().unwrap(), SpanPosition::NoMore);
        assert_eq!(cursor.next_interval_start().unwrap(), SpanPosition::NoMore);
    }

    #[test]
    fn test_position_cursor() {
        let mut cursor = VecPositionCursor::new().with_tokens(
            0,
            "f",
            vec![Token::new("red", 0), Token::new("fox", 2)],
        );

        assert!(matches!(
            cursor.advance(),
            Err(SpanmarkError::ProtocolViolation(_))
        ));

        cursor.reset(0, "f").unwrap();
        assert_eq!(cursor.advance().unwrap(), NextToken::Token(Token::new("red", 0)));
        assert_eq!(cursor.advance().unwrap(), NextToken::Token(Token::new("fox", 2)));
        assert_eq!(cursor.advance().unwrap(), NextToken::Exhausted);
        assert_eq!(cursor.advance().unwrap(), NextToken::Exhausted);

        assert!(cursor.reset(1, "f").is_err());
    }

    #[test]
    fn test_position_cursor_rejects_repeated_position() {
        let mut cursor = VecPositionCursor::new().with_tokens(
            3,
            "f",
            vec![Token::new("machine", 0), Token::new("ml", 0)],
        );

        cursor.reset(3, "f").unwrap();
        cursor.advance().unwrap();
        assert!(matches!(
            cursor.advance(),
            Err(SpanmarkError::ProtocolViolation(_))
        ));
    }

    #[test]
    fn test_closure_factory() {
        let factory = |doc_id: DocId| -> Result<Box<dyn SpanCursor>> {
            let interval = MatchInterval::single(doc_id as Position)?;
            Ok(Box::new(VecSpanCursor::new(vec![interval])))
        };

        let mut cursor = factory.span_cursor(3).unwrap();
        assert_eq!(cursor.next_interval_start().unwrap(), SpanPosition::At(3));
    }
}
