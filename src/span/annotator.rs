//! Inline annotation of match intervals.
//!
//! The annotator drains a document's [`PositionCursor`] and its
//! [`SpanCursor`] in lock-step and writes every token back out, wrapping each
//! match interval in open and close markers:
//!
//! ```text
//! the quick brown fox and <red fox> jump over the lazy dog
//! ```
//!
//! Every token, the last included, is followed by the separator.
//!
//! Interval starts arrive in ascending order, but ends do not: a composed
//! query can report nested or overlapping intervals. Every start is therefore
//! paired with its end straight away, and opened intervals wait in a
//! min-ordered queue until the token they end on has been written. Several
//! markers at the same token are concatenated, and closes of one token always
//! precede opens of the next.
//!
//! If a token position skips past a pending open or close, or tokens run out
//! while one is pending, the analyzer that re-tokenized the document does not
//! agree with the index and the document fails with
//! [`SpanmarkError::MisalignedPosition`].

use std::cmp::Reverse;
use std::collections::BinaryHeap;

use serde::{Deserialize, Serialize};
use tracing::{trace, warn};

use crate::error::{Result, SpanmarkError};
use crate::span::cursor::{DocumentCursor, NextToken, PositionCursor, SpanCursor, SpanCursorFactory};
use crate::span::interval::{DocId, NextDoc, Position, SpanPosition};

/// Markers and separator used when rendering annotated text.
///
/// # Example
///
/// ```
/// use spanmark::span::annotator::AnnotationConfig;
///
/// let config = AnnotationConfig::from_json(r#"{ "open_marker": "[[" }"#).unwrap();
/// assert_eq!(config.open_marker, "[[");
/// assert_eq!(config.close_marker, ">");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnnotationConfig {
    /// Written before the first token of an interval.
    pub open_marker: String,
    /// Written after the last token of an interval.
    pub close_marker: String,
    /// Written after every token, including the last one.
    pub separator: String,
}

impl Default for AnnotationConfig {
    fn default() -> Self {
        AnnotationConfig {
            open_marker: "<".to_string(),
            close_marker: ">".to_string(),
            separator: " ".to_string(),
        }
    }
}

impl AnnotationConfig {
    /// Parse a configuration from JSON; missing keys keep their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Set the open marker.
    pub fn with_open_marker<S: Into<String>>(mut self, marker: S) -> Self {
        self.open_marker = marker.into();
        self
    }

    /// Set the close marker.
    pub fn with_close_marker<S: Into<String>>(mut self, marker: S) -> Self {
        self.close_marker = marker.into();
        self
    }

    /// Set the token separator.
    pub fn with_separator<S: Into<String>>(mut self, separator: S) -> Self {
        self.separator = separator.into();
        self
    }
}

/// One document rendered with its match intervals marked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnnotatedDocument {
    /// Document id.
    pub id: DocId,
    /// Annotated token rendering.
    pub text: String,
    /// Number of intervals that were opened and closed.
    pub span_count: usize,
}

/// A document whose annotation was abandoned.
#[derive(Debug)]
pub struct DocumentFailure {
    /// Document id.
    pub doc_id: DocId,
    /// Why annotation failed.
    pub error: SpanmarkError,
}

/// Outcome of annotating every document a query selects.
#[derive(Debug, Default)]
pub struct AnnotationReport {
    /// Successfully annotated documents, in document order.
    pub documents: Vec<AnnotatedDocument>,
    /// Documents skipped because of misaligned positions.
    pub failures: Vec<DocumentFailure>,
}

impl AnnotationReport {
    /// Whether every selected document was annotated.
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }

    /// Total number of intervals across the annotated documents.
    pub fn total_spans(&self) -> usize {
        self.documents.iter().map(|doc| doc.span_count).sum()
    }

    /// Find the annotation of a document.
    pub fn document(&self, doc_id: DocId) -> Option<&AnnotatedDocument> {
        self.documents.iter().find(|doc| doc.id == doc_id)
    }

    /// Move the entries of `other` to the end of this report.
    pub fn append(&mut self, other: &mut AnnotationReport) {
        self.documents.append(&mut other.documents);
        self.failures.append(&mut other.failures);
    }
}

/// Pending markers of one document.
#[derive(Debug)]
struct MarkerState {
    doc_id: DocId,
    /// Start of the next interval to open.
    pending_open: SpanPosition,
    /// End of the interval starting at `pending_open`, read eagerly.
    lookahead_end: Option<Position>,
    /// Ends of intervals opened but not yet closed.
    pending_close: BinaryHeap<Reverse<Position>>,
    span_count: usize,
}

impl MarkerState {
    fn start(doc_id: DocId, spans: &mut dyn SpanCursor) -> Result<Self> {
        let mut state = MarkerState {
            doc_id,
            pending_open: SpanPosition::NoMore,
            lookahead_end: None,
            pending_close: BinaryHeap::new(),
            span_count: 0,
        };
        state.pull(spans, None)?;
        Ok(state)
    }

    /// Fetch the next interval. Never called once the cursor reported `NoMore`.
    fn pull(&mut self, spans: &mut dyn SpanCursor, previous_start: Option<Position>) -> Result<()> {
        match spans.next_interval_start()? {
            SpanPosition::At(start) => {
                if previous_start.is_some_and(|previous| start < previous) {
                    return Err(SpanmarkError::protocol(format!(
                        "interval start {start} precedes the previous start in document {}",
                        self.doc_id
                    )));
                }
                let end = spans.current_interval_end()?;
                if end <= start {
                    return Err(SpanmarkError::protocol(format!(
                        "interval end {end} does not follow start {start} in document {}",
                        self.doc_id
                    )));
                }
                self.pending_open = SpanPosition::At(start);
                self.lookahead_end = Some(end);
            }
            SpanPosition::NoMore => {
                self.pending_open = SpanPosition::NoMore;
                self.lookahead_end = None;
            }
        }
        Ok(())
    }

    fn check_not_passed(&self, position: Position) -> Result<()> {
        if let SpanPosition::At(start) = self.pending_open
            && start < position
        {
            return Err(SpanmarkError::misaligned(
                self.doc_id,
                format!("no token at interval start {start}, next token is at {position}"),
            ));
        }
        if let Some(&Reverse(end)) = self.pending_close.peek()
            && end <= position
        {
            return Err(SpanmarkError::misaligned(
                self.doc_id,
                format!("no token before interval end {end}, next token is at {position}"),
            ));
        }
        Ok(())
    }

    fn check_drained(&self) -> Result<()> {
        if let SpanPosition::At(start) = self.pending_open {
            return Err(SpanmarkError::misaligned(
                self.doc_id,
                format!("tokens exhausted before interval start {start}"),
            ));
        }
        if let Some(&Reverse(end)) = self.pending_close.peek() {
            return Err(SpanmarkError::misaligned(
                self.doc_id,
                format!(
                    "tokens exhausted with {} open intervals, first ending at {end}",
                    self.pending_close.len()
                ),
            ));
        }
        Ok(())
    }
}

/// Marks match intervals inline in re-tokenized document text.
#[derive(Debug, Clone, Default)]
pub struct SpanAnnotator {
    config: AnnotationConfig,
}

impl SpanAnnotator {
    /// Create an annotator with the given markers.
    pub fn new(config: AnnotationConfig) -> Self {
        SpanAnnotator { config }
    }

    /// The markers in use.
    pub fn config(&self) -> &AnnotationConfig {
        &self.config
    }

    /// Annotate one document.
    ///
    /// `spans` must be a fresh cursor for `doc_id` and `positions` must already
    /// be reset to the same document and field.
    pub fn annotate(
        &self,
        doc_id: DocId,
        spans: &mut dyn SpanCursor,
        positions: &mut dyn PositionCursor,
    ) -> Result<AnnotatedDocument> {
        let mut state = MarkerState::start(doc_id, spans)?;
        let mut text = String::new();

        while let NextToken::Token(token) = positions.advance()? {
            let position = token.position;
            state.check_not_passed(position)?;

            while state.pending_open == SpanPosition::At(position) {
                text.push_str(&self.config.open_marker);
                if let Some(end) = state.lookahead_end.take() {
                    state.pending_close.push(Reverse(end));
                }
                state.pull(spans, Some(position))?;
            }

            text.push_str(&token.text);

            while let Some(&Reverse(end)) = state.pending_close.peek() {
                if position.checked_add(1) != Some(end) {
                    break;
                }
                state.pending_close.pop();
                text.push_str(&self.config.close_marker);
                state.span_count += 1;
            }

            text.push_str(&self.config.separator);
        }

        state.check_drained()?;
        trace!("annotated document {} with {} spans", doc_id, state.span_count);

        Ok(AnnotatedDocument {
            id: doc_id,
            text,
            span_count: state.span_count,
        })
    }

    /// Annotate every document of `docs`, re-tokenizing `field` for each one.
    ///
    /// A document with misaligned positions is recorded as a failure and the
    /// scan moves on; every other error ends the scan.
    pub fn annotate_documents(
        &self,
        docs: &mut dyn DocumentCursor,
        factory: &dyn SpanCursorFactory,
        positions: &mut dyn PositionCursor,
        field: &str,
    ) -> Result<AnnotationReport> {
        let mut report = AnnotationReport::default();
        let mut last_doc: Option<DocId> = None;

        while let NextDoc::Doc(doc_id) = docs.next_document()? {
            if last_doc.is_some_and(|last| doc_id <= last) {
                return Err(SpanmarkError::protocol(format!(
                    "document {doc_id} does not follow document {}",
                    last_doc.unwrap_or_default()
                )));
            }
            last_doc = Some(doc_id);

            positions.reset(doc_id, field)?;
            let mut spans = factory.span_cursor(doc_id)?;

            match self.annotate(doc_id, spans.as_mut(), positions) {
                Ok(document) => report.documents.push(document),
                Err(error) if error.is_misalignment() => {
                    warn!("skipping document {}: {}", doc_id, error);
                    report.failures.push(DocumentFailure { doc_id, error });
                }
                Err(error) => return Err(error),
            }
        }

        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::token::Token;
    use crate::span::cursor::{VecDocumentCursor, VecPositionCursor, VecSpanCursor};
    use crate::span::interval::MatchInterval;

    /// Tokens for whitespace-separated text, positions counted from zero.
    fn tokens(text: &str) -> Vec<Token> {
        text.split_whitespace()
            .enumerate()
            .map(|(i, word)| Token::new(word, i as Position))
            .collect()
    }

    fn spans(intervals: &[(Position, Position)]) -> VecSpanCursor {
        VecSpanCursor::new(
            intervals
                .iter()
                .map(|&(start, end)| MatchInterval::try_new(start, end).unwrap())
                .collect(),
        )
    }

    fn annotate(text: &str, intervals: &[(Position, Position)]) -> Result<AnnotatedDocument> {
        let mut positions = VecPositionCursor::new().with_tokens(0, "f", tokens(text));
        positions.reset(0, "f")?;
        SpanAnnotator::default().annotate(0, &mut spans(intervals), &mut positions)
    }

    #[test]
    fn test_single_interval() {
        let doc = annotate(
            "the quick brown fox and red fox jump over the lazy dog",
            &[(5, 7)],
        )
        .unwrap();

        assert_eq!(
            doc.text,
            "the quick brown fox and <red fox> jump over the lazy dog "
        );
        assert_eq!(doc.span_count, 1);
    }

    #[test]
    fn test_separator_follows_every_token() {
        let doc = annotate("the quick red fox jumps", &[(2, 4)]).unwrap();
        assert_eq!(doc.text, "the quick <red fox> jumps ");

        let closing = annotate("the quick red fox", &[(2, 4)]).unwrap();
        assert_eq!(closing.text, "the quick <red fox> ");

        let empty = annotate("", &[]).unwrap();
        assert_eq!(empty.text, "");
    }

    #[test]
    fn test_zero_match() {
        let doc = annotate("red fox", &[]).unwrap();
        assert_eq!(doc.text, "red fox ");
        assert_eq!(doc.span_count, 0);
    }

    #[test]
    fn test_adjacent_intervals_close_before_open() {
        let doc = annotate("a b c d", &[(0, 2), (2, 4)]).unwrap();
        assert_eq!(doc.text, "<a b> <c d> ");
        assert_eq!(doc.span_count, 2);
    }

    #[test]
    fn test_nested_and_same_start_intervals() {
        let doc = annotate("a b c d e", &[(0, 5), (1, 2), (1, 3)]).unwrap();
        assert_eq!(doc.text, "<a <<b> c> d e> ");
        assert_eq!(doc.span_count, 3);
    }

    #[test]
    fn test_overlapping_intervals() {
        let doc = annotate("a b c d", &[(0, 3), (1, 4)]).unwrap();
        assert_eq!(doc.text, "<a <b c> d> ");
        assert_eq!(doc.span_count, 2);
    }

    #[test]
    fn test_position_gaps() {
        let mut positions = VecPositionCursor::new().with_tokens(
            4,
            "f",
            vec![Token::new("quick", 1), Token::new("fox", 3), Token::new("dog", 7)],
        );
        positions.reset(4, "f").unwrap();

        let doc = SpanAnnotator::default()
            .annotate(4, &mut spans(&[(1, 4)]), &mut positions)
            .unwrap();
        assert_eq!(doc.text, "<quick fox> dog ");
        assert_eq!(doc.id, 4);
    }

    #[test]
    fn test_custom_markers() {
        let config = AnnotationConfig::default()
            .with_open_marker("[")
            .with_close_marker("]")
            .with_separator("_");
        let mut positions = VecPositionCursor::new().with_tokens(0, "f", tokens("red fox runs"));
        positions.reset(0, "f").unwrap();

        let doc = SpanAnnotator::new(config)
            .annotate(0, &mut spans(&[(0, 2)]), &mut positions)
            .unwrap();
        assert_eq!(doc.text, "[red_fox]_runs_");
    }

    #[test]
    fn test_misaligned_interval_past_end() {
        let err = annotate("red fox", &[(1, 3)]).unwrap_err();
        assert!(matches!(
            err,
            SpanmarkError::MisalignedPosition { doc_id: 0, .. }
        ));
    }

    #[test]
    fn test_misaligned_start_past_tokens() {
        let err = annotate("red fox", &[(4, 5)]).unwrap_err();
        assert!(err.is_misalignment());
    }

    #[test]
    fn test_misaligned_skipped_start() {
        let mut positions = VecPositionCursor::new()
            .with_tokens(0, "f", vec![Token::new("red", 0), Token::new("fox", 2)]);
        positions.reset(0, "f").unwrap();

        let err = SpanAnnotator::default()
            .annotate(0, &mut spans(&[(1, 2)]), &mut positions)
            .unwrap_err();
        assert!(err.is_misalignment());
    }

    #[derive(Debug)]
    struct UnsortedSpans {
        starts: Vec<Position>,
    }

    impl SpanCursor for UnsortedSpans {
        fn next_interval_start(&mut self) -> Result<SpanPosition> {
            if self.starts.is_empty() {
                return Ok(SpanPosition::NoMore);
            }
            Ok(SpanPosition::At(self.starts.remove(0)))
        }

        fn current_interval_end(&mut self) -> Result<Position> {
            Ok(4)
        }
    }

    #[test]
    fn test_decreasing_start_is_protocol_violation() {
        let mut positions = VecPositionCursor::new().with_tokens(0, "f", tokens("a b c d"));
        positions.reset(0, "f").unwrap();
        let mut spans = UnsortedSpans { starts: vec![2, 1] };

        let err = SpanAnnotator::default()
            .annotate(0, &mut spans, &mut positions)
            .unwrap_err();
        assert!(matches!(err, SpanmarkError::ProtocolViolation(_)));
    }

    #[test]
    fn test_annotate_documents_isolates_misalignment() {
        let mut positions = VecPositionCursor::new()
            .with_tokens(1, "f", tokens("red fox"))
            .with_tokens(2, "f", tokens("red"))
            .with_tokens(3, "f", tokens("big red fox"));
        let mut docs = VecDocumentCursor::new(vec![1, 2, 3]);
        let factory = |doc_id: DocId| -> Result<Box<dyn SpanCursor>> {
            let interval = match doc_id {
                3 => (1, 3),
                _ => (0, 2),
            };
            Ok(Box::new(spans(&[interval])))
        };

        let report = SpanAnnotator::default()
            .annotate_documents(&mut docs, &factory, &mut positions, "f")
            .unwrap();

        let ids: Vec<DocId> = report.documents.iter().map(|d| d.id).collect();
        assert_eq!(ids, vec![1, 3]);
        assert_eq!(report.document(3).unwrap().text, "big <red fox> ");
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].doc_id, 2);
        assert!(!report.is_clean());
        assert_eq!(report.total_spans(), 2);
    }

    #[test]
    fn test_annotate_documents_propagates_other_errors() {
        let mut positions = VecPositionCursor::new().with_tokens(1, "f", tokens("red fox"));
        let mut docs = VecDocumentCursor::new(vec![1, 2]);
        let factory =
            |_doc_id: DocId| -> Result<Box<dyn SpanCursor>> { Ok(Box::new(spans(&[(0, 1)]))) };

        let err = SpanAnnotator::default()
            .annotate_documents(&mut docs, &factory, &mut positions, "f")
            .unwrap_err();
        assert!(matches!(err, SpanmarkError::Field(_)));
    }

    #[test]
    fn test_config_from_json() {
        let config = AnnotationConfig::from_json(r#"{ "separator": "|" }"#).unwrap();
        assert_eq!(config.open_marker, "<");
        assert_eq!(config.separator, "|");
        assert!(AnnotationConfig::from_json("[").is_err());
    }
}
