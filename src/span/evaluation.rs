//! Evaluating a span query against one segment.
//!
//! [`SegmentSpans`] is the bridge between the query family and the cursor
//! contracts: it hands out a [`DocumentCursor`] over the documents that have
//! at least one span, and acts as the [`SpanCursorFactory`] for them.
//!
//! The document cursor has to evaluate a candidate's spans to know whether
//! it matches at all. It parks those spans in the owning `SegmentSpans`, so
//! the span cursor opened right after for the same document reuses them
//! instead of evaluating the query again.

use std::cell::RefCell;

use tracing::trace;

use crate::error::Result;
use crate::index::segment::Segment;
use crate::query::span::SpanQuery;
use crate::span::cursor::{DocumentCursor, SpanCursor, SpanCursorFactory, VecSpanCursor};
use crate::span::interval::{DocId, MatchInterval, NextDoc};

/// A span query bound to one segment.
#[derive(Debug)]
pub struct SegmentSpans<'a> {
    query: &'a dyn SpanQuery,
    segment: &'a Segment,
    /// Spans of the document the cursor yielded last, until a span cursor takes them.
    parked: RefCell<Option<(DocId, Vec<MatchInterval>)>>,
}

impl<'a> SegmentSpans<'a> {
    /// Bind `query` to `segment`.
    pub fn new(query: &'a dyn SpanQuery, segment: &'a Segment) -> Self {
        SegmentSpans {
            query,
            segment,
            parked: RefCell::new(None),
        }
    }

    /// The bound segment.
    pub fn segment(&self) -> &'a Segment {
        self.segment
    }

    /// Open a cursor over the documents of the segment with at least one span.
    pub fn document_cursor(&self) -> Result<SpanDocumentCursor<'_>> {
        let mut candidates = self.query.candidate_docs(self.segment)?;
        candidates.sort_unstable();
        candidates.dedup();

        trace!(
            "segment {} has {} candidate documents for field '{}'",
            self.segment.ordinal(),
            candidates.len(),
            self.query.field_name()
        );

        Ok(SpanDocumentCursor {
            spans: self,
            candidates,
            next: 0,
        })
    }

    fn evaluate(&self, doc_id: DocId) -> Result<Vec<MatchInterval>> {
        self.query.get_spans(doc_id, self.segment)
    }
}

impl SpanCursorFactory for SegmentSpans<'_> {
    fn span_cursor(&self, doc_id: DocId) -> Result<Box<dyn SpanCursor>> {
        let parked = self
            .parked
            .borrow_mut()
            .take_if(|(parked_id, _)| *parked_id == doc_id);
        let spans = match parked {
            Some((_, spans)) => spans,
            None => self.evaluate(doc_id)?,
        };
        Ok(Box::new(VecSpanCursor::new(spans)))
    }
}

/// Document cursor that skips candidates whose spans turn out empty.
#[derive(Debug)]
pub struct SpanDocumentCursor<'a> {
    spans: &'a SegmentSpans<'a>,
    candidates: Vec<DocId>,
    next: usize,
}

impl DocumentCursor for SpanDocumentCursor<'_> {
    fn next_document(&mut self) -> Result<NextDoc> {
        while let Some(&doc_id) = self.candidates.get(self.next) {
            self.next += 1;
            let spans = self.spans.evaluate(doc_id)?;
            if !spans.is_empty() {
                *self.spans.parked.borrow_mut() = Some((doc_id, spans));
                return Ok(NextDoc::Doc(doc_id));
            }
        }
        Ok(NextDoc::NoMoreDocs)
    }
}
