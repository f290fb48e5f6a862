//! Filtering documents by the number of match intervals.
//!
//! Span queries locate intervals but cannot express "at least N of them".
//! [`SpanFrequencyFilter`] counts the intervals of each selected document and
//! keeps the documents that reach the threshold.

use tracing::trace;

use crate::error::{Result, SpanmarkError};
use crate::span::cursor::{DocumentCursor, SpanCursor, SpanCursorFactory};
use crate::span::interval::{DocId, MatchInterval, NextDoc, Position, SpanPosition};

/// Keeps documents with at least `min_count` match intervals.
///
/// # Example
///
/// ```
/// use spanmark::error::Result;
/// use spanmark::span::cursor::{SpanCursor, VecDocumentCursor, VecSpanCursor};
/// use spanmark::span::frequency::SpanFrequencyFilter;
/// use spanmark::span::interval::{DocId, MatchInterval};
///
/// let factory = |doc_id: DocId| -> Result<Box<dyn SpanCursor>> {
///     let intervals = (0..doc_id as u32)
///         .map(MatchInterval::single)
///         .collect::<Result<Vec<_>>>()?;
///     Ok(Box::new(VecSpanCursor::new(intervals)))
/// };
///
/// let filter = SpanFrequencyFilter::new(2).unwrap();
/// let mut docs = VecDocumentCursor::new(vec![1, 2, 3]);
/// assert_eq!(filter.filter(&mut docs, &factory).unwrap(), vec![2, 3]);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpanFrequencyFilter {
    min_count: usize,
}

impl SpanFrequencyFilter {
    /// Create a filter; `min_count` must be at least 1.
    pub fn new(min_count: usize) -> Result<Self> {
        if min_count == 0 {
            return Err(SpanmarkError::invalid_argument(
                "min_count must be at least 1",
            ));
        }
        Ok(SpanFrequencyFilter { min_count })
    }

    /// The threshold.
    pub fn min_count(&self) -> usize {
        self.min_count
    }

    /// Drain `spans` and count its intervals.
    ///
    /// Each start is paired with its end read, and the pair must form a valid
    /// interval that does not start before the previous one.
    pub fn count_intervals(spans: &mut dyn SpanCursor) -> Result<usize> {
        let mut count = 0;
        let mut previous_start: Option<Position> = None;

        while let SpanPosition::At(start) = spans.next_interval_start()? {
            let end = spans.current_interval_end()?;
            MatchInterval::try_new(start, end)?;
            if previous_start.is_some_and(|previous| start < previous) {
                return Err(SpanmarkError::protocol(format!(
                    "interval start {start} precedes the previous start"
                )));
            }
            previous_start = Some(start);
            count += 1;
        }

        Ok(count)
    }

    /// Whether the intervals of `spans` reach the threshold.
    pub fn accepts(&self, spans: &mut dyn SpanCursor) -> Result<bool> {
        Ok(Self::count_intervals(spans)? >= self.min_count)
    }

    /// Visit every document of `docs` once and keep those reaching the threshold.
    pub fn filter(
        &self,
        docs: &mut dyn DocumentCursor,
        factory: &dyn SpanCursorFactory,
    ) -> Result<Vec<DocId>> {
        Ok(Self::count_documents(docs, factory)?
            .into_iter()
            .filter(|&(_, count)| count >= self.min_count)
            .map(|(doc_id, _)| doc_id)
            .collect())
    }

    /// Count the intervals of every document of `docs`, in cursor order.
    pub fn count_documents(
        docs: &mut dyn DocumentCursor,
        factory: &dyn SpanCursorFactory,
    ) -> Result<Vec<(DocId, usize)>> {
        let mut counts = Vec::new();
        let mut last_doc: Option<DocId> = None;

        while let NextDoc::Doc(doc_id) = docs.next_document()? {
            if let Some(last) = last_doc
                && doc_id <= last
            {
                return Err(SpanmarkError::protocol(format!(
                    "document {doc_id} does not follow document {last}"
                )));
            }
            last_doc = Some(doc_id);

            let mut spans = factory.span_cursor(doc_id)?;
            let count = Self::count_intervals(spans.as_mut())?;
            trace!("document {} has {} spans", doc_id, count);
            counts.push((doc_id, count));
        }

        Ok(counts)
    }
}
