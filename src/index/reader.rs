//! Point-in-time index reader.

use std::sync::Arc;

use crate::document::Document;
use crate::error::{Result, SpanmarkError};
use crate::index::segment::Segment;
use crate::span::interval::DocId;

/// A read-only snapshot of the sealed segments of an index.
///
/// Cloning is cheap and the snapshot never changes, even if the writer seals
/// more segments afterwards.
#[derive(Debug, Clone)]
pub struct IndexReader {
    segments: Arc<[Arc<Segment>]>,
}

impl IndexReader {
    pub(crate) fn new(segments: Vec<Arc<Segment>>) -> Self {
        IndexReader {
            segments: segments.into(),
        }
    }

    /// The segments of this snapshot, ordered by document id.
    pub fn leaves(&self) -> &[Arc<Segment>] {
        &self.segments
    }

    /// Number of documents visible to this reader.
    pub fn num_docs(&self) -> usize {
        self.segments.iter().map(|s| s.num_docs()).sum()
    }

    /// One past the largest document id visible to this reader.
    pub fn max_doc(&self) -> DocId {
        self.segments.last().map_or(0, |s| s.max_doc())
    }

    /// Find the segment holding `doc_id`.
    pub fn segment_for(&self, doc_id: DocId) -> Option<&Arc<Segment>> {
        let index = self
            .segments
            .partition_point(|segment| segment.max_doc() <= doc_id);
        self.segments
            .get(index)
            .filter(|segment| segment.contains(doc_id))
    }

    /// Get a stored document by id.
    pub fn document(&self, doc_id: DocId) -> Result<&Document> {
        self.segment_for(doc_id)
            .and_then(|segment| segment.document(doc_id))
            .ok_or_else(|| SpanmarkError::not_found(format!("document {doc_id}")))
    }

    /// Get the stored text of one field of a document.
    pub fn stored_text(&self, doc_id: DocId, field: &str) -> Result<&str> {
        self.document(doc_id)?.get_field(field).ok_or_else(|| {
            SpanmarkError::field(format!("document {doc_id} has no stored field '{field}'"))
        })
    }
}
