//! Index writer.

use std::sync::atomic::Ordering;

use tracing::debug;

use crate::document::Document;
use crate::error::Result;
use crate::index::Index;
use crate::index::segment::SegmentBuilder;
use crate::span::interval::DocId;

/// Adds documents to an [`Index`].
///
/// Only one writer can be open per index; dropping it seals any buffered
/// documents and releases the write lock.
#[derive(Debug)]
pub struct IndexWriter {
    index: Index,
    buffer: Option<SegmentBuilder>,
    next_doc_id: DocId,
}

impl IndexWriter {
    pub(crate) fn new(index: Index) -> Self {
        let next_doc_id = index.max_doc();
        IndexWriter {
            index,
            buffer: None,
            next_doc_id,
        }
    }

    /// Analyze and buffer a document; returns the id it will be searchable under.
    ///
    /// A segment is sealed automatically once `max_buffered_docs` documents are
    /// buffered.
    pub fn add_document(&mut self, document: Document) -> Result<DocId> {
        let max_buffered_docs = self.index.config().max_buffered_docs;
        let analyzer = self.index.config().analyzer.clone();

        let next_doc_id = self.next_doc_id;
        let ordinal = self.index.num_segments();
        let builder = self
            .buffer
            .get_or_insert_with(|| SegmentBuilder::new(ordinal, next_doc_id));

        let doc_id = builder.add_document(document, analyzer.as_ref())?;
        self.next_doc_id = doc_id + 1;

        if builder.len() >= max_buffered_docs {
            self.flush()?;
        }
        Ok(doc_id)
    }

    /// Add several documents, returning their ids in order.
    pub fn add_documents<I>(&mut self, documents: I) -> Result<Vec<DocId>>
    where
        I: IntoIterator<Item = Document>,
    {
        documents
            .into_iter()
            .map(|document| self.add_document(document))
            .collect()
    }

    /// Number of documents buffered but not yet searchable.
    pub fn pending_docs(&self) -> usize {
        self.buffer.as_ref().map_or(0, SegmentBuilder::len)
    }

    /// Seal buffered documents into a segment so readers opened afterwards see them.
    pub fn commit(&mut self) -> Result<()> {
        self.flush()
    }

    fn flush(&mut self) -> Result<()> {
        let Some(builder) = self.buffer.take() else {
            return Ok(());
        };
        if builder.is_empty() {
            return Ok(());
        }

        let segment = builder.build()?;
        debug!(
            "sealed segment {} with {} documents starting at doc {}",
            segment.ordinal(),
            segment.num_docs(),
            segment.doc_base()
        );
        self.index.push_segment(segment);
        Ok(())
    }
}

impl Drop for IndexWriter {
    fn drop(&mut self) {
        if let Err(e) = self.flush() {
            tracing::warn!("discarding buffered documents on writer drop: {}", e);
        }
        self.index.writer_open().store(false, Ordering::Release);
    }
}
