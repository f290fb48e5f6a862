//! In-memory positional index.
//!
//! The index stores every document verbatim and records, per field and term,
//! the positions at which the term occurs. Documents are grouped into
//! immutable [`Segment`](segment::Segment)s; span queries are evaluated one
//! segment at a time against an [`IndexReader`](reader::IndexReader) snapshot.
//!
//! # Examples
//!
//! ```
//! use spanmark::document::Document;
//! use spanmark::index::Index;
//! use spanmark::index::config::IndexConfig;
//!
//! let index = Index::new(IndexConfig::default()).unwrap();
//! let mut writer = index.writer().unwrap();
//! writer
//!     .add_document(Document::builder().add_text("f", "the red fox").build())
//!     .unwrap();
//! writer.commit().unwrap();
//!
//! let reader = index.reader();
//! assert_eq!(reader.num_docs(), 1);
//! assert_eq!(reader.stored_text(0, "f").unwrap(), "the red fox");
//! ```

pub mod config;
pub mod posting;
pub mod reader;
pub mod segment;
pub mod writer;

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::RwLock;

use crate::error::{Result, SpanmarkError};
use crate::span::interval::DocId;

use self::config::IndexConfig;
use self::reader::IndexReader;
use self::segment::Segment;
use self::writer::IndexWriter;

/// A shared handle to an in-memory positional index.
#[derive(Clone)]
pub struct Index {
    inner: Arc<IndexInner>,
}

struct IndexInner {
    config: IndexConfig,
    segments: RwLock<Vec<Arc<Segment>>>,
    writer_open: AtomicBool,
}

impl Index {
    /// Create an empty index.
    pub fn new(config: IndexConfig) -> Result<Self> {
        config.validate()?;
        Ok(Index {
            inner: Arc::new(IndexInner {
                config,
                segments: RwLock::new(Vec::new()),
                writer_open: AtomicBool::new(false),
            }),
        })
    }

    /// The configuration this index was created with.
    pub fn config(&self) -> &IndexConfig {
        &self.inner.config
    }

    /// Open the single writer of this index.
    pub fn writer(&self) -> Result<IndexWriter> {
        if self
            .inner
            .writer_open
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Err(SpanmarkError::index("an index writer is already open"));
        }
        Ok(IndexWriter::new(self.clone()))
    }

    /// Snapshot the sealed segments.
    pub fn reader(&self) -> IndexReader {
        IndexReader::new(self.inner.segments.read().clone())
    }

    /// Number of sealed segments.
    pub fn num_segments(&self) -> usize {
        self.inner.segments.read().len()
    }

    /// One past the largest sealed document id.
    pub fn max_doc(&self) -> DocId {
        self.inner
            .segments
            .read()
            .last()
            .map_or(0, |segment| segment.max_doc())
    }

    pub(crate) fn push_segment(&self, segment: Segment) {
        self.inner.segments.write().push(Arc::new(segment));
    }

    pub(crate) fn writer_open(&self) -> &AtomicBool {
        &self.inner.writer_open
    }
}

impl std::fmt::Debug for Index {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Index")
            .field("config", &self.inner.config)
            .field("segments", &self.num_segments())
            .finish()
    }
}
