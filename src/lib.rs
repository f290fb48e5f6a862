//! # Spanmark
//!
//! Span-match annotation and frequency filtering over a positional full-text
//! index.
//!
//! ## Features
//!
//! - Text analysis pipeline (tokenizers, token filters, analyzers)
//! - In-memory positional index with segments
//! - Span queries: term, near, first, not, or, containing, within
//! - Inline annotation of match intervals in re-tokenized stored text
//! - Filtering documents by the number of match intervals
//!
//! ## Example
//!
//! ```
//! use std::sync::Arc;
//!
//! use spanmark::prelude::*;
//!
//! let index = Index::new(IndexConfig::default()).unwrap();
//! let mut writer = index.writer().unwrap();
//! writer
//!     .add_document(Document::builder().add_text("body", "the quick red fox").build())
//!     .unwrap();
//! writer.commit().unwrap();
//!
//! let builder = SpanQueryBuilder::new("body");
//! let clauses: Vec<Box<dyn SpanQuery>> =
//!     vec![Box::new(builder.term("quick")), Box::new(builder.term("fox"))];
//! let query = builder.near(clauses, 1, true).unwrap();
//!
//! let searcher = SpanSearcher::new(index.reader());
//! let report = searcher
//!     .annotate(&query, Arc::new(SimpleAnalyzer::whitespace()), AnnotationConfig::default())
//!     .unwrap();
//! assert_eq!(report.documents[0].text, "the <quick red fox> ");
//! assert_eq!(searcher.span_counts(&query).unwrap(), vec![(0, 1)]);
//! ```

pub mod analysis;
pub mod document;
pub mod error;
pub mod index;
pub mod query;
pub mod search;
pub mod span;

pub mod prelude {
    pub use crate::analysis::analyzer::{Analyzer, SimpleAnalyzer, StandardAnalyzer};
    pub use crate::document::Document;
    pub use crate::error::{Result, SpanmarkError};
    pub use crate::index::Index;
    pub use crate::index::config::IndexConfig;
    pub use crate::query::span::{SpanQuery, SpanQueryBuilder};
    pub use crate::search::span_searcher::SpanSearcher;
    pub use crate::span::annotator::{AnnotatedDocument, AnnotationConfig, SpanAnnotator};
    pub use crate::span::cursor::{DocumentCursor, PositionCursor, SpanCursor, SpanCursorFactory};
    pub use crate::span::frequency::SpanFrequencyFilter;
    pub use crate::span::interval::{DocId, MatchInterval, Position, SpanPosition};
}

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
