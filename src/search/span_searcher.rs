//! Running annotation and span counting over a whole index.

use std::sync::Arc;

use tracing::debug;

use crate::analysis::analyzer::Analyzer;
use crate::error::Result;
use crate::index::reader::IndexReader;
use crate::query::span::SpanQuery;
use crate::span::annotator::{AnnotationConfig, AnnotationReport, SpanAnnotator};
use crate::span::evaluation::SegmentSpans;
use crate::span::frequency::SpanFrequencyFilter;
use crate::span::interval::DocId;
use crate::span::position::AnalyzedPositionCursor;

/// Evaluates span queries segment by segment against a reader snapshot.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
///
/// use spanmark::analysis::analyzer::SimpleAnalyzer;
/// use spanmark::document::Document;
/// use spanmark::index::Index;
/// use spanmark::index::config::IndexConfig;
/// use spanmark::query::span::SpanQueryBuilder;
/// use spanmark::search::span_searcher::SpanSearcher;
/// use spanmark::span::annotator::AnnotationConfig;
///
/// let index = Index::new(IndexConfig::default()).unwrap();
/// let mut writer = index.writer().unwrap();
/// writer
///     .add_document(Document::builder().add_text("body", "a red fox and a red fox").build())
///     .unwrap();
/// writer.commit().unwrap();
///
/// let query = SpanQueryBuilder::new("body")
///     .phrase(vec!["red".to_string(), "fox".to_string()])
///     .unwrap();
/// let searcher = SpanSearcher::new(index.reader());
///
/// let report = searcher
///     .annotate(&query, Arc::new(SimpleAnalyzer::whitespace()), AnnotationConfig::default())
///     .unwrap();
/// assert_eq!(report.documents[0].text, "a <red fox> and a <red fox> ");
/// assert_eq!(searcher.filter(&query, 2).unwrap(), vec![0]);
/// ```
#[derive(Debug, Clone)]
pub struct SpanSearcher {
    reader: IndexReader,
}

impl SpanSearcher {
    /// Create a searcher over `reader`.
    pub fn new(reader: IndexReader) -> Self {
        SpanSearcher { reader }
    }

    /// The reader snapshot searched.
    pub fn reader(&self) -> &IndexReader {
        &self.reader
    }

    /// Annotate every document matching `query`.
    ///
    /// `analyzer` re-tokenizes the stored text of the query's field and must
    /// match the analyzer the field was indexed with. Documents whose
    /// positions do not line up are reported as failures.
    pub fn annotate(
        &self,
        query: &dyn SpanQuery,
        analyzer: Arc<dyn Analyzer>,
        config: AnnotationConfig,
    ) -> Result<AnnotationReport> {
        let annotator = SpanAnnotator::new(config);
        let mut positions = AnalyzedPositionCursor::new(self.reader.clone(), analyzer);
        let mut report = AnnotationReport::default();

        for segment in self.reader.leaves() {
            let spans = SegmentSpans::new(query, segment);
            let mut docs = spans.document_cursor()?;
            let mut segment_report =
                annotator.annotate_documents(&mut docs, &spans, &mut positions, query.field_name())?;

            debug!(
                "annotated {} documents in segment {} ({} failed)",
                segment_report.documents.len(),
                segment.ordinal(),
                segment_report.failures.len()
            );
            report.append(&mut segment_report);
        }

        Ok(report)
    }

    /// Ids of the documents with at least `min_count` intervals, ascending.
    pub fn filter(&self, query: &dyn SpanQuery, min_count: usize) -> Result<Vec<DocId>> {
        let filter = SpanFrequencyFilter::new(min_count)?;
        let mut matches = Vec::new();

        for segment in self.reader.leaves() {
            let spans = SegmentSpans::new(query, segment);
            let mut docs = spans.document_cursor()?;
            let segment_matches = filter.filter(&mut docs, &spans)?;

            debug!(
                "{} documents in segment {} reach {} spans",
                segment_matches.len(),
                segment.ordinal(),
                min_count
            );
            matches.extend(segment_matches);
        }

        Ok(matches)
    }

    /// Number of intervals of every document matching `query`, ascending by id.
    pub fn span_counts(&self, query: &dyn SpanQuery) -> Result<Vec<(DocId, usize)>> {
        let mut counts = Vec::new();

        for segment in self.reader.leaves() {
            let spans = SegmentSpans::new(query, segment);
            let mut docs = spans.document_cursor()?;
            counts.extend(SpanFrequencyFilter::count_documents(&mut docs, &spans)?);
        }

        Ok(counts)
    }
}
