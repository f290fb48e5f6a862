//! Span queries for positional and proximity-based searching.
//!
//! Span queries are evaluated against one [`Segment`] at a time. Each query
//! reports the documents that may match ([`SpanQuery::candidate_docs`]) and,
//! per document, the sorted match intervals over token positions
//! ([`SpanQuery::get_spans`]). Composite queries combine the intervals of their
//! clauses, so arbitrarily nested proximity constraints can be expressed.

use std::fmt::Debug;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SpanmarkError};
use crate::index::segment::Segment;
use crate::span::interval::{DocId, MatchInterval, Position};

/// Base trait for span queries.
pub trait SpanQuery: Send + Sync + Debug {
    /// Get the field name this span query operates on.
    fn field_name(&self) -> &str;

    /// Ascending ids of the documents in `segment` that may have spans.
    ///
    /// A candidate is allowed to produce no spans; callers skip it.
    fn candidate_docs(&self, segment: &Segment) -> Result<Vec<DocId>>;

    /// Get the spans of a document, ordered by `(start, end)`.
    fn get_spans(&self, doc_id: DocId, segment: &Segment) -> Result<Vec<MatchInterval>>;

    /// Clone this span query.
    fn clone_box(&self) -> Box<dyn SpanQuery>;
}

impl Clone for Box<dyn SpanQuery> {
    fn clone(&self) -> Self {
        self.clone_box()
    }
}

fn check_field(field: &str, clause: &dyn SpanQuery) -> Result<()> {
    if clause.field_name() != field {
        return Err(SpanmarkError::query(format!(
            "clause on field '{}' cannot be combined into a span query on field '{}'",
            clause.field_name(),
            field
        )));
    }
    Ok(())
}

fn intersect_sorted(left: &[DocId], right: &[DocId]) -> Vec<DocId> {
    let mut result = Vec::with_capacity(left.len().min(right.len()));
    let (mut i, mut j) = (0, 0);
    while i < left.len() && j < right.len() {
        match left[i].cmp(&right[j]) {
            std::cmp::Ordering::Less => i += 1,
            std::cmp::Ordering::Greater => j += 1,
            std::cmp::Ordering::Equal => {
                result.push(left[i]);
                i += 1;
                j += 1;
            }
        }
    }
    result
}

fn union_sorted(left: &[DocId], right: &[DocId]) -> Vec<DocId> {
    let mut result = Vec::with_capacity(left.len() + right.len());
    result.extend_from_slice(left);
    result.extend_from_slice(right);
    result.sort_unstable();
    result.dedup();
    result
}

fn intersect_clauses(clauses: &[&dyn SpanQuery], segment: &Segment) -> Result<Vec<DocId>> {
    let mut clauses = clauses.iter();
    let Some(first) = clauses.next() else {
        return Ok(Vec::new());
    };

    let mut docs = first.candidate_docs(segment)?;
    for clause in clauses {
        if docs.is_empty() {
            break;
        }
        docs = intersect_sorted(&docs, &clause.candidate_docs(segment)?);
    }
    Ok(docs)
}

/// A span query that matches a single term.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpanTermQuery {
    /// Field to search in
    field: String,
    /// Term to search for
    term: String,
}

impl SpanTermQuery {
    /// Create a new span term query.
    pub fn new<F: Into<String>, T: Into<String>>(field: F, term: T) -> Self {
        SpanTermQuery {
            field: field.into(),
            term: term.into(),
        }
    }

    /// Get the term.
    pub fn term(&self) -> &str {
        &self.term
    }
}

impl SpanQuery for SpanTermQuery {
    fn field_name(&self) -> &str {
        &self.field
    }

    fn candidate_docs(&self, segment: &Segment) -> Result<Vec<DocId>> {
        Ok(segment
            .posting_list(&self.field, &self.term)
            .map(|list| list.doc_ids())
            .unwrap_or_default())
    }

    fn get_spans(&self, doc_id: DocId, segment: &Segment) -> Result<Vec<MatchInterval>> {
        let Some(posting) = segment
            .posting_list(&self.field, &self.term)
            .and_then(|list| list.posting(doc_id))
        else {
            return Ok(Vec::new());
        };

        posting
            .positions()
            .iter()
            .map(|&position| MatchInterval::single(position))
            .collect()
    }

    fn clone_box(&self) -> Box<dyn SpanQuery> {
        Box::new(self.clone())
    }
}

/// A span query that matches clauses near each other.
///
/// The slop is the total number of unmatched positions allowed between the
/// clause spans. With `in_order` the clause spans must follow each other
/// without overlapping; otherwise any arrangement is accepted.
#[derive(Debug, Clone)]
pub struct SpanNearQuery {
    /// Field to search in
    field: String,
    /// Clauses that must appear near each other
    clauses: Vec<Box<dyn SpanQuery>>,
    /// Maximum number of gap positions
    slop: u32,
    /// Whether clauses must appear in order
    in_order: bool,
}

impl SpanNearQuery {
    /// Create a new span near query.
    pub fn new<F: Into<String>>(
        field: F,
        clauses: Vec<Box<dyn SpanQuery>>,
        slop: u32,
        in_order: bool,
    ) -> Result<Self> {
        let field = field.into();
        if clauses.is_empty() {
            return Err(SpanmarkError::query("span near query needs at least one clause"));
        }
        for clause in &clauses {
            check_field(&field, clause.as_ref())?;
        }

        Ok(SpanNearQuery {
            field,
            clauses,
            slop,
            in_order,
        })
    }

    /// Get the slop (maximum distance).
    pub fn slop(&self) -> u32 {
        self.slop
    }

    /// Check if clauses must be in order.
    pub fn is_in_order(&self) -> bool {
        self.in_order
    }

    /// Get the clauses.
    pub fn clauses(&self) -> &[Box<dyn SpanQuery>] {
        &self.clauses
    }

    fn ordered_spans(&self, clause_spans: &[Vec<MatchInterval>]) -> Vec<MatchInterval> {
        let (first, rest) = match clause_spans.split_first() {
            Some(split) => split,
            None => return Vec::new(),
        };

        let mut result = Vec::new();
        'anchor: for anchor in first {
            let mut previous = *anchor;
            let mut gaps: u64 = 0;

            for spans in rest {
                // Earliest span starting at or after the previous end.
                let index = spans.partition_point(|span| span.start < previous.end);
                let Some(next) = spans.get(index) else {
                    continue 'anchor;
                };
                gaps += u64::from(next.start - previous.end);
                if gaps > u64::from(self.slop) {
                    continue 'anchor;
                }
                previous = *next;
            }

            result.push(MatchInterval {
                start: anchor.start,
                end: previous.end,
            });
        }
        result
    }

    fn unordered_spans(&self, clause_spans: &[Vec<MatchInterval>]) -> Vec<MatchInterval> {
        let mut result = Vec::new();

        for (anchor_clause, anchors) in clause_spans.iter().enumerate() {
            'anchor: for anchor in anchors {
                let mut picked = Vec::with_capacity(clause_spans.len());
                picked.push(*anchor);

                for (clause, spans) in clause_spans.iter().enumerate() {
                    if clause == anchor_clause {
                        continue;
                    }
                    // The span with the smallest end among those starting at or after the anchor.
                    let from = spans.partition_point(|span| span.start < anchor.start);
                    let Some(best) = spans[from..].iter().min_by_key(|span| span.end) else {
                        continue 'anchor;
                    };
                    if picked.iter().any(|span| span.overlaps(best)) {
                        continue 'anchor;
                    }
                    picked.push(*best);
                }

                let end = picked.iter().map(|span| span.end).max().unwrap_or(anchor.end);
                let covered: u64 = picked.iter().map(|span| u64::from(span.length())).sum();
                let width = u64::from(end - anchor.start);
                if width.saturating_sub(covered) <= u64::from(self.slop) {
                    result.push(MatchInterval {
                        start: anchor.start,
                        end,
                    });
                }
            }
        }

        result.sort_unstable();
        result.dedup();
        result
    }
}

impl SpanQuery for SpanNearQuery {
    fn field_name(&self) -> &str {
        &self.field
    }

    fn candidate_docs(&self, segment: &Segment) -> Result<Vec<DocId>> {
        let clauses: Vec<&dyn SpanQuery> = self.clauses.iter().map(|c| c.as_ref()).collect();
        intersect_clauses(&clauses, segment)
    }

    fn get_spans(&self, doc_id: DocId, segment: &Segment) -> Result<Vec<MatchInterval>> {
        let mut clause_spans = Vec::with_capacity(self.clauses.len());
        for clause in &self.clauses {
            let spans = clause.get_spans(doc_id, segment)?;
            if spans.is_empty() {
                return Ok(Vec::new());
            }
            clause_spans.push(spans);
        }

        let mut spans = if self.in_order {
            self.ordered_spans(&clause_spans)
        } else {
            self.unordered_spans(&clause_spans)
        };
        spans.sort_unstable();
        Ok(spans)
    }

    fn clone_box(&self) -> Box<dyn SpanQuery> {
        Box::new(self.clone())
    }
}

/// A span query that keeps spans ending at or before a position.
#[derive(Debug, Clone)]
pub struct SpanFirstQuery {
    /// The wrapped span query
    matcher: Box<dyn SpanQuery>,
    /// Maximum end position (exclusive)
    end: Position,
}

impl SpanFirstQuery {
    /// Create a new span first query.
    pub fn new(matcher: Box<dyn SpanQuery>, end: Position) -> Self {
        SpanFirstQuery { matcher, end }
    }

    /// Get the maximum end position.
    pub fn end(&self) -> Position {
        self.end
    }
}

impl SpanQuery for SpanFirstQuery {
    fn field_name(&self) -> &str {
        self.matcher.field_name()
    }

    fn candidate_docs(&self, segment: &Segment) -> Result<Vec<DocId>> {
        self.matcher.candidate_docs(segment)
    }

    fn get_spans(&self, doc_id: DocId, segment: &Segment) -> Result<Vec<MatchInterval>> {
        let mut spans = self.matcher.get_spans(doc_id, segment)?;
        spans.retain(|span| span.end <= self.end);
        Ok(spans)
    }

    fn clone_box(&self) -> Box<dyn SpanQuery> {
        Box::new(self.clone())
    }
}

/// A span query that removes spans overlapping an excluded span.
#[derive(Debug, Clone)]
pub struct SpanNotQuery {
    /// Field to search in
    field: String,
    /// The spans to keep
    include: Box<dyn SpanQuery>,
    /// The spans that must not overlap
    exclude: Box<dyn SpanQuery>,
}

impl SpanNotQuery {
    /// Create a new span not query.
    pub fn new<F: Into<String>>(
        field: F,
        include: Box<dyn SpanQuery>,
        exclude: Box<dyn SpanQuery>,
    ) -> Result<Self> {
        let field = field.into();
        check_field(&field, include.as_ref())?;
        check_field(&field, exclude.as_ref())?;
        Ok(SpanNotQuery {
            field,
            include,
            exclude,
        })
    }
}

impl SpanQuery for SpanNotQuery {
    fn field_name(&self) -> &str {
        &self.field
    }

    fn candidate_docs(&self, segment: &Segment) -> Result<Vec<DocId>> {
        self.include.candidate_docs(segment)
    }

    fn get_spans(&self, doc_id: DocId, segment: &Segment) -> Result<Vec<MatchInterval>> {
        let mut spans = self.include.get_spans(doc_id, segment)?;
        if spans.is_empty() {
            return Ok(spans);
        }

        let excluded = self.exclude.get_spans(doc_id, segment)?;
        spans.retain(|span| !excluded.iter().any(|other| span.overlaps(other)));
        Ok(spans)
    }

    fn clone_box(&self) -> Box<dyn SpanQuery> {
        Box::new(self.clone())
    }
}

/// A span query that matches the spans of any clause.
#[derive(Debug, Clone)]
pub struct SpanOrQuery {
    /// Field to search in
    field: String,
    /// Alternative clauses
    clauses: Vec<Box<dyn SpanQuery>>,
}

impl SpanOrQuery {
    /// Create a new span or query.
    pub fn new<F: Into<String>>(field: F, clauses: Vec<Box<dyn SpanQuery>>) -> Result<Self> {
        let field = field.into();
        if clauses.is_empty() {
            return Err(SpanmarkError::query("span or query needs at least one clause"));
        }
        for clause in &clauses {
            check_field(&field, clause.as_ref())?;
        }
        Ok(SpanOrQuery { field, clauses })
    }

    /// Get the clauses.
    pub fn clauses(&self) -> &[Box<dyn SpanQuery>] {
        &self.clauses
    }
}

impl SpanQuery for SpanOrQuery {
    fn field_name(&self) -> &str {
        &self.field
    }

    fn candidate_docs(&self, segment: &Segment) -> Result<Vec<DocId>> {
        let mut docs = Vec::new();
        for clause in &self.clauses {
            docs = union_sorted(&docs, &clause.candidate_docs(segment)?);
        }
        Ok(docs)
    }

    fn get_spans(&self, doc_id: DocId, segment: &Segment) -> Result<Vec<MatchInterval>> {
        let mut spans = Vec::new();
        for clause in &self.clauses {
            spans.extend(clause.get_spans(doc_id, segment)?);
        }
        spans.sort_unstable();
        Ok(spans)
    }

    fn clone_box(&self) -> Box<dyn SpanQuery> {
        Box::new(self.clone())
    }
}

/// A span query that matches big spans containing at least one little span.
#[derive(Debug, Clone)]
pub struct SpanContainingQuery {
    /// Field to search in
    field: String,
    /// The containing span query
    big: Box<dyn SpanQuery>,
    /// The contained span query
    little: Box<dyn SpanQuery>,
}

impl SpanContainingQuery {
    /// Create a new span containing query.
    pub fn new<F: Into<String>>(
        field: F,
        big: Box<dyn SpanQuery>,
        little: Box<dyn SpanQuery>,
    ) -> Result<Self> {
        let field = field.into();
        check_field(&field, big.as_ref())?;
        check_field(&field, little.as_ref())?;
        Ok(SpanContainingQuery { field, big, little })
    }
}

impl SpanQuery for SpanContainingQuery {
    fn field_name(&self) -> &str {
        &self.field
    }

    fn candidate_docs(&self, segment: &Segment) -> Result<Vec<DocId>> {
        intersect_clauses(&[self.big.as_ref(), self.little.as_ref()], segment)
    }

    fn get_spans(&self, doc_id: DocId, segment: &Segment) -> Result<Vec<MatchInterval>> {
        let big_spans = self.big.get_spans(doc_id, segment)?;
        if big_spans.is_empty() {
            return Ok(big_spans);
        }
        let little_spans = self.little.get_spans(doc_id, segment)?;

        Ok(big_spans
            .into_iter()
            .filter(|big| little_spans.iter().any(|little| big.contains(little)))
            .collect())
    }

    fn clone_box(&self) -> Box<dyn SpanQuery> {
        Box::new(self.clone())
    }
}

/// A span query that matches little spans lying inside at least one big span.
#[derive(Debug, Clone)]
pub struct SpanWithinQuery {
    /// Field to search in
    field: String,
    /// The span query to match
    little: Box<dyn SpanQuery>,
    /// The span query that defines the boundaries
    big: Box<dyn SpanQuery>,
}

impl SpanWithinQuery {
    /// Create a new span within query.
    pub fn new<F: Into<String>>(
        field: F,
        little: Box<dyn SpanQuery>,
        big: Box<dyn SpanQuery>,
    ) -> Result<Self> {
        let field = field.into();
        check_field(&field, little.as_ref())?;
        check_field(&field, big.as_ref())?;
        Ok(SpanWithinQuery { field, little, big })
    }
}

impl SpanQuery for SpanWithinQuery {
    fn field_name(&self) -> &str {
        &self.field
    }

    fn candidate_docs(&self, segment: &Segment) -> Result<Vec<DocId>> {
        intersect_clauses(&[self.little.as_ref(), self.big.as_ref()], segment)
    }

    fn get_spans(&self, doc_id: DocId, segment: &Segment) -> Result<Vec<MatchInterval>> {
        let little_spans = self.little.get_spans(doc_id, segment)?;
        if little_spans.is_empty() {
            return Ok(little_spans);
        }
        let big_spans = self.big.get_spans(doc_id, segment)?;

        Ok(little_spans
            .into_iter()
            .filter(|little| big_spans.iter().any(|big| big.contains(little)))
            .collect())
    }

    fn clone_box(&self) -> Box<dyn SpanQuery> {
        Box::new(self.clone())
    }
}

/// Builder for creating complex span queries on one field.
///
/// # Example
///
/// ```
/// use spanmark::query::span::{SpanQuery, SpanQueryBuilder};
///
/// let builder = SpanQueryBuilder::new("body");
/// let red_fox = builder.phrase(vec!["red".to_string(), "fox".to_string()]).unwrap();
/// assert_eq!(red_fox.field_name(), "body");
/// assert_eq!(red_fox.slop(), 0);
/// ```
#[derive(Debug, Clone)]
pub struct SpanQueryBuilder {
    field: String,
}

impl SpanQueryBuilder {
    /// Create a new span query builder.
    pub fn new<F: Into<String>>(field: F) -> Self {
        SpanQueryBuilder {
            field: field.into(),
        }
    }

    /// Get the field of the built queries.
    pub fn field(&self) -> &str {
        &self.field
    }

    /// Create a span term query.
    pub fn term<T: Into<String>>(&self, term: T) -> SpanTermQuery {
        SpanTermQuery::new(&self.field, term)
    }

    /// Create a span near query.
    pub fn near(
        &self,
        clauses: Vec<Box<dyn SpanQuery>>,
        slop: u32,
        in_order: bool,
    ) -> Result<SpanNearQuery> {
        SpanNearQuery::new(&self.field, clauses, slop, in_order)
    }

    /// Create a span first query.
    pub fn first(&self, matcher: Box<dyn SpanQuery>, end: Position) -> Result<SpanFirstQuery> {
        check_field(&self.field, matcher.as_ref())?;
        Ok(SpanFirstQuery::new(matcher, end))
    }

    /// Create a span not query.
    pub fn not(
        &self,
        include: Box<dyn SpanQuery>,
        exclude: Box<dyn SpanQuery>,
    ) -> Result<SpanNotQuery> {
        SpanNotQuery::new(&self.field, include, exclude)
    }

    /// Create a span or query.
    pub fn or(&self, clauses: Vec<Box<dyn SpanQuery>>) -> Result<SpanOrQuery> {
        SpanOrQuery::new(&self.field, clauses)
    }

    /// Create a span containing query.
    pub fn containing(
        &self,
        big: Box<dyn SpanQuery>,
        little: Box<dyn SpanQuery>,
    ) -> Result<SpanContainingQuery> {
        SpanContainingQuery::new(&self.field, big, little)
    }

    /// Create a span within query.
    pub fn within(
        &self,
        little: Box<dyn SpanQuery>,
        big: Box<dyn SpanQuery>,
    ) -> Result<SpanWithinQuery> {
        SpanWithinQuery::new(&self.field, little, big)
    }

    /// Create a phrase query using span near with zero slop.
    pub fn phrase(&self, terms: Vec<String>) -> Result<SpanNearQuery> {
        self.near(self.term_clauses(terms), 0, true)
    }

    /// Create a proximity query using span near.
    pub fn proximity(&self, terms: Vec<String>, slop: u32) -> Result<SpanNearQuery> {
        self.near(self.term_clauses(terms), slop, false)
    }

    fn term_clauses(&self, terms: Vec<String>) -> Vec<Box<dyn SpanQuery>> {
        terms
            .into_iter()
            .map(|term| Box::new(self.term(term)) as Box<dyn SpanQuery>)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::analyzer::SimpleAnalyzer;
    use crate::document::Document;
    use crate::index::segment::SegmentBuilder;

    const FIELD: &str = "field";

    fn segment(texts: &[&str]) -> Segment {
        let analyzer = SimpleAnalyzer::whitespace();
        let mut builder = SegmentBuilder::new(0, 0);
        for text in texts {
            builder
                .add_document(Document::builder().add_text(FIELD, *text).build(), &analyzer)
                .unwrap();
        }
        builder.build().unwrap()
    }

    fn fox_segment() -> Segment {
        segment(&[
            "the quick brown fox jumps over the lazy dog",
            "the quick red fox jumps over the sleepy cat",
        ])
    }

    fn term(text: &str) -> Box<dyn SpanQuery> {
        Box::new(SpanTermQuery::new(FIELD, text))
    }

    fn spans(query: &dyn SpanQuery, doc_id: DocId, segment: &Segment) -> Vec<(u32, u32)> {
        query
            .get_spans(doc_id, segment)
            .unwrap()
            .into_iter()
            .map(|span| (span.start, span.end))
            .collect()
    }

    /// Documents of the segment that actually have spans.
    fn matching_docs(query: &dyn SpanQuery, segment: &Segment) -> Vec<DocId> {
        query
            .candidate_docs(segment)
            .unwrap()
            .into_iter()
            .filter(|&doc_id| !query.get_spans(doc_id, segment).unwrap().is_empty())
            .collect()
    }

    #[test]
    fn test_span_term_query() {
        let segment = fox_segment();
        let query = SpanTermQuery::new(FIELD, "the");

        assert_eq!(query.term(), "the");
        assert_eq!(query.candidate_docs(&segment).unwrap(), vec![0, 1]);
        assert_eq!(spans(&query, 0, &segment), vec![(0, 1), (6, 7)]);

        let missing = SpanTermQuery::new(FIELD, "wolf");
        assert!(missing.candidate_docs(&segment).unwrap().is_empty());
        assert!(spans(&missing, 0, &segment).is_empty());
    }

    #[test]
    fn test_ordered_near_respects_slop() {
        let segment = fox_segment();
        let clauses = || vec![term("quick"), term("brown"), term("dog")];

        let tight = SpanNearQuery::new(FIELD, clauses(), 4, true).unwrap();
        assert!(matching_docs(&tight, &segment).is_empty());

        let loose = SpanNearQuery::new(FIELD, clauses(), 5, true).unwrap();
        assert_eq!(matching_docs(&loose, &segment), vec![0]);
        assert_eq!(spans(&loose, 0, &segment), vec![(1, 9)]);
    }

    #[test]
    fn test_ordered_near_rejects_reverse_order() {
        let segment = fox_segment();
        let query = SpanNearQuery::new(FIELD, vec![term("fox"), term("quick")], 10, true).unwrap();
        assert!(matching_docs(&query, &segment).is_empty());
    }

    #[test]
    fn test_unordered_near() {
        let segment = fox_segment();
        let query = SpanNearQuery::new(FIELD, vec![term("lazy"), term("fox")], 3, false).unwrap();

        assert_eq!(matching_docs(&query, &segment), vec![0]);
        assert_eq!(spans(&query, 0, &segment), vec![(3, 8)]);

        let too_tight =
            SpanNearQuery::new(FIELD, vec![term("lazy"), term("fox")], 2, false).unwrap();
        assert!(matching_docs(&too_tight, &segment).is_empty());
    }

    #[test]
    fn test_near_matches_both_documents() {
        let segment = fox_segment();
        let quick_fox =
            SpanNearQuery::new(FIELD, vec![term("quick"), term("fox")], 1, true).unwrap();

        assert_eq!(matching_docs(&quick_fox, &segment), vec![0, 1]);
        assert_eq!(spans(&quick_fox, 1, &segment), vec![(1, 4)]);
    }

    #[test]
    fn test_span_not_query() {
        let segment = fox_segment();
        let quick_fox =
            SpanNearQuery::new(FIELD, vec![term("quick"), term("fox")], 1, true).unwrap();
        let query = SpanNotQuery::new(FIELD, Box::new(quick_fox), term("red")).unwrap();

        assert_eq!(matching_docs(&query, &segment), vec![0]);
    }

    #[test]
    fn test_span_first_query() {
        let segment = fox_segment();

        let query = SpanFirstQuery::new(term("brown"), 2);
        assert!(matching_docs(&query, &segment).is_empty());

        let query = SpanFirstQuery::new(term("brown"), 3);
        assert_eq!(query.end(), 3);
        assert_eq!(matching_docs(&query, &segment), vec![0]);
    }

    #[test]
    fn test_span_or_query_keeps_duplicates() {
        let segment = fox_segment();
        let query = SpanOrQuery::new(FIELD, vec![term("lazy"), term("cat"), term("lazy")]).unwrap();

        assert_eq!(query.candidate_docs(&segment).unwrap(), vec![0, 1]);
        assert_eq!(spans(&query, 0, &segment), vec![(7, 8), (7, 8)]);
        assert_eq!(spans(&query, 1, &segment), vec![(8, 9)]);
    }

    #[test]
    fn test_containing_and_within() {
        let segment = segment(&[
            "the quick brown fox and red fox jump over the lazy dog",
            "the quick red fox jumps over the sleepy cat",
        ]);
        let builder = SpanQueryBuilder::new(FIELD);
        let red_fox = builder.phrase(vec!["red".into(), "fox".into()]).unwrap();
        let lazy_dog = builder.phrase(vec!["lazy".into(), "dog".into()]).unwrap();
        let big = builder
            .near(vec![red_fox.clone_box(), lazy_dog.clone_box()], 10, true)
            .unwrap();

        let containing = builder.containing(big.clone_box(), term("over")).unwrap();
        assert_eq!(matching_docs(&containing, &segment), vec![0]);
        assert_eq!(spans(&containing, 0, &segment), vec![(5, 12)]);

        let little = builder
            .or(vec![red_fox.clone_box(), lazy_dog.clone_box()])
            .unwrap();
        let within = builder.within(Box::new(little), big.clone_box()).unwrap();
        assert_eq!(within.candidate_docs(&segment).unwrap(), vec![0]);
        assert_eq!(spans(&within, 0, &segment), vec![(5, 7), (10, 12)]);
    }

    #[test]
    fn test_composite_rejects_other_field() {
        let other = Box::new(SpanTermQuery::new("title", "fox")) as Box<dyn SpanQuery>;
        assert!(matches!(
            SpanNearQuery::new(FIELD, vec![term("red"), other.clone()], 0, true),
            Err(SpanmarkError::Query(_))
        ));
        assert!(SpanOrQuery::new(FIELD, vec![other.clone()]).is_err());
        assert!(SpanNotQuery::new(FIELD, term("red"), other.clone()).is_err());
        assert!(SpanQueryBuilder::new(FIELD).first(other, 3).is_err());
        assert!(SpanNearQuery::new(FIELD, vec![], 0, true).is_err());
    }

    #[test]
    fn test_span_query_builder() {
        let builder = SpanQueryBuilder::new("content");

        let term_query = builder.term("hello");
        assert_eq!(term_query.field_name(), "content");
        assert_eq!(term_query.term(), "hello");

        let phrase_query = builder
            .phrase(vec!["hello".to_string(), "world".to_string()])
            .unwrap();
        assert_eq!(phrase_query.slop(), 0);
        assert!(phrase_query.is_in_order());
        assert_eq!(phrase_query.clauses().len(), 2);

        let proximity_query = builder
            .proximity(vec!["hello".to_string(), "world".to_string()], 10)
            .unwrap();
        assert_eq!(proximity_query.slop(), 10);
        assert!(!proximity_query.is_in_order());
    }

    #[test]
    fn test_sorted_set_helpers() {
        assert_eq!(intersect_sorted(&[1, 3, 5, 7], &[3, 4, 7]), vec![3, 7]);
        assert_eq!(union_sorted(&[1, 5], &[2, 5, 9]), vec![1, 2, 5, 9]);
    }
}
