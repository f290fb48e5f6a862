//! Index segments (partitions).
//!
//! A segment is an immutable slice of the index: a contiguous range of global
//! document ids, their stored fields, and the positional postings of every
//! indexed term. Span queries are evaluated one segment at a time.

use std::ops::Range;

use ahash::AHashMap;

use crate::analysis::analyzer::Analyzer;
use crate::document::Document;
use crate::error::{Result, SpanmarkError};
use crate::index::posting::PostingList;
use crate::span::interval::DocId;

/// An immutable, searchable partition of the index.
#[derive(Debug)]
pub struct Segment {
    ordinal: usize,
    doc_base: DocId,
    documents: Vec<Document>,
    fields: AHashMap<String, AHashMap<String, PostingList>>,
}

impl Segment {
    /// Position of this segment within the index.
    pub fn ordinal(&self) -> usize {
        self.ordinal
    }

    /// First document id of this segment.
    pub fn doc_base(&self) -> DocId {
        self.doc_base
    }

    /// Number of documents in this segment.
    pub fn num_docs(&self) -> usize {
        self.documents.len()
    }

    /// One past the last document id of this segment.
    pub fn max_doc(&self) -> DocId {
        self.doc_base + self.documents.len() as DocId
    }

    /// The ids covered by this segment.
    pub fn doc_ids(&self) -> Range<DocId> {
        self.doc_base..self.max_doc()
    }

    /// Whether `doc_id` belongs to this segment.
    pub fn contains(&self, doc_id: DocId) -> bool {
        self.doc_ids().contains(&doc_id)
    }

    /// Get a stored document.
    pub fn document(&self, doc_id: DocId) -> Option<&Document> {
        if !self.contains(doc_id) {
            return None;
        }
        self.documents.get((doc_id - self.doc_base) as usize)
    }

    /// Get the posting list of a term in a field.
    pub fn posting_list(&self, field: &str, term: &str) -> Option<&PostingList> {
        self.fields.get(field).and_then(|terms| terms.get(term))
    }

    /// Number of distinct terms indexed for a field.
    pub fn num_terms(&self, field: &str) -> usize {
        self.fields.get(field).map_or(0, |terms| terms.len())
    }
}

/// Accumulates documents until they are sealed into a [`Segment`].
#[derive(Debug)]
pub(crate) struct SegmentBuilder {
    ordinal: usize,
    doc_base: DocId,
    documents: Vec<Document>,
    fields: AHashMap<String, AHashMap<String, PostingList>>,
}

impl SegmentBuilder {
    pub(crate) fn new(ordinal: usize, doc_base: DocId) -> Self {
        SegmentBuilder {
            ordinal,
            doc_base,
            documents: Vec::new(),
            fields: AHashMap::new(),
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.documents.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// Analyze every field of `document` and store it; returns its id.
    pub(crate) fn add_document(
        &mut self,
        document: Document,
        analyzer: &dyn Analyzer,
    ) -> Result<DocId> {
        let doc_id = self.doc_base + self.documents.len() as DocId;

        // Analyze first so a failing field leaves the builder untouched.
        let mut occurrences = Vec::new();
        for (field, text) in document.fields() {
            for token in analyzer.analyze(text)? {
                if !token.is_indexable() {
                    continue;
                }
                occurrences.push((field.to_string(), token.text, token.position));
            }
        }

        for (field, term, position) in occurrences {
            self.fields
                .entry(field)
                .or_default()
                .entry(term.clone())
                .or_insert_with(|| PostingList::new(term))
                .add_occurrence(doc_id, position);
        }

        self.documents.push(document);
        Ok(doc_id)
    }

    pub(crate) fn build(self) -> Result<Segment> {
        if self.documents.is_empty() {
            return Err(SpanmarkError::index("cannot seal an empty segment"));
        }
        Ok(Segment {
            ordinal: self.ordinal,
            doc_base: self.doc_base,
            documents: self.documents,
            fields: self.fields,
        })
    }
}
