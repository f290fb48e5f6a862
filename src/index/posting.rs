//! Positional posting lists.
//!
//! A posting list records, for one term of one field, every document that
//! contains the term together with the sorted positions of its occurrences.

use crate::span::interval::{DocId, Position};

/// A single posting in a posting list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Posting {
    /// Document ID.
    pub doc_id: DocId,
    /// Positions of the term in the document, ascending.
    pub positions: Vec<Position>,
}

impl Posting {
    /// Create a posting with no positions yet.
    pub fn new(doc_id: DocId) -> Self {
        Posting {
            doc_id,
            positions: Vec::new(),
        }
    }

    /// Add a position to this posting, keeping the positions sorted and unique.
    pub fn add_position(&mut self, position: Position) {
        if let Err(index) = self.positions.binary_search(&position) {
            self.positions.insert(index, position);
        }
    }

    /// Get the positions.
    pub fn positions(&self) -> &[Position] {
        &self.positions
    }
}

/// A posting list for a specific term.
#[derive(Debug, Clone)]
pub struct PostingList {
    /// The term this posting list represents.
    pub term: String,
    /// The postings in this list, ordered by document id.
    pub postings: Vec<Posting>,
}

impl PostingList {
    /// Create a new empty posting list.
    pub fn new(term: String) -> Self {
        PostingList {
            term,
            postings: Vec::new(),
        }
    }

    /// Record one occurrence of the term.
    pub fn add_occurrence(&mut self, doc_id: DocId, position: Position) {
        match self.postings.binary_search_by_key(&doc_id, |p| p.doc_id) {
            Ok(index) => self.postings[index].add_position(position),
            Err(index) => {
                let mut posting = Posting::new(doc_id);
                posting.add_position(position);
                self.postings.insert(index, posting);
            }
        }
    }

    /// Find the posting of a document.
    pub fn posting(&self, doc_id: DocId) -> Option<&Posting> {
        self.postings
            .binary_search_by_key(&doc_id, |p| p.doc_id)
            .ok()
            .map(|index| &self.postings[index])
    }

    /// Ids of all documents in this list, ascending.
    pub fn doc_ids(&self) -> Vec<DocId> {
        self.postings.iter().map(|p| p.doc_id).collect()
    }

    /// Number of documents containing the term.
    pub fn len(&self) -> usize {
        self.postings.len()
    }

    /// Check if the posting list is empty.
    pub fn is_empty(&self) -> bool {
        self.postings.is_empty()
    }
}
