//! Searching an index with span queries.

pub mod span_searcher;
