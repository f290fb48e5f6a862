//! Error types for the Spanmark library.
//!
//! All fallible operations return [`Result`], whose error side is the
//! [`SpanmarkError`] enum. Two variants belong to the span machinery itself:
//!
//! - [`SpanmarkError::MisalignedPosition`] - the token positions produced while
//!   re-tokenizing a stored field do not line up with the positions recorded in
//!   the index. Annotation of that single document is abandoned.
//! - [`SpanmarkError::ProtocolViolation`] - a cursor was driven out of order,
//!   e.g. an interval end read without a preceding interval start.
//!
//! Everything else (I/O, index lookups, analysis) propagates unchanged.
//!
//! # Examples
//!
//! ```
//! use spanmark::error::{Result, SpanmarkError};
//!
//! fn example_operation() -> Result<()> {
//!     Err(SpanmarkError::invalid_argument("min_count must be at least 1"))
//! }
//!
//! assert!(example_operation().is_err());
//! ```

use std::io;

use thiserror::Error;

use crate::span::interval::DocId;

/// The main error type for Spanmark operations.
#[derive(Error, Debug)]
pub enum SpanmarkError {
    /// I/O errors (file operations, network, etc.)
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Index-related errors
    #[error("Index error: {0}")]
    Index(String),

    /// Analysis-related errors (tokenization, filtering, etc.)
    #[error("Analysis error: {0}")]
    Analysis(String),

    /// Query-related errors (invalid clauses, field mismatches, etc.)
    #[error("Query error: {0}")]
    Query(String),

    /// Field-related errors
    #[error("Field error: {0}")]
    Field(String),

    /// Token positions disagree with the indexed span positions.
    #[error("Misaligned positions in document {doc_id}: {detail}")]
    MisalignedPosition {
        /// Document whose annotation was abandoned.
        doc_id: DocId,
        /// What was still pending or skipped.
        detail: String,
    },

    /// A cursor was used out of protocol.
    #[error("Cursor protocol violation: {0}")]
    ProtocolViolation(String),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic error for other cases
    #[error("Error: {0}")]
    Other(String),
}

/// Result type alias for operations that may fail with SpanmarkError.
pub type Result<T> = std::result::Result<T, SpanmarkError>;

impl SpanmarkError {
    /// Create a new index error.
    pub fn index<S: Into<String>>(msg: S) -> Self {
        SpanmarkError::Index(msg.into())
    }

    /// Create a new analysis error.
    pub fn analysis<S: Into<String>>(msg: S) -> Self {
        SpanmarkError::Analysis(msg.into())
    }

    /// Create a new query error.
    pub fn query<S: Into<String>>(msg: S) -> Self {
        SpanmarkError::Query(msg.into())
    }

    /// Create a new field error.
    pub fn field<S: Into<String>>(msg: S) -> Self {
        SpanmarkError::Field(msg.into())
    }

    /// Create a new misalignment error for a document.
    pub fn misaligned<S: Into<String>>(doc_id: DocId, detail: S) -> Self {
        SpanmarkError::MisalignedPosition {
            doc_id,
            detail: detail.into(),
        }
    }

    /// Create a new cursor protocol violation.
    pub fn protocol<S: Into<String>>(msg: S) -> Self {
        SpanmarkError::ProtocolViolation(msg.into())
    }

    /// Create a new invalid config error.
    pub fn invalid_config<S: Into<String>>(msg: S) -> Self {
        SpanmarkError::Other(format!("Invalid configuration: {}", msg.into()))
    }

    /// Create a new invalid argument error.
    pub fn invalid_argument<S: Into<String>>(msg: S) -> Self {
        SpanmarkError::Other(format!("Invalid argument: {}", msg.into()))
    }

    /// Create a new not found error.
    pub fn not_found<S: Into<String>>(msg: S) -> Self {
        SpanmarkError::Other(format!("Not found: {}", msg.into()))
    }

    /// Whether this error only concerns one document's position alignment.
    pub fn is_misalignment(&self) -> bool {
        matches!(self, SpanmarkError::MisalignedPosition { .. })
    }
}
