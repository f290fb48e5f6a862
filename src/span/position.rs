//! Position cursor over re-analyzed stored text.

use std::fmt;
use std::sync::Arc;

use crate::analysis::analyzer::Analyzer;
use crate::error::{Result, SpanmarkError};
use crate::index::reader::IndexReader;
use crate::span::cursor::{NextToken, PositionCursor, TokenScope};
use crate::span::interval::DocId;

/// Re-tokenizes stored fields with an analyzer.
///
/// The analyzer must be the one the index used for the field, otherwise the
/// token positions will not line up with the positions of the match
/// intervals. Stopped tokens that the analyzer keeps in its stream are
/// yielded too, so they appear in annotated text even though they were
/// never indexed.
pub struct AnalyzedPositionCursor {
    reader: IndexReader,
    analyzer: Arc<dyn Analyzer>,
    scope: Option<TokenScope>,
}

impl AnalyzedPositionCursor {
    /// Create a cursor reading stored text from `reader`.
    pub fn new(reader: IndexReader, analyzer: Arc<dyn Analyzer>) -> Self {
        AnalyzedPositionCursor {
            reader,
            analyzer,
            scope: None,
        }
    }

    /// The analyzer used for re-tokenizing.
    pub fn analyzer(&self) -> &Arc<dyn Analyzer> {
        &self.analyzer
    }
}

impl PositionCursor for AnalyzedPositionCursor {
    fn reset(&mut self, doc_id: DocId, field: &str) -> Result<()> {
        // Drop the previous scope even if this one cannot be opened.
        self.scope = None;

        let text = self.reader.stored_text(doc_id, field)?;
        let tokens = self.analyzer.analyze(text)?;
        self.scope = Some(TokenScope::new(doc_id, tokens));
        Ok(())
    }

    fn advance(&mut self) -> Result<NextToken> {
        match self.scope.as_mut() {
            Some(scope) => scope.next_token(),
            None => Err(SpanmarkError::protocol(
                "position cursor advanced without an open document scope",
            )),
        }
    }
}

impl fmt::Debug for AnalyzedPositionCursor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnalyzedPositionCursor")
            .field("analyzer", &self.analyzer.name())
            .field("scope", &self.scope)
            .finish()
    }
}
