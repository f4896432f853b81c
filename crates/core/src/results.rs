//! Statement results returned by a session.
//!
//! A [`StatementResults`] is a single-pass cursor over the documents a
//! statement produced, plus the execution statistics the service reported
//! for it. Consuming the documents does not consume the statistics.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

/// A document returned by the ledger.
pub type Document = serde_json::Value;

/// Consumed capacity and latency the service reported for one statement.
///
/// Fields are optional because not every backend reports them.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionStats {
    /// Read I/Os consumed by the statement.
    pub read_ios: Option<u64>,
    /// Write I/Os consumed by the statement.
    pub write_ios: Option<u64>,
    /// Server-side processing time in milliseconds.
    pub processing_time_ms: Option<u64>,
}

/// Lazy, single-pass sequence of documents produced by one statement.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StatementResults {
    documents: VecDeque<Document>,
    stats: ExecutionStats,
}

impl StatementResults {
    /// Create results from documents and their statistics.
    pub fn new(documents: impl IntoIterator<Item = Document>, stats: ExecutionStats) -> Self {
        Self {
            documents: documents.into_iter().collect(),
            stats,
        }
    }

    /// Results with no documents.
    pub fn empty(stats: ExecutionStats) -> Self {
        Self::new(Vec::new(), stats)
    }

    /// Number of documents not yet consumed.
    pub fn len(&self) -> usize {
        self.documents.len()
    }

    /// Whether every document has been consumed.
    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// Statistics for the statement.
    pub fn stats(&self) -> &ExecutionStats {
        &self.stats
    }
}

impl Iterator for StatementResults {
    type Item = Document;

    fn next(&mut self) -> Option<Document> {
        self.documents.pop_front()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.documents.len(), Some(self.documents.len()))
    }
}

impl ExactSizeIterator for StatementResults {}
