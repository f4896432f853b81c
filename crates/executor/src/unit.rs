//! Transaction units: one parsed transaction's statements plus its outcome.

use crate::split::Keyword;

/// How a transaction unit is resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Outcome {
    /// Commit the transaction.
    Commit,
    /// Abort the transaction.
    Abort,
}

impl Outcome {
    /// The keyword that produces this outcome.
    pub fn keyword(&self) -> Keyword {
        match self {
            Outcome::Commit => Keyword::Commit,
            Outcome::Abort => Keyword::Abort,
        }
    }

    /// Past-tense verb used in log and status lines.
    pub fn past_tense(&self) -> &'static str {
        match self {
            Outcome::Commit => "committed",
            Outcome::Abort => "aborted",
        }
    }
}

/// One logical transaction parsed from an input line.
///
/// A unit without an outcome is still open and continues on a later line.
/// Units are built by [`crate::build_units`] and consumed once by the
/// runner.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransactionUnit {
    statements: Vec<String>,
    outcome: Option<Outcome>,
}

impl TransactionUnit {
    /// An empty, unresolved unit.
    pub fn new() -> Self {
        Self::default()
    }

    /// A unit with the given statements and outcome.
    pub fn with(statements: Vec<String>, outcome: Option<Outcome>) -> Self {
        Self {
            statements,
            outcome,
        }
    }

    /// Append a statement.
    pub fn push_statement(&mut self, statement: impl Into<String>) {
        self.statements.push(statement.into());
    }

    /// Resolve the unit.
    pub fn set_outcome(&mut self, outcome: Outcome) {
        self.outcome = Some(outcome);
    }

    /// Statements in execution order.
    pub fn statements(&self) -> &[String] {
        &self.statements
    }

    /// The terminal outcome, if any.
    pub fn outcome(&self) -> Option<Outcome> {
        self.outcome
    }

    /// True for a bare `start`: no statements and no outcome yet.
    pub fn is_start(&self) -> bool {
        self.outcome.is_none() && self.statements.is_empty()
    }

    /// True when the unit carries statements but no outcome yet.
    pub fn is_open(&self) -> bool {
        self.outcome.is_none() && !self.statements.is_empty()
    }

    /// True once the unit has a commit or abort outcome.
    pub fn is_resolved(&self) -> bool {
        self.outcome.is_some()
    }
}
