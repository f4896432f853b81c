//! Statement splitting and keyword recognition.
//!
//! A raw input line such as
//!
//! ```text
//! start; insert into t value {'a': 1}; commit;
//! ```
//!
//! is split on `;` into trimmed segments. Segments are kept verbatim (case
//! included) so statements can be echoed back; keyword comparisons are
//! case-insensitive.

use std::fmt;

/// Statement terminator and separator.
pub const TERMINATOR: char = ';';

/// Transaction control keywords.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Keyword {
    /// Open a transaction.
    Start,
    /// Commit the open transaction.
    Commit,
    /// Abort the open transaction.
    Abort,
}

impl Keyword {
    /// Recognize a keyword segment, ignoring case and surrounding whitespace.
    pub fn parse(segment: &str) -> Option<Keyword> {
        let segment = segment.trim();
        if segment.eq_ignore_ascii_case("start") {
            Some(Keyword::Start)
        } else if segment.eq_ignore_ascii_case("commit") {
            Some(Keyword::Commit)
        } else if segment.eq_ignore_ascii_case("abort") {
            Some(Keyword::Abort)
        } else {
            None
        }
    }

    /// Lower-case spelling of the keyword.
    pub fn as_str(&self) -> &'static str {
        match self {
            Keyword::Start => "start",
            Keyword::Commit => "commit",
            Keyword::Abort => "abort",
        }
    }
}

impl fmt::Display for Keyword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One classified segment of an input line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    /// A transaction control keyword.
    Keyword(Keyword),
    /// An empty or whitespace-only segment.
    Blank,
    /// Any other text, passed to the ledger as a statement.
    Statement(String),
}

impl Token {
    /// Classify a segment.
    pub fn classify(segment: &str) -> Token {
        let trimmed = segment.trim();
        if trimmed.is_empty() {
            return Token::Blank;
        }
        match Keyword::parse(trimmed) {
            Some(keyword) => Token::Keyword(keyword),
            None => Token::Statement(trimmed.to_string()),
        }
    }
}

/// Split a raw line into trimmed, non-empty statement segments.
///
/// Leading and trailing terminators are stripped first. Empty segments
/// (`a;;b`) are dropped rather than treated as no-op statements.
pub fn split_statements(line: &str) -> Vec<String> {
    line.trim()
        .trim_matches(TERMINATOR)
        .split(TERMINATOR)
        .map(str::trim)
        .filter(|segment| !segment.is_empty())
        .map(str::to_string)
        .collect()
}

/// Strip surrounding whitespace and trailing terminators from a single statement.
pub fn strip_terminator(statement: &str) -> &str {
    statement.trim().trim_end_matches(TERMINATOR).trim_end()
}
