//! Transaction batch building.
//!
//! Turns the tokens of one input line into an ordered list of
//! [`TransactionUnit`]s, given whether an interactive transaction is already
//! open. Illegal keyword sequencing is rejected with
//! [`Error::QuerySyntax`] before anything is executed.
//!
//! | Line (no open tx)                   | Units                            |
//! |-------------------------------------|----------------------------------|
//! | `start`                             | `[] / open`                      |
//! | `start; a; commit`                  | `[a] / commit`                   |
//! | `start; a; commit; start; b; abort` | `[a] / commit`, `[b] / abort`    |
//! | `start; a`                          | `[a] / open`                     |
//!
//! | Line (open tx)                      | Units                            |
//! |-------------------------------------|----------------------------------|
//! | `b; commit`                         | `[b] / commit`                   |
//! | `commit`                            | `[] / commit`                    |
//! | `commit; start; c`                  | `[] / commit`, `[c] / open`      |

use ledgershell_core::{Error, Result};

use crate::split::{split_statements, Keyword, Token};
use crate::unit::{Outcome, TransactionUnit};

/// Reported when `start` is used while a transaction is open.
pub const NESTED_START: &str =
    "Transaction needs to be committed or aborted before starting new one";
/// Reported when a statement appears with no open transaction.
pub const STATEMENT_BEFORE_START: &str =
    "A statement was used before a transaction was started";

fn outcome_before_start(keyword: Keyword) -> Error {
    let name = match keyword {
        Keyword::Abort => "Abort",
        _ => "Commit",
    };
    Error::query_syntax(format!("{} used before transaction was started", name))
}

/// Build transaction units from classified tokens.
///
/// `open_tx` is a snapshot of whether an interactive transaction is open
/// when the line was entered. Nothing is mutated on failure.
pub fn build_units<I>(tokens: I, open_tx: bool) -> Result<Vec<TransactionUnit>>
where
    I: IntoIterator<Item = Token>,
{
    let mut open_tx = open_tx;
    let mut current: Option<TransactionUnit> = None;
    let mut units = Vec::new();

    for token in tokens {
        match token {
            Token::Blank => {}
            Token::Keyword(Keyword::Start) => {
                if open_tx {
                    return Err(Error::query_syntax(NESTED_START));
                }
                open_tx = true;
                current = Some(TransactionUnit::new());
            }
            Token::Keyword(keyword @ (Keyword::Commit | Keyword::Abort)) => {
                if !open_tx {
                    return Err(outcome_before_start(keyword));
                }
                let outcome = match keyword {
                    Keyword::Abort => Outcome::Abort,
                    _ => Outcome::Commit,
                };
                // A unit may be missing here when the transaction was opened
                // on an earlier line.
                let mut unit = current.take().unwrap_or_default();
                unit.set_outcome(outcome);
                units.push(unit);
                open_tx = false;
            }
            Token::Statement(statement) => {
                if !open_tx {
                    return Err(Error::query_syntax(STATEMENT_BEFORE_START));
                }
                current
                    .get_or_insert_with(TransactionUnit::new)
                    .push_statement(statement);
            }
        }
    }

    if let Some(unit) = current {
        units.push(unit);
    }
    Ok(units)
}

/// Split and build a raw input line.
pub fn parse_line(line: &str, open_tx: bool) -> Result<Vec<TransactionUnit>> {
    let tokens = split_statements(line).into_iter().map(|s| Token::classify(&s));
    build_units(tokens, open_tx)
}
