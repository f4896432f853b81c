//! # ledgershell executor
//!
//! The transaction batching and session state machine behind the shell.
//!
//! A raw input line flows through four stages:
//!
//! ```text
//! line ─► split ─► build_units ─► TransactionRunner ─► ResultSink
//!                     ▲                 │
//!                     └── ShellState ◄──┘
//! ```
//!
//! - [`split_statements`] cuts a line on `;` and [`Token::classify`]
//!   recognizes `start`, `commit` and `abort`
//! - [`build_units`] groups tokens into [`TransactionUnit`]s, rejecting
//!   illegal sequencing with `Error::QuerySyntax`
//! - [`TransactionRunner`] executes units against a `SessionProvider`,
//!   parking an unfinished transaction in [`ShellState`]
//! - [`ShellCore`] routes a line to the transaction path, to single
//!   statement auto-commit execution, or rejects a stray keyword
//!
//! ## Quick Start
//!
//! ```text
//! use ledgershell_executor::{DiscardSink, Prompt, ShellCore};
//!
//! let mut shell = ShellCore::new(ledger, Prompt::new("$LEDGER$ACTIVE_TRANSACTION> ", "people"));
//! shell.process_line("start", &mut DiscardSink)?;
//! shell.process_line("insert into t value {'a': 1}", &mut DiscardSink)?;
//! shell.process_line("commit", &mut DiscardSink)?;
//! ```
//!
//! ## Worker threads
//!
//! [`WorkerProvider`] wraps any cloneable provider so that every
//! transaction runs on its own [`TransactionWorker`] thread, driven by
//! [`Command`] requests over channels.

#![warn(missing_docs)]

mod batch;
mod runner;
mod shell;
mod split;
mod state;
mod unit;
mod worker;

#[cfg(test)]
mod tests;

pub use batch::{build_units, parse_line, NESTED_START, STATEMENT_BEFORE_START};
pub use runner::{DiscardSink, ResultSink, TransactionRunner};
pub use shell::{route, LineOutcome, Route, ShellCore, AUTO_COMMIT_DISABLED};
pub use split::{split_statements, strip_terminator, Keyword, Token, TERMINATOR};
pub use state::{Prompt, ShellState, DEFAULT_PROMPT};
pub use unit::{Outcome, TransactionUnit};
pub use worker::{
    Command, Output, Request, Response, TransactionWorker, WorkerProvider, WorkerSession,
};

pub use ledgershell_core::{Error, Result};
