//! ledgershell - an interactive transaction shell for ledger databases
//!
//! The shell turns raw input lines into ledger transactions: lines are split
//! on `;`, grouped into transaction units by the `start` / `commit` / `abort`
//! keywords, and run against a session provider. A transaction may span
//! several input lines.
//!
//! # Quick Start
//!
//! ```ignore
//! use ledgershell::{connect, DiscardSink, LedgerTarget, Prompt, ShellCore};
//!
//! let ledger = connect(&LedgerTarget::named("vehicle-registration"))?;
//! let mut shell = ShellCore::new(ledger, Prompt::default());
//!
//! shell.process_line("start; insert into Person value {'name': 'Ana'}", &mut DiscardSink)?;
//! shell.process_line("commit", &mut DiscardSink)?;
//! ```
//!
//! # Architecture
//!
//! - `ledgershell-core`: the `Error` enum, statement results and the
//!   session provider traits
//! - `ledgershell-executor`: splitting, batch building, the transaction
//!   runner, shell state and the worker-thread variant
//! - `ledgershell-ledger`: the in-process ledger backing the binary
//!
//! The `ledgershell` binary itself lives in `crates/cli`.

pub use ledgershell_core::{
    Document, Error, ExecutionStats, Result, Session, SessionProvider, StatementResults,
    TransactionHandle, BAD_REQUEST_CODE, INVALID_SESSION_CODE,
};
pub use ledgershell_executor::*;
pub use ledgershell_ledger::{
    connect, connect_with, JournalBlock, LedgerOptions, LedgerTarget, MemoryLedger, MemorySession,
    MemoryTransaction, DEFAULT_PROFILE, DEFAULT_TRANSACTION_TIMEOUT, MEMORY_SCHEME,
};
