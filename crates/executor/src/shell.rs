//! Line routing and the per-line entry point used by the interactive loop.

use std::time::Instant;

use ledgershell_core::{Error, Result, Session, SessionProvider, TransactionHandle};

use crate::batch::parse_line;
use crate::runner::{ResultSink, TransactionRunner};
use crate::split::{strip_terminator, Keyword};
use crate::state::{Prompt, ShellState};

/// Reported when a statement arrives with no transaction and auto-commit is off.
pub const AUTO_COMMIT_DISABLED: &str =
    "No active transaction and not in auto-commit mode. Start a transaction with 'start'";

/// Where a line is sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    /// Split, build units and run them.
    Transaction,
    /// A lone `commit` or `abort` with nothing open.
    StrayKeyword(Keyword),
    /// Run as a single statement outside any explicit transaction.
    Autocommit,
}

/// Decide how to handle `line`.
///
/// Lines beginning with `start`, and every line while a transaction is
/// open, take the transaction path.
pub fn route(line: &str, interactive: bool) -> Route {
    let trimmed = line.trim();
    if interactive || trimmed.to_ascii_lowercase().starts_with("start") {
        return Route::Transaction;
    }
    match Keyword::parse(strip_terminator(trimmed)) {
        Some(keyword @ (Keyword::Commit | Keyword::Abort)) => Route::StrayKeyword(keyword),
        _ => Route::Autocommit,
    }
}

/// Result of processing one line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineOutcome {
    /// Blank input.
    Skipped,
    /// Statements were executed.
    Executed,
    /// Nothing executed; show this message.
    Notice(String),
}

/// Provider, shell state and auto-commit setting for one connected ledger.
pub struct ShellCore<P: SessionProvider> {
    provider: P,
    state: ShellState<P::Session>,
    auto_commit: bool,
}

impl<P: SessionProvider> ShellCore<P> {
    /// Create a core with auto-commit enabled.
    pub fn new(provider: P, prompt: Prompt) -> Self {
        Self {
            provider,
            state: ShellState::new(prompt),
            auto_commit: true,
        }
    }

    /// Builder-style auto-commit toggle.
    pub fn with_auto_commit(mut self, auto_commit: bool) -> Self {
        self.auto_commit = auto_commit;
        self
    }

    /// The provider sessions come from.
    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// Shell state.
    pub fn state(&self) -> &ShellState<P::Session> {
        &self.state
    }

    /// Current prompt text.
    pub fn prompt_text(&self) -> &str {
        self.state.prompt_text()
    }

    /// Replace the prompt template.
    pub fn set_prompt(&mut self, prompt: Prompt) {
        self.state.set_prompt(prompt);
    }

    /// Whether lone statements run outside a transaction.
    pub fn auto_commit(&self) -> bool {
        self.auto_commit
    }

    /// Change the auto-commit setting.
    pub fn set_auto_commit(&mut self, auto_commit: bool) {
        self.auto_commit = auto_commit;
    }

    /// Route and process one input line.
    ///
    /// A [`Error::QuerySyntax`] leaves the state untouched; any other error
    /// from the transaction path leaves nothing open.
    pub fn process_line(&mut self, line: &str, sink: &mut dyn ResultSink) -> Result<LineOutcome> {
        if line.trim().is_empty() {
            return Ok(LineOutcome::Skipped);
        }
        match route(line, self.state.is_interactive()) {
            Route::Transaction => self.run_transactions(line, sink),
            Route::StrayKeyword(keyword) => Ok(LineOutcome::Notice(format!(
                "'{}' can only be used on an active transaction",
                keyword
            ))),
            Route::Autocommit => self.execute_autocommit(line, sink),
        }
    }

    fn run_transactions(&mut self, line: &str, sink: &mut dyn ResultSink) -> Result<LineOutcome> {
        let units = parse_line(line, self.state.is_interactive())?;
        if units.is_empty() {
            return Ok(LineOutcome::Skipped);
        }
        let result = TransactionRunner::new(&self.provider).run(&mut self.state, units, sink);
        if let Err(e) = &result {
            if e.is_transaction_expired() {
                tracing::info!(target: "ledgershell::shell", error = %e, "Transaction expired");
            }
            self.state.close();
            self.state.release_session();
        }
        result.map(|()| LineOutcome::Executed)
    }

    /// Execute a single statement outside an explicit transaction.
    ///
    /// The session is held only for the duration of the call. Refused while
    /// an interactive transaction owns the session.
    pub fn execute_autocommit(
        &mut self,
        line: &str,
        sink: &mut dyn ResultSink,
    ) -> Result<LineOutcome> {
        if self.state.is_interactive() {
            return Err(Error::invalid_state(
                "auto-commit statement while a transaction is open",
            ));
        }
        if !self.auto_commit {
            return Err(Error::usage(AUTO_COMMIT_DISABLED));
        }
        let statement = strip_terminator(line);
        self.state.hold_session(self.provider.get_session()?);
        let started = Instant::now();
        let result = match self.state.session_mut() {
            Some(session) => session
                .execute(statement)
                .and_then(|results| sink.emit(statement, results, started.elapsed())),
            None => Err(Error::invalid_state("no session held for statement execution")),
        };
        self.state.release_session();
        result.map(|()| LineOutcome::Executed)
    }

    /// Abort the open interactive transaction, if any, and release the session.
    ///
    /// Returns the aborted transaction's id.
    pub fn abort_open_transaction(&mut self) -> Result<Option<String>> {
        let Some(mut tx) = self.state.take_transaction() else {
            self.state.release_session();
            return Ok(None);
        };
        let id = tx.id().to_string();
        let aborted = tx.abort();
        drop(tx);
        self.state.release_session();
        aborted?;
        tracing::info!(
            target: "ledgershell::shell",
            transaction_id = %id,
            "Transaction with transaction_id {} aborted",
            id
        );
        Ok(Some(id))
    }

    /// Abort anything open and hand back the provider.
    pub fn shutdown(mut self) -> P {
        if let Err(e) = self.abort_open_transaction() {
            tracing::warn!(
                target: "ledgershell::shell",
                error = %e,
                "Abort during shutdown failed"
            );
        }
        self.provider
    }
}

impl<P: SessionProvider> std::fmt::Debug for ShellCore<P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ShellCore")
            .field("ledger", &self.provider.ledger_name())
            .field("state", &self.state)
            .field("auto_commit", &self.auto_commit)
            .finish()
    }
}
