//! The shell loop.
//!
//! Each tick renders the prompt, reads one line and dispatches it: a
//! backslash command (or bare `help` / `quit`) goes to the meta handler,
//! anything else to [`ShellCore::process_line`]. Ctrl-C discards the
//! pending input. Ctrl-D aborts an open transaction, or exits.

use rustyline::error::ReadlineError;

use ledgershell_core::{Error, SessionProvider};
use ledgershell_executor::{strip_terminator, LineOutcome, Prompt, ShellCore};

use crate::environment::Environment;
use crate::format::ConsoleSink;
use crate::parse::{is_bare_meta, parse_meta, MetaCommand, SetCommand};
use crate::ui::{readline_error, Ui};

/// What the outer program loop should do once a [`Repl`] returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgramFlow {
    /// Exit the process with this code.
    Exit(i32),
    /// Rebuild the provider from the environment and run again.
    Restart,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TickFlow {
    Again,
    Restart,
    Exit,
}

pub const HELP_TEXT: &str = r"Keys
  Enter     Run the line. Several statements may be joined with ';'.
  Ctrl-C    Discard the current input.
  Ctrl-D    Abort the open transaction, or quit when none is open.

Transactions
  start     Open a transaction. Following lines run inside it.
  commit    Commit the open transaction.
  abort     Abort the open transaction.
  A whole transaction fits on one line: start; <statement>; commit

  Outside a transaction each statement runs on its own (auto-commit),
  unless auto-commit is off.

Commands
  help, \help, ?            Show this text.
  quit, exit, \quit         Leave the shell.
  \env                      Show settings and where each was set.
  \status                   Show ledger, region, endpoint and transaction.
  \set edit-mode emacs|vi
  \set terminator-required true|false
  \set auto-commit on|off
  \set query-stats on|off
  \use -l LEDGER [-r REGION] [-p PROFILE] [-s ENDPOINT]
                            Switch ledger. An open transaction is aborted.";

/// Printed once at startup in interactive mode.
pub fn welcome_text(ledger: &str) -> String {
    format!(
        "Welcome to ledgershell {}.\n\
         Connected to ledger '{}'. Enter 'start' to begin a transaction, \
         'help' for commands, or press CTRL-D to quit.",
        env!("CARGO_PKG_VERSION"),
        ledger
    )
}

/// One connected run of the shell loop.
pub struct Repl<'a, P: SessionProvider> {
    env: &'a mut Environment,
    ui: &'a mut dyn Ui,
    core: ShellCore<P>,
    failed: bool,
    fatal: bool,
}

impl<'a, P: SessionProvider> Repl<'a, P> {
    pub fn new(env: &'a mut Environment, ui: &'a mut dyn Ui, provider: P) -> Self {
        let mut prompt = Prompt::new(env.prompt(), env.ledger());
        if let Some(region) = env.region() {
            prompt = prompt.with_region(region);
        }
        let core = ShellCore::new(provider, prompt).with_auto_commit(env.auto_commit());
        Self {
            env,
            ui,
            core,
            failed: false,
            fatal: false,
        }
    }

    /// Run until the user quits, input ends or a `\use` asks for a restart.
    pub fn run(mut self) -> ProgramFlow {
        let flow = loop {
            match self.tick() {
                TickFlow::Again => {}
                TickFlow::Restart => break ProgramFlow::Restart,
                TickFlow::Exit => break ProgramFlow::Exit(self.exit_code()),
            }
        };
        self.core.shutdown();
        flow
    }

    fn exit_code(&self) -> i32 {
        if self.fatal || (self.failed && !self.env.is_interactive()) {
            1
        } else {
            0
        }
    }

    fn tick(&mut self) -> TickFlow {
        self.ui.set_prompt(self.core.prompt_text().to_string());
        match self.ui.user_input() {
            Ok(line) => {
                tracing::trace!(target: "ledgershell::shell", line = %line, "User input");
                self.handle_line(&line)
            }
            Err(ReadlineError::Interrupted) => {
                if self.env.display_ctrl_signals() {
                    self.ui.println("CTRL-C");
                }
                TickFlow::Again
            }
            Err(ReadlineError::Eof) => self.handle_break(),
            Err(e) => {
                self.ui.warn(&format!("Error: {}", readline_error(e)));
                self.failed = true;
                TickFlow::Exit
            }
        }
    }

    fn handle_line(&mut self, line: &str) -> TickFlow {
        let trimmed = strip_terminator(line);
        if trimmed.is_empty() {
            return TickFlow::Again;
        }
        if let Some(command) = trimmed.strip_prefix('\\') {
            return self.handle_meta(command);
        }
        if is_bare_meta(trimmed) {
            return self.handle_meta(trimmed);
        }

        let mut sink = ConsoleSink::new(&mut *self.ui, self.env.format(), self.env.query_stats());
        match self.core.process_line(line, &mut sink) {
            Ok(LineOutcome::Skipped | LineOutcome::Executed) => TickFlow::Again,
            Ok(LineOutcome::Notice(message)) => {
                self.ui.println(&message);
                TickFlow::Again
            }
            Err(e) => self.report(e),
        }
    }

    fn handle_break(&mut self) -> TickFlow {
        if self.env.display_ctrl_signals() {
            self.ui.println("CTRL-D");
        }
        if !self.core.state().is_interactive() {
            return TickFlow::Exit;
        }
        match self.core.abort_open_transaction() {
            Ok(Some(id)) => {
                self.ui.println(&format!("Transaction {} aborted.", id));
                TickFlow::Again
            }
            Ok(None) => TickFlow::Again,
            Err(e) => self.report(e),
        }
    }

    fn report(&mut self, error: Error) -> TickFlow {
        self.failed = true;
        let message = match &error {
            Error::QuerySyntax { reason } => format!("Error in query: {}", reason),
            e if e.is_transaction_expired() => "Transaction expired.".to_string(),
            Error::Remote { message, .. } => format!("Error in query: {}", message),
            Error::Connectivity { .. } => {
                self.ui.warn(&error.to_string());
                self.fatal = true;
                return TickFlow::Exit;
            }
            other => other.to_string(),
        };
        self.ui.warn(&message);
        TickFlow::Again
    }

    fn handle_meta(&mut self, command: &str) -> TickFlow {
        let command = match parse_meta(command) {
            Ok(command) => command,
            Err(e) => return self.report(e),
        };
        match command {
            MetaCommand::Help => self.ui.println(HELP_TEXT),
            MetaCommand::Quit => return TickFlow::Exit,
            MetaCommand::Env => {
                let text = self.env.to_string();
                self.ui.println(text.trim_end());
            }
            MetaCommand::Status => {
                let status = self.status();
                self.ui.println(&status);
            }
            MetaCommand::Set(set) => self.apply_set(set),
            MetaCommand::Use(command) => {
                if let Err(e) = self.env.apply_use(&command) {
                    return self.report(e);
                }
                if let Err(e) = self.core.abort_open_transaction() {
                    tracing::warn!(
                        target: "ledgershell::shell",
                        error = %e,
                        "Abort before switching ledger failed"
                    );
                }
                tracing::info!(
                    target: "ledgershell::shell",
                    ledger = %self.env.ledger(),
                    "Switching ledger"
                );
                return TickFlow::Restart;
            }
        }
        TickFlow::Again
    }

    fn apply_set(&mut self, set: SetCommand) {
        self.env.apply_set(&set);
        match set {
            SetCommand::EditMode(mode) => self.ui.set_edit_mode(mode),
            SetCommand::TerminatorRequired(required) => self.ui.set_terminator_required(required),
            SetCommand::AutoCommit(enabled) => self.core.set_auto_commit(enabled),
            SetCommand::QueryStats(_) => {}
        }
    }

    fn status(&self) -> String {
        format!(
            "Region: {}, Ledger: {}, Endpoint: {}, Shell version: {}, Transaction: {}",
            self.env.region().unwrap_or("-"),
            self.core.provider().ledger_name(),
            self.env.session_endpoint().unwrap_or("-"),
            env!("CARGO_PKG_VERSION"),
            self.core.state().transaction_id().unwrap_or("none"),
        )
    }
}
