//! Transaction runner.
//!
//! Drives [`TransactionUnit`]s against a [`SessionProvider`], moving the
//! session and transaction handle in and out of [`ShellState`]. A unit that
//! resolves (commit or abort) releases both; a unit left open parks its
//! transaction in the state for the next input line.

use std::time::{Duration, Instant};

use ledgershell_core::{
    Error, Result, Session, SessionProvider, StatementResults, TransactionHandle,
};

use crate::state::ShellState;
use crate::unit::{Outcome, TransactionUnit};

/// Receives statement results as they are produced.
pub trait ResultSink {
    /// Format and emit the results of one statement.
    fn emit(&mut self, statement: &str, results: StatementResults, elapsed: Duration) -> Result<()>;

    /// Called after a transaction was committed or aborted.
    fn transaction_resolved(&mut self, _transaction_id: &str, _outcome: Outcome) {}
}

/// A sink that drops everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct DiscardSink;

impl ResultSink for DiscardSink {
    fn emit(&mut self, _: &str, results: StatementResults, _: Duration) -> Result<()> {
        results.for_each(drop);
        Ok(())
    }
}

/// Executes transaction units in order.
pub struct TransactionRunner<'p, P: SessionProvider> {
    provider: &'p P,
}

impl<'p, P: SessionProvider> TransactionRunner<'p, P> {
    /// Create a runner over `provider`.
    pub fn new(provider: &'p P) -> Self {
        Self { provider }
    }

    /// Run every unit in order, stopping at the first failure.
    ///
    /// On failure the in-flight transaction has been aborted and `state`
    /// holds neither a transaction nor a session.
    pub fn run(
        &self,
        state: &mut ShellState<P::Session>,
        units: Vec<TransactionUnit>,
        sink: &mut dyn ResultSink,
    ) -> Result<()> {
        for unit in units {
            self.run_unit(state, unit, sink)?;
        }
        Ok(())
    }

    fn run_unit(
        &self,
        state: &mut ShellState<P::Session>,
        unit: TransactionUnit,
        sink: &mut dyn ResultSink,
    ) -> Result<()> {
        if !state.has_session() {
            state.hold_session(self.provider.get_session()?);
        }

        let mut tx = match state.take_transaction() {
            Some(tx) => tx,
            None => match self.start(state) {
                Ok(tx) => tx,
                Err(e) => {
                    state.release_session();
                    return Err(e);
                }
            },
        };

        if unit.is_start() {
            state.open(tx);
            return Ok(());
        }

        for statement in unit.statements() {
            tracing::debug!(
                target: "ledgershell::runner",
                transaction_id = %tx.id(),
                statement = %statement,
                "Executing statement"
            );
            let started = Instant::now();
            let executed = tx
                .execute_statement(statement)
                .and_then(|results| sink.emit(statement, results, started.elapsed()));
            if let Err(e) = executed {
                abort_after_failure(&mut tx, &e);
                state.close();
                state.release_session();
                return Err(e);
            }
        }

        let Some(outcome) = unit.outcome() else {
            state.open(tx);
            return Ok(());
        };

        let id = tx.id().to_string();
        let resolved = match outcome {
            Outcome::Commit => tx.commit(),
            Outcome::Abort => tx.abort(),
        };
        if let Err(e) = resolved {
            if outcome == Outcome::Commit {
                abort_after_failure(&mut tx, &e);
            }
            state.close();
            state.release_session();
            return Err(e);
        }

        tracing::info!(
            target: "ledgershell::runner",
            transaction_id = %id,
            "Transaction with transaction_id {} {}",
            id,
            outcome.past_tense()
        );
        sink.transaction_resolved(&id, outcome);
        state.release_session();
        Ok(())
    }

    fn start(
        &self,
        state: &mut ShellState<P::Session>,
    ) -> Result<<P::Session as Session>::Transaction> {
        let session = state
            .session_mut()
            .ok_or_else(|| Error::invalid_state("no session held while starting a transaction"))?;
        let tx = session.start_transaction()?;
        tracing::info!(
            target: "ledgershell::runner",
            transaction_id = %tx.id(),
            ledger = %self.provider.ledger_name(),
            "Transaction started"
        );
        Ok(tx)
    }
}

fn abort_after_failure<T: TransactionHandle>(tx: &mut T, cause: &Error) {
    if cause.is_transaction_expired() {
        tracing::info!(
            target: "ledgershell::runner",
            transaction_id = %tx.id(),
            "Transaction expired"
        );
    }
    match tx.abort() {
        Ok(()) => tracing::info!(
            target: "ledgershell::runner",
            transaction_id = %tx.id(),
            error = %cause,
            "Transaction aborted after failure"
        ),
        Err(e) => tracing::debug!(
            target: "ledgershell::runner",
            transaction_id = %tx.id(),
            error = %e,
            "Abort after failure did not succeed"
        ),
    }
}
