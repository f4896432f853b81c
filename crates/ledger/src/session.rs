//! Sessions and transactions against a [`MemoryLedger`].

use std::time::Instant;

use serde_json::json;
use uuid::Uuid;

use ledgershell_core::{
    Error, ExecutionStats, Result, Session, StatementResults, TransactionHandle,
    INVALID_SESSION_CODE,
};

use crate::ledger::MemoryLedger;

fn new_id() -> String {
    Uuid::new_v4().simple().to_string()
}

/// A session on a [`MemoryLedger`].
///
/// Dropping an unclosed session closes it.
#[derive(Debug)]
pub struct MemorySession {
    ledger: MemoryLedger,
    id: String,
    open: bool,
}

impl MemorySession {
    pub(crate) fn new(ledger: MemoryLedger) -> Self {
        Self {
            ledger,
            id: new_id(),
            open: true,
        }
    }

    /// Session identifier.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Whether [`Session::close`] has not been called yet.
    pub fn is_open(&self) -> bool {
        self.open
    }

    fn ensure_open(&self) -> Result<()> {
        if self.open {
            Ok(())
        } else {
            Err(Error::remote(
                INVALID_SESSION_CODE,
                format!("Session {} has been closed", self.id),
            ))
        }
    }
}

impl Session for MemorySession {
    type Transaction = MemoryTransaction;

    fn execute(&mut self, statement: &str) -> Result<StatementResults> {
        self.ensure_open()?;
        let mut tx = self.start_transaction()?;
        match tx.execute_statement(statement) {
            Ok(results) => {
                tx.commit()?;
                Ok(results)
            }
            Err(e) => {
                let _ = tx.abort();
                Err(e)
            }
        }
    }

    fn start_transaction(&mut self) -> Result<MemoryTransaction> {
        self.ensure_open()?;
        let tx = MemoryTransaction::new(self.ledger.clone());
        self.ledger.inner.state.lock().live.insert(tx.id.clone());
        tracing::debug!(
            target: "ledgershell::ledger",
            session = %self.id,
            transaction_id = %tx.id,
            "Transaction started"
        );
        Ok(tx)
    }

    fn close(&mut self) {
        if !self.open {
            return;
        }
        self.open = false;
        let mut state = self.ledger.inner.state.lock();
        state.open_sessions = state.open_sessions.saturating_sub(1);
        tracing::debug!(target: "ledgershell::ledger", session = %self.id, "Session closed");
    }
}

impl Drop for MemorySession {
    fn drop(&mut self) {
        self.close();
    }
}

/// A transaction on a [`MemoryLedger`].
#[derive(Debug)]
pub struct MemoryTransaction {
    ledger: MemoryLedger,
    id: String,
    started_at: Instant,
    statements: Vec<String>,
    finished: bool,
}

impl MemoryTransaction {
    fn new(ledger: MemoryLedger) -> Self {
        Self {
            ledger,
            id: new_id(),
            started_at: Instant::now(),
            statements: Vec::new(),
            finished: false,
        }
    }

    fn is_expired(&self) -> bool {
        self.started_at.elapsed() > self.ledger.options().transaction_timeout
            || self.ledger.inner.state.lock().expired.contains(&self.id)
    }

    fn ensure_usable(&self) -> Result<()> {
        if self.finished {
            return Err(Error::remote(
                INVALID_SESSION_CODE,
                format!("Transaction {} has already been committed or aborted", self.id),
            ));
        }
        if self.is_expired() {
            return Err(Error::transaction_expired(&self.id));
        }
        Ok(())
    }

    fn finish(&mut self) {
        self.finished = true;
        let mut state = self.ledger.inner.state.lock();
        state.live.remove(&self.id);
        state.expired.remove(&self.id);
    }
}

impl TransactionHandle for MemoryTransaction {
    fn id(&self) -> &str {
        &self.id
    }

    fn execute_statement(&mut self, statement: &str) -> Result<StatementResults> {
        self.ensure_usable()?;
        let started = Instant::now();
        if let Some(err) = self.ledger.inner.state.lock().injected.pop_front() {
            return Err(err);
        }
        self.statements.push(statement.to_string());
        let document = json!({
            "documentId": new_id(),
            "statement": statement,
            "transactionId": self.id,
        });
        let stats = ExecutionStats {
            read_ios: Some(1),
            write_ios: Some(0),
            processing_time_ms: Some(started.elapsed().as_millis() as u64),
        };
        Ok(StatementResults::new(vec![document], stats))
    }

    fn commit(&mut self) -> Result<()> {
        self.ensure_usable()?;
        let statements = std::mem::take(&mut self.statements);
        let sequence = {
            let mut state = self.ledger.inner.state.lock();
            state.commits += 1;
            state.append_block(&self.id, statements)
        };
        self.finish();
        tracing::debug!(
            target: "ledgershell::ledger",
            transaction_id = %self.id,
            sequence,
            "Transaction committed"
        );
        Ok(())
    }

    fn abort(&mut self) -> Result<()> {
        if self.finished {
            return Ok(());
        }
        self.statements.clear();
        self.ledger.inner.state.lock().aborts += 1;
        self.finish();
        tracing::debug!(
            target: "ledgershell::ledger",
            transaction_id = %self.id,
            "Transaction aborted"
        );
        Ok(())
    }
}

impl Drop for MemoryTransaction {
    fn drop(&mut self) {
        if !self.finished {
            self.finish();
        }
    }
}
