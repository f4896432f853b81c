//! Common test utilities for shell tests

use std::time::Duration;

use ledgershell::{
    Document, MemoryLedger, Outcome, Prompt, ResultSink, Result, SessionProvider, ShellCore,
    StatementResults,
};

/// Records everything the runner emits.
#[derive(Debug, Default)]
pub struct RecordingSink {
    pub statements: Vec<String>,
    pub documents: Vec<Document>,
    pub resolved: Vec<(String, Outcome)>,
}

impl ResultSink for RecordingSink {
    fn emit(
        &mut self,
        statement: &str,
        results: StatementResults,
        _elapsed: Duration,
    ) -> Result<()> {
        self.statements.push(statement.to_string());
        self.documents.extend(results);
        Ok(())
    }

    fn transaction_resolved(&mut self, transaction_id: &str, outcome: Outcome) {
        self.resolved.push((transaction_id.to_string(), outcome));
    }
}

/// A fresh ledger and a shell connected to it.
pub fn create_shell() -> (MemoryLedger, ShellCore<MemoryLedger>) {
    let ledger = MemoryLedger::new("people");
    let shell = ShellCore::new(
        ledger.clone(),
        Prompt::new("$LEDGER$ACTIVE_TRANSACTION> ", "people"),
    );
    (ledger, shell)
}

/// Feed `lines` to `shell`, stopping at the first error.
pub fn feed<P: SessionProvider>(
    shell: &mut ShellCore<P>,
    sink: &mut RecordingSink,
    lines: &[&str],
) -> Result<()> {
    for line in lines {
        shell.process_line(line, sink)?;
    }
    Ok(())
}
