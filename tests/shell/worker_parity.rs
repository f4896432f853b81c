//! The worker-thread variant must sequence transactions exactly like the
//! direct path.

use crate::common::*;
use ledgershell::{
    Error, MemoryLedger, Outcome, Prompt, ShellCore, WorkerProvider, BAD_REQUEST_CODE,
};

const SCRIPT: &[&str] = &[
    "start; insert a; commit",
    "start",
    "insert b",
    "insert c; commit",
    "start; insert d; abort",
    "select * from t",
    "start; insert e",
    "abort",
];

struct Run {
    statements: Vec<Vec<String>>,
    outcomes: Vec<Outcome>,
    emitted: Vec<String>,
    commits: usize,
    aborts: usize,
}

fn run_direct(lines: &[&str]) -> Run {
    let ledger = MemoryLedger::new("people");
    let mut shell = ShellCore::new(ledger.clone(), Prompt::default());
    let mut sink = RecordingSink::default();
    feed(&mut shell, &mut sink, lines).unwrap();
    drop(shell);
    summarize(&ledger, sink)
}

fn run_worker(lines: &[&str]) -> Run {
    let ledger = MemoryLedger::new("people");
    let mut shell = ShellCore::new(WorkerProvider::new(ledger.clone()), Prompt::default());
    let mut sink = RecordingSink::default();
    feed(&mut shell, &mut sink, lines).unwrap();
    drop(shell);
    summarize(&ledger, sink)
}

fn summarize(ledger: &MemoryLedger, sink: RecordingSink) -> Run {
    assert_eq!(ledger.open_sessions(), 0);
    assert_eq!(ledger.live_transactions(), 0);
    Run {
        statements: ledger.journal().into_iter().map(|b| b.statements).collect(),
        outcomes: sink.resolved.into_iter().map(|(_, o)| o).collect(),
        emitted: sink.statements,
        commits: ledger.commit_count(),
        aborts: ledger.abort_count(),
    }
}

#[test]
fn worker_matches_direct_execution() {
    let direct = run_direct(SCRIPT);
    let worker = run_worker(SCRIPT);

    assert_eq!(worker.statements, direct.statements);
    assert_eq!(worker.outcomes, direct.outcomes);
    assert_eq!(worker.emitted, direct.emitted);
    assert_eq!(worker.commits, direct.commits);
    assert_eq!(worker.aborts, direct.aborts);
    assert_eq!(
        direct.outcomes,
        vec![Outcome::Commit, Outcome::Commit, Outcome::Abort, Outcome::Abort]
    );
}

#[test]
fn worker_propagates_remote_failure() {
    let ledger = MemoryLedger::new("people");
    let mut shell = ShellCore::new(WorkerProvider::new(ledger.clone()), Prompt::default());
    let mut sink = RecordingSink::default();
    ledger.inject_failure(Error::remote(BAD_REQUEST_CODE, "bad"));

    let err = shell.process_line("start; insert a; commit", &mut sink).unwrap_err();

    assert_eq!(err, Error::remote(BAD_REQUEST_CODE, "bad"));
    assert_eq!(ledger.abort_count(), 1);
    assert!(!shell.state().is_interactive());
}

#[test]
fn worker_transaction_spans_lines() {
    let ledger = MemoryLedger::new("people");
    let mut shell = ShellCore::new(WorkerProvider::new(ledger.clone()), Prompt::default());
    let mut sink = RecordingSink::default();

    shell.process_line("start", &mut sink).unwrap();
    let id = shell.state().transaction_id().unwrap().to_string();
    shell.process_line("insert a", &mut sink).unwrap();
    shell.process_line("commit", &mut sink).unwrap();

    let journal = ledger.journal();
    assert_eq!(journal.len(), 1);
    assert_eq!(journal[0].transaction_id, id);
}
