//! Line processing against the in-process ledger.

use crate::common::*;
use ledgershell::{Error, LineOutcome, Outcome, AUTO_COMMIT_DISABLED};

// ============================================================================
// Single-line transactions
// ============================================================================

#[test]
fn round_trip_line_commits_and_closes_session() {
    let (ledger, mut shell) = create_shell();
    let mut sink = RecordingSink::default();

    let outcome = shell
        .process_line("start; insert into t values (1); commit", &mut sink)
        .unwrap();

    assert_eq!(outcome, LineOutcome::Executed);
    let journal = ledger.journal();
    assert_eq!(journal.len(), 1);
    assert_eq!(journal[0].statements, vec!["insert into t values (1)"]);
    assert_eq!(sink.statements, vec!["insert into t values (1)"]);
    assert_eq!(sink.resolved.len(), 1);
    assert_eq!(sink.resolved[0].0, journal[0].transaction_id);
    assert_eq!(ledger.open_sessions(), 0);
    assert!(!shell.state().is_interactive());
}

#[test]
fn several_transactions_on_one_line() {
    let (ledger, mut shell) = create_shell();
    let mut sink = RecordingSink::default();

    shell
        .process_line("start; insert a; commit; start; insert b; abort", &mut sink)
        .unwrap();

    assert_eq!(ledger.commit_count(), 1);
    assert_eq!(ledger.abort_count(), 1);
    assert_eq!(ledger.journal()[0].statements, vec!["insert a"]);
    let outcomes: Vec<Outcome> = sink.resolved.iter().map(|(_, o)| *o).collect();
    assert_eq!(outcomes, vec![Outcome::Commit, Outcome::Abort]);
    assert_ne!(sink.resolved[0].0, sink.resolved[1].0);
}

#[test]
fn documents_describe_each_statement() {
    let (_ledger, mut shell) = create_shell();
    let mut sink = RecordingSink::default();

    shell
        .process_line("start; insert a; insert b; commit", &mut sink)
        .unwrap();

    assert_eq!(sink.documents.len(), 2);
    assert_eq!(sink.documents[0]["statement"], "insert a");
    assert_eq!(sink.documents[1]["statement"], "insert b");
}

// ============================================================================
// Transactions spanning lines
// ============================================================================

#[test]
fn transaction_spans_lines() {
    let (ledger, mut shell) = create_shell();
    let mut sink = RecordingSink::default();

    shell.process_line("start", &mut sink).unwrap();
    assert!(shell.state().is_interactive());
    let id = shell.state().transaction_id().unwrap().to_string();
    assert!(shell.prompt_text().contains(&id));

    shell.process_line("insert a", &mut sink).unwrap();
    shell.process_line("insert b; insert c", &mut sink).unwrap();
    assert_eq!(ledger.commit_count(), 0);

    shell.process_line("commit", &mut sink).unwrap();
    let journal = ledger.journal();
    assert_eq!(journal.len(), 1);
    assert_eq!(journal[0].transaction_id, id);
    assert_eq!(journal[0].statements, vec!["insert a", "insert b", "insert c"]);
    assert_eq!(shell.prompt_text(), "people> ");
    assert_eq!(ledger.open_sessions(), 0);
}

#[test]
fn line_may_close_one_transaction_and_open_another() {
    let (ledger, mut shell) = create_shell();
    let mut sink = RecordingSink::default();

    feed(&mut shell, &mut sink, &["start; insert a", "commit; start; insert b"]).unwrap();

    assert_eq!(ledger.commit_count(), 1);
    assert!(shell.state().is_interactive());
    assert_eq!(ledger.live_transactions(), 1);

    shell.process_line("abort", &mut sink).unwrap();
    assert_eq!(ledger.abort_count(), 1);
    assert_eq!(ledger.live_transactions(), 0);
}

#[test]
fn nested_start_leaves_transaction_open() {
    let (ledger, mut shell) = create_shell();
    let mut sink = RecordingSink::default();

    shell.process_line("start; insert a", &mut sink).unwrap();
    let err = shell.process_line("start", &mut sink).unwrap_err();

    assert!(matches!(err, Error::QuerySyntax { .. }));
    assert!(shell.state().is_interactive());
    shell.process_line("commit", &mut sink).unwrap();
    assert_eq!(ledger.journal()[0].statements, vec!["insert a"]);
}

// ============================================================================
// Routing
// ============================================================================

#[test]
fn plain_statement_runs_in_autocommit() {
    let (ledger, mut shell) = create_shell();
    let mut sink = RecordingSink::default();

    shell.process_line("select * from t;", &mut sink).unwrap();

    assert_eq!(sink.statements, vec!["select * from t"]);
    assert!(sink.resolved.is_empty());
    assert!(!shell.state().is_interactive());
    assert_eq!(ledger.open_sessions(), 0);
}

#[test]
fn autocommit_disabled_contacts_nothing() {
    let (ledger, shell) = create_shell();
    let mut shell = shell.with_auto_commit(false);
    let mut sink = RecordingSink::default();

    let err = shell.process_line("select * from t", &mut sink).unwrap_err();

    assert_eq!(err, Error::usage(AUTO_COMMIT_DISABLED));
    assert_eq!(ledger.commit_count(), 0);
    assert!(ledger.journal().is_empty());
}

#[test]
fn stray_commit_is_a_notice() {
    let (ledger, mut shell) = create_shell();
    let mut sink = RecordingSink::default();

    let outcome = shell.process_line("commit;", &mut sink).unwrap();

    assert!(matches!(outcome, LineOutcome::Notice(ref m) if m.contains("'commit'")));
    assert!(!shell.state().is_interactive());
    assert_eq!(ledger.abort_count() + ledger.commit_count(), 0);
}

#[test]
fn invalid_line_is_rejected_before_anything_runs() {
    let (ledger, mut shell) = create_shell();
    let mut sink = RecordingSink::default();

    let err = shell
        .process_line("start; insert a; commit; insert b", &mut sink)
        .unwrap_err();

    assert!(matches!(err, Error::QuerySyntax { .. }));
    assert!(sink.statements.is_empty());
    assert_eq!(ledger.commit_count(), 0);
    assert_eq!(ledger.open_sessions(), 0);
}

#[test]
fn blank_line_is_skipped() {
    let (_ledger, mut shell) = create_shell();
    let mut sink = RecordingSink::default();
    assert_eq!(shell.process_line("   ", &mut sink).unwrap(), LineOutcome::Skipped);
}

#[test]
fn shutdown_aborts_open_transaction() {
    let (ledger, mut shell) = create_shell();
    let mut sink = RecordingSink::default();

    shell.process_line("start; insert a", &mut sink).unwrap();
    let provider = shell.shutdown();

    assert_eq!(provider.abort_count(), 1);
    assert_eq!(ledger.live_transactions(), 0);
    assert_eq!(ledger.open_sessions(), 0);
}
