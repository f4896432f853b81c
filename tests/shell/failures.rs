//! Failure handling: remote errors, expiry and connectivity.

use std::time::Duration;

use crate::common::*;
use ledgershell::{
    connect, Error, LedgerOptions, LedgerTarget, MemoryLedger, Prompt, ShellCore,
    BAD_REQUEST_CODE,
};

#[test]
fn remote_failure_aborts_once_and_propagates() {
    let (ledger, mut shell) = create_shell();
    let mut sink = RecordingSink::default();
    ledger.inject_failure(Error::remote(BAD_REQUEST_CODE, "no such table"));

    let err = shell
        .process_line("start; select * from nope; insert a; commit", &mut sink)
        .unwrap_err();

    assert_eq!(err, Error::remote(BAD_REQUEST_CODE, "no such table"));
    assert_eq!(ledger.abort_count(), 1);
    assert_eq!(ledger.commit_count(), 0);
    assert!(sink.statements.is_empty(), "remaining statements must not run");
    assert!(!shell.state().is_interactive());
    assert_eq!(ledger.open_sessions(), 0);
}

#[test]
fn remote_failure_in_open_transaction_resets_state() {
    let (ledger, mut shell) = create_shell();
    let mut sink = RecordingSink::default();

    shell.process_line("start; insert a", &mut sink).unwrap();
    ledger.inject_failure(Error::remote(BAD_REQUEST_CODE, "bad"));
    assert!(shell.process_line("insert b", &mut sink).is_err());

    assert!(!shell.state().is_interactive());
    assert_eq!(ledger.live_transactions(), 0);

    // The next line starts from scratch.
    shell.process_line("start; insert c; commit", &mut sink).unwrap();
    assert_eq!(ledger.journal()[0].statements, vec!["insert c"]);
}

#[test]
fn expired_transaction_is_classified_and_reset() {
    let (ledger, mut shell) = create_shell();
    let mut sink = RecordingSink::default();

    shell.process_line("start", &mut sink).unwrap();
    ledger.expire_live_transactions();
    let err = shell.process_line("insert a", &mut sink).unwrap_err();

    assert!(err.is_transaction_expired());
    assert!(!shell.state().is_interactive());
    assert_eq!(shell.prompt_text(), "people> ");
    assert_eq!(ledger.open_sessions(), 0);
}

#[test]
fn timeout_expires_transaction() {
    let ledger = MemoryLedger::with_options(
        "people",
        LedgerOptions {
            transaction_timeout: Duration::from_millis(10),
            ..Default::default()
        },
    );
    let mut shell = ShellCore::new(ledger.clone(), Prompt::default());
    let mut sink = RecordingSink::default();

    shell.process_line("start", &mut sink).unwrap();
    std::thread::sleep(Duration::from_millis(30));
    let err = shell.process_line("commit", &mut sink).unwrap_err();

    assert!(err.is_transaction_expired());
    assert_eq!(ledger.commit_count(), 0);
}

#[test]
fn connectivity_failure_is_fatal() {
    let (ledger, mut shell) = create_shell();
    let mut sink = RecordingSink::default();
    ledger.inject_failure(Error::connectivity("memory://people", "reset"));

    let err = shell.process_line("start; insert a; commit", &mut sink).unwrap_err();

    assert!(err.is_fatal());
    assert_eq!(ledger.abort_count(), 1);
}

#[test]
fn unreachable_endpoint_fails_to_connect() {
    let target = LedgerTarget {
        ledger: "people".into(),
        session_endpoint: Some("https://session.ledger.example".into()),
        ..Default::default()
    };
    let err = connect(&target).unwrap_err();
    assert!(matches!(err, Error::Connectivity { .. }));
}
