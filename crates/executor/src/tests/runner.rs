//! Runner tests: unit execution, lifecycle of session and transaction, failures.

use ledgershell_core::{Error, BAD_REQUEST_CODE};

use super::mock::{Call, FailAt, MockProvider, MockSession, RecordingSink};
use crate::{parse_line, Outcome, Prompt, ShellState, TransactionRunner, TransactionUnit};

fn state() -> ShellState<MockSession> {
    ShellState::new(Prompt::new("$LEDGER$ACTIVE_TRANSACTION> ", "mock"))
}

fn run_line(
    provider: &MockProvider,
    state: &mut ShellState<MockSession>,
    sink: &mut RecordingSink,
    line: &str,
) -> crate::Result<()> {
    let units = parse_line(line, state.is_interactive())?;
    TransactionRunner::new(provider).run(state, units, sink)
}

// =============================================================================
// Happy paths
// =============================================================================

#[test]
fn test_batch_line_executes_then_commits_then_closes() {
    let provider = MockProvider::new();
    let mut state = state();
    let mut sink = RecordingSink::default();

    run_line(&provider, &mut state, &mut sink, "start; insert into t values (1); commit").unwrap();

    assert_eq!(
        provider.calls(),
        vec![
            Call::GetSession,
            Call::Start("tx1".into()),
            Call::ExecuteStatement("insert into t values (1)".into()),
            Call::Commit("tx1".into()),
            Call::Close,
        ]
    );
    assert!(!state.is_interactive());
    assert!(!state.has_session());
    assert_eq!(sink.resolved, vec![("tx1".to_string(), Outcome::Commit)]);
}

#[test]
fn test_start_alone_opens_interactive_transaction() {
    let provider = MockProvider::new();
    let mut state = state();
    let mut sink = RecordingSink::default();

    run_line(&provider, &mut state, &mut sink, "start").unwrap();

    assert!(state.is_interactive());
    assert!(state.has_session());
    assert_eq!(state.transaction_id(), Some("tx1"));
    assert_eq!(state.prompt_text(), "mock(tx: tx1)> ");
    assert_eq!(provider.sessions_closed(), 0);
}

#[test]
fn test_transaction_spans_input_lines() {
    let provider = MockProvider::new();
    let mut state = state();
    let mut sink = RecordingSink::default();

    run_line(&provider, &mut state, &mut sink, "start").unwrap();
    run_line(&provider, &mut state, &mut sink, "insert into t value {'a': 1}").unwrap();
    assert!(state.is_interactive());
    run_line(&provider, &mut state, &mut sink, "select * from t; commit").unwrap();

    assert_eq!(provider.sessions_opened(), 1);
    assert_eq!(provider.count(|c| matches!(c, Call::Start(_))), 1);
    assert_eq!(provider.commits(), 1);
    assert_eq!(provider.sessions_closed(), 1);
    assert_eq!(sink.statements.len(), 2);
    assert!(!state.is_interactive());
    assert_eq!(state.prompt_text(), "mock> ");
}

#[test]
fn test_two_units_use_fresh_sessions() {
    let provider = MockProvider::new();
    let mut state = state();
    let mut sink = RecordingSink::default();

    run_line(&provider, &mut state, &mut sink, "start; a; commit; start; b; abort").unwrap();

    assert_eq!(provider.sessions_opened(), 2);
    assert_eq!(provider.sessions_closed(), 2);
    assert_eq!(provider.commits(), 1);
    assert_eq!(provider.aborts(), 1);
    assert_eq!(
        sink.resolved,
        vec![
            ("tx1".to_string(), Outcome::Commit),
            ("tx2".to_string(), Outcome::Abort)
        ]
    );
}

#[test]
fn test_commit_then_start_on_open_transaction() {
    let provider = MockProvider::new();
    let mut state = state();
    let mut sink = RecordingSink::default();

    run_line(&provider, &mut state, &mut sink, "start; a").unwrap();
    run_line(&provider, &mut state, &mut sink, "commit; start").unwrap();

    assert_eq!(provider.commits(), 1);
    assert!(state.is_interactive());
    assert_eq!(state.transaction_id(), Some("tx2"));
}

#[test]
fn test_empty_unit_list_touches_nothing() {
    let provider = MockProvider::new();
    let mut state = state();
    TransactionRunner::new(&provider)
        .run(&mut state, Vec::new(), &mut RecordingSink::default())
        .unwrap();
    assert!(provider.calls().is_empty());
}

// =============================================================================
// Sequencing errors never reach the provider
// =============================================================================

#[test]
fn test_bare_commit_is_syntax_error_without_provider_calls() {
    let provider = MockProvider::new();
    let mut state = state();
    let mut sink = RecordingSink::default();

    let err = run_line(&provider, &mut state, &mut sink, "commit").unwrap_err();
    assert!(matches!(err, Error::QuerySyntax { .. }));
    assert!(!state.is_interactive());
    assert!(provider.calls().is_empty());
}

#[test]
fn test_statement_after_resolved_unit_is_rejected_up_front() {
    let provider = MockProvider::new();
    let mut state = state();
    let mut sink = RecordingSink::default();

    let err = run_line(&provider, &mut state, &mut sink, "start; a; commit; b").unwrap_err();
    assert!(matches!(err, Error::QuerySyntax { .. }));
    assert!(provider.calls().is_empty());
}

#[test]
fn test_nested_start_leaves_open_transaction_alone() {
    let provider = MockProvider::new();
    let mut state = state();
    let mut sink = RecordingSink::default();

    run_line(&provider, &mut state, &mut sink, "start").unwrap();
    provider.clear_calls();

    let err = run_line(&provider, &mut state, &mut sink, "start").unwrap_err();
    assert!(matches!(err, Error::QuerySyntax { .. }));
    assert!(state.is_interactive());
    assert_eq!(state.transaction_id(), Some("tx1"));
    assert!(provider.calls().is_empty());
}

// =============================================================================
// Remote failures
// =============================================================================

#[test]
fn test_statement_failure_aborts_once_and_propagates() {
    let provider = MockProvider::new();
    let mut state = state();
    let mut sink = RecordingSink::default();
    let failure = Error::remote(BAD_REQUEST_CODE, "no such table");
    provider.fail_next(FailAt::Statement, failure.clone());

    let err = run_line(&provider, &mut state, &mut sink, "start; a; b; commit").unwrap_err();

    assert_eq!(err, failure);
    assert_eq!(provider.aborts(), 1);
    assert_eq!(provider.commits(), 0);
    // "b" never ran.
    assert_eq!(provider.count(|c| matches!(c, Call::ExecuteStatement(_))), 1);
    assert!(!state.is_interactive());
    assert!(!state.has_session());
    assert_eq!(provider.sessions_closed(), 1);
}

#[test]
fn test_failure_in_interactive_transaction_resets_state() {
    let provider = MockProvider::new();
    let mut state = state();
    let mut sink = RecordingSink::default();

    run_line(&provider, &mut state, &mut sink, "start").unwrap();
    provider.fail_next(FailAt::Statement, Error::remote(BAD_REQUEST_CODE, "bad"));
    assert!(run_line(&provider, &mut state, &mut sink, "selec").is_err());

    assert!(!state.is_interactive());
    assert_eq!(state.transaction_id(), None);
    assert_eq!(state.prompt_text(), "mock> ");
    assert_eq!(provider.aborts(), 1);
}

#[test]
fn test_expired_transaction_is_classified_and_resets_state() {
    let provider = MockProvider::new();
    let mut state = state();
    let mut sink = RecordingSink::default();

    run_line(&provider, &mut state, &mut sink, "start; a").unwrap();
    provider.fail_next(FailAt::Statement, Error::transaction_expired("tx1"));
    let err = run_line(&provider, &mut state, &mut sink, "b; commit").unwrap_err();

    assert!(err.is_transaction_expired());
    assert!(!state.is_interactive());
    assert!(!state.has_session());
}

#[test]
fn test_commit_failure_aborts_and_resets() {
    let provider = MockProvider::new();
    let mut state = state();
    let mut sink = RecordingSink::default();
    provider.fail_next(FailAt::Commit, Error::remote("OccConflictException", "conflict"));

    let err = run_line(&provider, &mut state, &mut sink, "start; a; commit").unwrap_err();

    assert!(err.is_remote());
    assert_eq!(provider.aborts(), 1);
    assert!(sink.resolved.is_empty());
    assert!(!state.has_session());
}

#[test]
fn test_start_failure_releases_session() {
    let provider = MockProvider::new();
    let mut state = state();
    provider.fail_next(FailAt::Start, Error::remote(BAD_REQUEST_CODE, "limit"));

    let units = vec![TransactionUnit::new()];
    let result =
        TransactionRunner::new(&provider).run(&mut state, units, &mut RecordingSink::default());

    assert!(result.is_err());
    assert!(!state.has_session());
    assert_eq!(provider.sessions_closed(), 1);
}

#[test]
fn test_session_failure_propagates_before_any_transaction() {
    let provider = MockProvider::new();
    let mut state = state();
    provider.fail_next(
        FailAt::GetSession,
        Error::connectivity("https://session.example", "refused"),
    );

    let err = run_line(&provider, &mut state, &mut RecordingSink::default(), "start").unwrap_err();

    assert!(err.is_fatal());
    assert_eq!(provider.calls(), vec![Call::GetSession]);
    assert!(!state.is_interactive());
}
