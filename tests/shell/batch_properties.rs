//! Batch Builder properties
//!
//! Lines are generated as balanced `start ... commit|abort` groups and fed
//! to `parse_line`, whole or cut at an arbitrary token boundary.

use ledgershell::{parse_line, Error, Keyword, Outcome, TransactionUnit};
use proptest::prelude::*;

// ============================================================================
// Generators
// ============================================================================

fn statement() -> impl Strategy<Value = String> {
    "[a-z]{1,8}( [a-z0-9]{1,6}){0,3}".prop_filter("keywords are not statements", |s| {
        Keyword::parse(s).is_none()
    })
}

fn outcome() -> impl Strategy<Value = Outcome> {
    prop_oneof![Just(Outcome::Commit), Just(Outcome::Abort)]
}

fn group() -> impl Strategy<Value = (Vec<String>, Outcome)> {
    (prop::collection::vec(statement(), 0..4), outcome())
}

fn groups() -> impl Strategy<Value = Vec<(Vec<String>, Outcome)>> {
    prop::collection::vec(group(), 1..6)
}

fn tokens(groups: &[(Vec<String>, Outcome)]) -> Vec<String> {
    let mut out = Vec::new();
    for (statements, outcome) in groups {
        out.push("start".to_string());
        out.extend(statements.iter().cloned());
        out.push(outcome.keyword().to_string());
    }
    out
}

fn resolved(units: &[TransactionUnit]) -> Vec<(Vec<String>, Outcome)> {
    units
        .iter()
        .filter_map(|u| u.outcome().map(|o| (u.statements().to_vec(), o)))
        .collect()
}

// ============================================================================
// Properties
// ============================================================================

proptest! {
    #[test]
    fn balanced_groups_yield_one_unit_each(groups in groups()) {
        let line = tokens(&groups).join("; ");
        let units = parse_line(&line, false).unwrap();
        prop_assert_eq!(units.len(), groups.len());
        prop_assert_eq!(resolved(&units), groups);
    }

    #[test]
    fn keyword_case_is_ignored(groups in groups()) {
        let line = tokens(&groups).join("; ").replace("start", "START").replace("commit", "Commit");
        let units = parse_line(&line, false).unwrap();
        prop_assert_eq!(units.len(), groups.len());
    }

    #[test]
    fn cutting_a_line_preserves_transactions(
        groups in groups(),
        cut in any::<prop::sample::Index>(),
    ) {
        let all = tokens(&groups);
        let at = cut.index(all.len() + 1);
        let first = all[..at].join("; ");
        let second = all[at..].join("; ");

        let mut units = parse_line(&first, false).unwrap();
        let open = units.last().map_or(false, |u| !u.is_resolved());
        let carried = if open { units.pop() } else { None };
        let rest = parse_line(&second, open).unwrap();

        // The first unit of the second line continues the carried one.
        let mut merged = units;
        let mut rest = rest.into_iter();
        if let Some(carried) = carried {
            let next = rest.next().unwrap_or_default();
            let mut statements = carried.statements().to_vec();
            statements.extend(next.statements().iter().cloned());
            merged.push(TransactionUnit::with(statements, next.outcome()));
        }
        merged.extend(rest);

        prop_assert_eq!(resolved(&merged), groups);
    }

    #[test]
    fn statement_before_start_is_rejected(statement in statement(), groups in groups()) {
        let line = format!("{}; {}", statement, tokens(&groups).join("; "));
        let err = parse_line(&line, false).unwrap_err();
        prop_assert!(matches!(err, Error::QuerySyntax { .. }), "expected QuerySyntax error, got {:?}", err);
    }

    #[test]
    fn blank_segments_are_ignored(groups in groups()) {
        let line = tokens(&groups).join(";  ; ");
        let units = parse_line(&line, false).unwrap();
        prop_assert_eq!(resolved(&units), groups);
    }
}

// ============================================================================
// Fixed cases
// ============================================================================

#[test]
fn bare_commit_and_abort_fail_without_open_transaction() {
    for line in ["commit", "abort", "ABORT;"] {
        let err = parse_line(line, false).unwrap_err();
        assert!(matches!(err, Error::QuerySyntax { .. }), "{}", line);
    }
}

#[test]
fn start_alone_is_a_start_unit() {
    let units = parse_line("start", false).unwrap();
    assert_eq!(units.len(), 1);
    assert!(units[0].is_start());
}

#[test]
fn round_trip_line_is_one_committed_unit() {
    let units = parse_line("start; insert into t values (1); commit", false).unwrap();
    assert_eq!(units.len(), 1);
    assert_eq!(units[0].statements(), ["insert into t values (1)"]);
    assert_eq!(units[0].outcome(), Some(Outcome::Commit));
}
