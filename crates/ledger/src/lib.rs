//! # ledgershell-ledger
//!
//! An in-process ledger that implements the session provider contract from
//! `ledgershell-core`. It backs the `ledgershell` binary when no remote
//! transport is configured, and the workspace integration tests.
//!
//! Statements are not interpreted. Each executed statement yields one
//! document describing it, and every committed transaction is appended to
//! an in-memory journal. Transactions expire after a configurable timeout,
//! matching the behavior the shell has to cope with against a real service.
//!
//! ```text
//! use ledgershell_ledger::{connect, LedgerTarget};
//!
//! let ledger = connect(&LedgerTarget::named("vehicle-registration"))?;
//! let mut session = ledger.get_session()?;
//! let mut tx = session.start_transaction()?;
//! tx.execute_statement("INSERT INTO Person VALUE {'name': 'Ana'}")?;
//! tx.commit()?;
//! session.close();
//! ```

mod ledger;
mod session;

pub use ledger::{
    JournalBlock, LedgerOptions, MemoryLedger, DEFAULT_PROFILE, DEFAULT_TRANSACTION_TIMEOUT,
};
pub use session::{MemorySession, MemoryTransaction};

use ledgershell_core::{Error, Result};

/// Endpoint scheme served in-process.
pub const MEMORY_SCHEME: &str = "memory:";

/// Where a shell wants its sessions to come from.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LedgerTarget {
    /// Ledger name.
    pub ledger: String,
    /// Region used for endpoint formation; informational in-process.
    pub region: Option<String>,
    /// Credential profile; checked against [`LedgerOptions::known_profiles`]
    /// when a session is requested.
    pub profile: Option<String>,
    /// Session endpoint override.
    pub session_endpoint: Option<String>,
}

impl LedgerTarget {
    /// Target a ledger by name with no overrides.
    pub fn named(ledger: impl Into<String>) -> Self {
        Self {
            ledger: ledger.into(),
            ..Default::default()
        }
    }
}

/// Build a provider for `target`.
///
/// Only in-process ledgers are served: the endpoint must be absent or use
/// the `memory:` scheme. Any other endpoint is unreachable from here and
/// reported as [`Error::Connectivity`].
pub fn connect(target: &LedgerTarget) -> Result<MemoryLedger> {
    connect_with(target, LedgerOptions::default())
}

/// Like [`connect`], with explicit ledger options.
pub fn connect_with(target: &LedgerTarget, options: LedgerOptions) -> Result<MemoryLedger> {
    if target.ledger.trim().is_empty() {
        return Err(Error::config("ledger must be specified"));
    }
    if let Some(endpoint) = &target.session_endpoint {
        if !endpoint.starts_with(MEMORY_SCHEME) {
            return Err(Error::connectivity(
                endpoint.clone(),
                "no transport is available for this endpoint",
            ));
        }
    }
    tracing::debug!(
        target: "ledgershell::ledger",
        ledger = %target.ledger,
        region = target.region.as_deref().unwrap_or("-"),
        profile = target.profile.as_deref().unwrap_or(DEFAULT_PROFILE),
        "Opening in-process ledger"
    );
    Ok(MemoryLedger::with_profile(
        target.ledger.clone(),
        options,
        target.profile.clone(),
    ))
}
