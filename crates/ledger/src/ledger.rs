//! Shared ledger state: journal, session accounting and test hooks.

use std::collections::{HashSet, VecDeque};
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use ledgershell_core::{Error, Result, SessionProvider};

use crate::session::MemorySession;

/// Time a transaction may stay open before the ledger expires it.
pub const DEFAULT_TRANSACTION_TIMEOUT: Duration = Duration::from_secs(30);

/// Profile accepted even when a profile list is configured.
pub const DEFAULT_PROFILE: &str = "default";

/// Tunables for a [`MemoryLedger`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerOptions {
    /// Maximum lifetime of a transaction.
    pub transaction_timeout: Duration,
    /// Credential profiles this ledger holds credentials for. `None`
    /// accepts any profile.
    pub known_profiles: Option<Vec<String>>,
}

impl Default for LedgerOptions {
    fn default() -> Self {
        Self {
            transaction_timeout: DEFAULT_TRANSACTION_TIMEOUT,
            known_profiles: None,
        }
    }
}

impl LedgerOptions {
    /// Whether sessions may be opened under `profile`.
    pub fn accepts_profile(&self, profile: &str) -> bool {
        profile == DEFAULT_PROFILE
            || self
                .known_profiles
                .as_ref()
                .map_or(true, |known| known.iter().any(|p| p == profile))
    }
}

/// One committed transaction in the journal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JournalBlock {
    /// Position in the journal, starting at 1.
    pub sequence: u64,
    /// Transaction that produced the block.
    pub transaction_id: String,
    /// Statements in execution order.
    pub statements: Vec<String>,
    /// Commit time.
    pub committed_at: DateTime<Utc>,
}

#[derive(Debug, Default)]
pub(crate) struct LedgerState {
    pub(crate) journal: Vec<JournalBlock>,
    pub(crate) open_sessions: usize,
    pub(crate) commits: usize,
    pub(crate) aborts: usize,
    pub(crate) expired: HashSet<String>,
    pub(crate) live: HashSet<String>,
    pub(crate) injected: VecDeque<Error>,
}

impl LedgerState {
    pub(crate) fn append_block(&mut self, transaction_id: &str, statements: Vec<String>) -> u64 {
        let sequence = self.journal.len() as u64 + 1;
        self.journal.push(JournalBlock {
            sequence,
            transaction_id: transaction_id.to_string(),
            statements,
            committed_at: Utc::now(),
        });
        sequence
    }
}

pub(crate) struct LedgerInner {
    pub(crate) name: String,
    pub(crate) options: LedgerOptions,
    pub(crate) profile: Option<String>,
    pub(crate) state: Mutex<LedgerState>,
}

/// An in-process ledger.
///
/// Cloning is cheap; clones share the same journal and accounting.
#[derive(Clone)]
pub struct MemoryLedger {
    pub(crate) inner: Arc<LedgerInner>,
}

impl std::fmt::Debug for MemoryLedger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryLedger")
            .field("name", &self.inner.name)
            .field("options", &self.inner.options)
            .field("profile", &self.inner.profile)
            .finish()
    }
}

impl MemoryLedger {
    /// Create an empty ledger with default options.
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_options(name, LedgerOptions::default())
    }

    /// Create an empty ledger.
    pub fn with_options(name: impl Into<String>, options: LedgerOptions) -> Self {
        Self::with_profile(name, options, None)
    }

    /// Create an empty ledger whose sessions authenticate as `profile`.
    pub fn with_profile(
        name: impl Into<String>,
        options: LedgerOptions,
        profile: Option<String>,
    ) -> Self {
        Self {
            inner: Arc::new(LedgerInner {
                name: name.into(),
                options,
                profile,
                state: Mutex::new(LedgerState::default()),
            }),
        }
    }

    /// Options this ledger was created with.
    pub fn options(&self) -> &LedgerOptions {
        &self.inner.options
    }

    /// Credential profile sessions are opened under.
    pub fn profile(&self) -> Option<&str> {
        self.inner.profile.as_deref()
    }

    /// Snapshot of the journal.
    pub fn journal(&self) -> Vec<JournalBlock> {
        self.inner.state.lock().journal.clone()
    }

    /// Sessions acquired and not yet closed.
    pub fn open_sessions(&self) -> usize {
        self.inner.state.lock().open_sessions
    }

    /// Transactions committed so far.
    pub fn commit_count(&self) -> usize {
        self.inner.state.lock().commits
    }

    /// Transactions aborted so far.
    pub fn abort_count(&self) -> usize {
        self.inner.state.lock().aborts
    }

    /// Transactions started and not yet committed or aborted.
    pub fn live_transactions(&self) -> usize {
        self.inner.state.lock().live.len()
    }

    /// Fail the next statement execution with `error`.
    ///
    /// Injected failures are consumed in FIFO order, one per execution.
    pub fn inject_failure(&self, error: Error) {
        self.inner.state.lock().injected.push_back(error);
    }

    /// Expire every live transaction now, as if its timeout had elapsed.
    pub fn expire_live_transactions(&self) {
        let mut state = self.inner.state.lock();
        let live: Vec<String> = state.live.iter().cloned().collect();
        state.expired.extend(live);
    }
}

impl SessionProvider for MemoryLedger {
    type Session = MemorySession;

    fn get_session(&self) -> Result<MemorySession> {
        if let Some(profile) = &self.inner.profile {
            if !self.inner.options.accepts_profile(profile) {
                return Err(Error::NoCredentials {
                    profile: Some(profile.clone()),
                });
            }
        }
        let mut state = self.inner.state.lock();
        state.open_sessions += 1;
        drop(state);
        let session = MemorySession::new(self.clone());
        tracing::debug!(
            target: "ledgershell::ledger",
            ledger = %self.inner.name,
            session = %session.id(),
            "Session opened"
        );
        Ok(session)
    }

    fn ledger_name(&self) -> &str {
        &self.inner.name
    }
}
