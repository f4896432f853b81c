//! Session provider contract.
//!
//! The shell never talks to a ledger directly. It asks a [`SessionProvider`]
//! for a [`Session`], starts a [`TransactionHandle`] on it and drives
//! statements, commit and abort through that handle. Retry and timeout
//! policy belong to the implementations, not to the shell.

use crate::error::Result;
use crate::results::StatementResults;

/// Supplies sessions against one ledger.
pub trait SessionProvider {
    /// Session type handed out by this provider.
    type Session: Session;

    /// Acquire a session. Each call returns a session the caller owns until
    /// it calls [`Session::close`].
    fn get_session(&self) -> Result<Self::Session>;

    /// Name of the ledger the sessions are bound to.
    fn ledger_name(&self) -> &str;
}

/// A logical connection that runs one or more transactions sequentially.
pub trait Session {
    /// Transaction type started by this session.
    type Transaction: TransactionHandle;

    /// Execute a single statement outside of any explicit transaction.
    fn execute(&mut self, statement: &str) -> Result<StatementResults>;

    /// Start a transaction on this session.
    fn start_transaction(&mut self) -> Result<Self::Transaction>;

    /// Release the session. Closing an already closed session is a no-op.
    fn close(&mut self);
}

/// A live transaction.
pub trait TransactionHandle {
    /// Service-assigned transaction identifier.
    fn id(&self) -> &str;

    /// Execute a statement inside this transaction.
    fn execute_statement(&mut self, statement: &str) -> Result<StatementResults>;

    /// Commit the transaction.
    fn commit(&mut self) -> Result<()>;

    /// Abort the transaction.
    fn abort(&mut self) -> Result<()>;
}
