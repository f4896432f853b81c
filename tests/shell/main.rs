//! Shell Integration Tests
//!
//! End-to-end behavior of the executor against the in-process ledger:
//! - Batch Builder properties (proptest)
//! - Line processing through `ShellCore` and `MemoryLedger`
//! - Failure handling: remote errors, expiry, connectivity
//! - Parity between direct and worker-thread transactions

mod common;

mod batch_properties;
mod failures;
mod transactions;
mod worker_parity;
