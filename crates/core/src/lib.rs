//! Core types and traits for ledgershell
//!
//! This crate defines the vocabulary shared by every other crate:
//! - Error: the structured [`Error`] enum and [`Result`] alias
//! - Provider: the [`SessionProvider`] / [`Session`] / [`TransactionHandle`]
//!   contract the shell drives transactions through
//! - Results: [`StatementResults`], the single-pass document cursor, and
//!   its [`ExecutionStats`]

#![warn(clippy::all)]

pub mod error;
pub mod provider;
pub mod results;

pub use error::{Error, Result, BAD_REQUEST_CODE, INVALID_SESSION_CODE};
pub use provider::{Session, SessionProvider, TransactionHandle};
pub use results::{Document, ExecutionStats, StatementResults};
