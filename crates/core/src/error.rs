//! Error types for the shell.
//!
//! All failures are represented by the [`Error`] enum. Errors are:
//! - **Structured**: each variant has typed fields for the details
//! - **Serializable**: can be converted to/from JSON
//! - **Classifiable**: predicates such as [`Error::is_transaction_expired`]
//!   let callers decide how much shell state a failure invalidates
//!
//! # Categories
//!
//! | Category | Variants | Handling |
//! |----------|----------|----------|
//! | Input | `QuerySyntax`, `Usage` | Reported, shell state unchanged |
//! | Remote | `Remote` | Transaction aborted, state reset |
//! | Fatal | `Connectivity` | Reported, process exits |
//! | Startup | `NoCredentials`, `Config` | Raised before the loop starts |
//! | Contract | `InvalidState` | Always propagated |
//! | System | `Io` | Reported |

use serde::{Deserialize, Serialize};

/// Service error code reported when a session or transaction is no longer usable.
pub const INVALID_SESSION_CODE: &str = "InvalidSessionException";

/// Service error code reported for malformed or rejected requests.
pub const BAD_REQUEST_CODE: &str = "BadRequestException";

/// Shell errors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
pub enum Error {
    // ==================== Input Errors ====================
    /// Illegal `start`/`commit`/`abort` sequencing in an input line
    #[error("{reason}")]
    QuerySyntax { reason: String },

    /// Misuse of the shell that is not a sequencing error
    #[error("{reason}")]
    Usage { reason: String },

    // ==================== Remote Errors ====================
    /// A request against the backing service failed
    #[error("{code}: {message}")]
    Remote { code: String, message: String },

    /// The backing endpoint could not be reached at all
    #[error("unable to connect to endpoint {endpoint}: {reason}")]
    Connectivity { endpoint: String, reason: String },

    /// No credentials could be resolved while building a session
    #[error("no credentials present{}", profile_suffix(.profile))]
    NoCredentials { profile: Option<String> },

    // ==================== Contract Errors ====================
    /// Internal contract violation (bug)
    #[error("invalid state: {reason}")]
    InvalidState { reason: String },

    // ==================== System Errors ====================
    /// Configuration could not be loaded or resolved
    #[error("configuration error: {reason}")]
    Config { reason: String },

    /// Terminal or file I/O failure
    #[error("I/O error: {reason}")]
    Io { reason: String },
}

fn profile_suffix(profile: &Option<String>) -> String {
    match profile {
        Some(p) => format!(" (profile '{}')", p),
        None => String::new(),
    }
}

impl Error {
    /// Create a [`Error::QuerySyntax`].
    pub fn query_syntax(reason: impl Into<String>) -> Self {
        Error::QuerySyntax {
            reason: reason.into(),
        }
    }

    /// Create a [`Error::Usage`].
    pub fn usage(reason: impl Into<String>) -> Self {
        Error::Usage {
            reason: reason.into(),
        }
    }

    /// Create a [`Error::Remote`].
    pub fn remote(code: impl Into<String>, message: impl Into<String>) -> Self {
        Error::Remote {
            code: code.into(),
            message: message.into(),
        }
    }

    /// Create the remote error the service reports for an expired transaction.
    pub fn transaction_expired(transaction_id: &str) -> Self {
        Error::remote(
            INVALID_SESSION_CODE,
            format!("Transaction {} has expired", transaction_id),
        )
    }

    /// Create a [`Error::Connectivity`].
    pub fn connectivity(endpoint: impl Into<String>, reason: impl Into<String>) -> Self {
        Error::Connectivity {
            endpoint: endpoint.into(),
            reason: reason.into(),
        }
    }

    /// Create a [`Error::InvalidState`].
    pub fn invalid_state(reason: impl Into<String>) -> Self {
        Error::InvalidState {
            reason: reason.into(),
        }
    }

    /// Create a [`Error::Config`].
    pub fn config(reason: impl Into<String>) -> Self {
        Error::Config {
            reason: reason.into(),
        }
    }

    /// Whether this is a remote failure caused by the transaction outliving
    /// its time limit.
    ///
    /// The service reports expiry as an `InvalidSessionException` whose
    /// message reads `Transaction <id> has expired`.
    pub fn is_transaction_expired(&self) -> bool {
        match self {
            Error::Remote { code, message } => {
                code == INVALID_SESSION_CODE && is_expiry_message(message)
            }
            _ => false,
        }
    }

    /// Whether this is any remote execution failure (including expiry).
    pub fn is_remote(&self) -> bool {
        matches!(self, Error::Remote { .. })
    }

    /// Whether the shell cannot continue after this error.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Error::Connectivity { .. })
    }
}

fn is_expiry_message(message: &str) -> bool {
    let mut words = message.split_whitespace();
    if words.next() != Some("Transaction") {
        return false;
    }
    let rest: Vec<&str> = words.collect();
    rest.len() >= 3 && rest[rest.len() - 2..] == ["has", "expired"]
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::Io {
            reason: e.to_string(),
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Io {
            reason: format!("serialization failed: {}", e),
        }
    }
}

/// Result type for shell operations
pub type Result<T> = std::result::Result<T, Error>;
