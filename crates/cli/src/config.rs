//! Shell configuration via `config.toml`
//!
//! Looked up at `ledgershell/config.toml` under the platform config
//! directory (`$XDG_CONFIG_HOME` or `~/.config` on Linux). Every field is
//! optional; a missing default file means defaults. `--config PATH` names a
//! file that must exist.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use ledgershell_core::{Error, Result};

use crate::format::OutputMode;

/// Config file name inside the config directory.
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Line editor key bindings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EditMode {
    #[default]
    Emacs,
    Vi,
}

impl FromStr for EditMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "emacs" => Ok(EditMode::Emacs),
            "vi" => Ok(EditMode::Vi),
            other => Err(Error::usage(format!(
                "Invalid edit mode '{}'. Expected \"emacs\" or \"vi\".",
                other
            ))),
        }
    }
}

impl fmt::Display for EditMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EditMode::Emacs => f.write_str("emacs"),
            EditMode::Vi => f.write_str("vi"),
        }
    }
}

/// `[ui]` section.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct UiConfig {
    pub auto_commit: Option<bool>,
    pub prompt: Option<String>,
    pub format: Option<OutputMode>,
    pub edit_mode: Option<EditMode>,
    pub display_welcome: Option<bool>,
    pub display_ctrl_signals: Option<bool>,
    pub display_query_metrics: Option<bool>,
    pub terminator_required: Option<bool>,
}

/// `[session]` section.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SessionConfig {
    /// Run interactive transactions on a worker thread.
    pub worker_thread: Option<bool>,
}

/// `[debug]` section.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DebugConfig {
    /// Append log output to this file instead of stderr.
    pub log: Option<PathBuf>,
}

/// One `[[ledgers]]` entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LedgerConfig {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_endpoint: Option<String>,
}

/// Shell configuration loaded from `config.toml`.
///
/// # Example
///
/// ```toml
/// default_ledger = "vehicle-registration"
///
/// [ui]
/// format = "json"
///
/// [[ledgers]]
/// name = "vehicle-registration"
/// region = "us-east-1"
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ShellConfig {
    pub default_ledger: Option<String>,
    pub ui: UiConfig,
    pub session: SessionConfig,
    pub debug: DebugConfig,
    pub ledgers: Vec<LedgerConfig>,
}

impl ShellConfig {
    /// Default location of the config file, if a config directory is known.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("ledgershell").join(CONFIG_FILE_NAME))
    }

    /// Load the explicit file, or the default file when it exists.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        match explicit {
            Some(path) => Self::from_file(path),
            None => match Self::default_path() {
                Some(path) if path.exists() => Self::from_file(&path),
                _ => Ok(Self::default()),
            },
        }
    }

    /// Read and parse config from a file path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::config(format!(
                "Failed to read config file '{}': {}",
                path.display(),
                e
            ))
        })?;
        toml::from_str(&content).map_err(|e| {
            Error::config(format!(
                "Failed to parse config file '{}': {}",
                path.display(),
                e
            ))
        })
    }

    /// The `[[ledgers]]` entry for `name`.
    pub fn ledger(&self, name: &str) -> Option<&LedgerConfig> {
        self.ledgers.iter().find(|l| l.name == name)
    }
}
