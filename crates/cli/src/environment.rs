//! Resolved shell settings and where each came from.
//!
//! Precedence, lowest first: built-in default, config file, the config's
//! `[[ledgers]]` entry for the current ledger, command line, `\set` /
//! `\use` at the prompt.

use std::fmt;
use std::path::{Path, PathBuf};

use ledgershell_core::{Error, Result};
use ledgershell_executor::DEFAULT_PROMPT;
use ledgershell_ledger::{LedgerOptions, LedgerTarget};

use crate::config::{EditMode, ShellConfig};
use crate::format::OutputMode;
use crate::parse::{CliOptions, SetCommand, UseCommand};

/// Where a setting's value came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Setter {
    Default,
    Config,
    CommandLine,
    Shell,
}

impl fmt::Display for Setter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Setter::Default => "default",
            Setter::Config => "config",
            Setter::CommandLine => "command-line",
            Setter::Shell => "shell",
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Setting<T> {
    name: &'static str,
    value: T,
    setter: Setter,
}

impl<T> Setting<T> {
    fn new(name: &'static str, value: T) -> Self {
        Self {
            name,
            value,
            setter: Setter::Default,
        }
    }

    fn apply(&mut self, value: T, setter: Setter) {
        self.value = value;
        self.setter = setter;
    }

    fn apply_opt(&mut self, value: Option<T>, setter: Setter) {
        if let Some(value) = value {
            self.apply(value, setter);
        }
    }
}

impl<T> Setting<Option<T>> {
    /// Apply a ledger-entry value without overriding a stronger source.
    fn apply_ledger_entry(&mut self, value: Option<T>) {
        if self.setter <= Setter::Config {
            self.value = None;
            self.setter = Setter::Default;
            if value.is_some() {
                self.apply(value, Setter::Config);
            }
        }
    }
}

/// All shell settings.
#[derive(Debug, Clone)]
pub struct Environment {
    interactive: bool,
    config: ShellConfig,
    ledger: Setting<String>,
    region: Setting<Option<String>>,
    profile: Setting<Option<String>>,
    session_endpoint: Setting<Option<String>>,
    auto_commit: Setting<bool>,
    prompt: Setting<String>,
    format: Setting<OutputMode>,
    edit_mode: Setting<EditMode>,
    display_welcome: Setting<bool>,
    display_ctrl_signals: Setting<bool>,
    query_stats: Setting<bool>,
    terminator_required: Setting<bool>,
    worker_thread: Setting<bool>,
    log_file: Setting<Option<PathBuf>>,
}

impl Environment {
    /// Defaults. Welcome text and control-signal echo default to on only
    /// for an interactive terminal.
    pub fn new(interactive: bool) -> Self {
        Self {
            interactive,
            config: ShellConfig::default(),
            ledger: Setting::new("ledger", String::new()),
            region: Setting::new("region", None),
            profile: Setting::new("profile", None),
            session_endpoint: Setting::new("session_endpoint", None),
            auto_commit: Setting::new("auto_commit", true),
            prompt: Setting::new("prompt", DEFAULT_PROMPT.to_string()),
            format: Setting::new("format", OutputMode::Human),
            edit_mode: Setting::new("edit_mode", EditMode::Emacs),
            display_welcome: Setting::new("display_welcome", interactive),
            display_ctrl_signals: Setting::new("display_ctrl_signals", interactive),
            query_stats: Setting::new("display_query_metrics", true),
            terminator_required: Setting::new("terminator_required", false),
            worker_thread: Setting::new("worker_thread", false),
            log_file: Setting::new("log_file", None),
        }
    }

    /// Defaults, then config, then command line.
    pub fn resolve(interactive: bool, config: ShellConfig, options: &CliOptions) -> Result<Self> {
        let mut env = Self::new(interactive);
        env.apply_config(config);
        env.apply_cli(options);
        env.apply_ledger_entry();
        env.require_ledger()?;
        Ok(env)
    }

    pub fn apply_config(&mut self, config: ShellConfig) {
        let s = Setter::Config;
        let ui = &config.ui;
        self.ledger.apply_opt(config.default_ledger.clone(), s);
        self.auto_commit.apply_opt(ui.auto_commit, s);
        self.prompt.apply_opt(ui.prompt.clone(), s);
        self.format.apply_opt(ui.format, s);
        self.edit_mode.apply_opt(ui.edit_mode, s);
        // In script mode these stay off regardless of the config file.
        if self.interactive {
            self.display_welcome.apply_opt(ui.display_welcome, s);
            self.display_ctrl_signals.apply_opt(ui.display_ctrl_signals, s);
        }
        self.query_stats.apply_opt(ui.display_query_metrics, s);
        self.terminator_required.apply_opt(ui.terminator_required, s);
        self.worker_thread.apply_opt(config.session.worker_thread, s);
        if config.debug.log.is_some() {
            self.log_file.apply(config.debug.log.clone(), s);
        }
        self.config = config;
    }

    pub fn apply_cli(&mut self, options: &CliOptions) {
        let s = Setter::CommandLine;
        self.ledger.apply_opt(options.ledger.clone(), s);
        if options.region.is_some() {
            self.region.apply(options.region.clone(), s);
        }
        if options.profile.is_some() {
            self.profile.apply(options.profile.clone(), s);
        }
        if options.session_endpoint.is_some() {
            self.session_endpoint.apply(options.session_endpoint.clone(), s);
        }
        self.query_stats.apply_opt(options.query_stats, s);
        self.format.apply_opt(options.format, s);
        self.auto_commit.apply_opt(options.auto_commit, s);
        if options.terminator_required {
            self.terminator_required.apply(true, s);
        }
        if options.worker_thread {
            self.worker_thread.apply(true, s);
        }
    }

    /// Apply the `[[ledgers]]` entry for the current ledger, if any.
    pub fn apply_ledger_entry(&mut self) {
        let entry = self.config.ledger(&self.ledger.value).cloned();
        let (region, profile, endpoint) = match entry {
            Some(e) => (e.region, e.profile, e.session_endpoint),
            None => (None, None, None),
        };
        self.region.apply_ledger_entry(region);
        self.profile.apply_ledger_entry(profile);
        self.session_endpoint.apply_ledger_entry(endpoint);
    }

    /// Fail unless a ledger name was resolved.
    pub fn require_ledger(&self) -> Result<()> {
        if self.ledger.value.trim().is_empty() {
            return Err(Error::config(
                "ledger must be specified: pass --ledger or set default_ledger in the config file",
            ));
        }
        Ok(())
    }

    /// Apply a `\set` command.
    pub fn apply_set(&mut self, set: &SetCommand) {
        let s = Setter::Shell;
        match *set {
            SetCommand::EditMode(mode) => self.edit_mode.apply(mode, s),
            SetCommand::TerminatorRequired(v) => self.terminator_required.apply(v, s),
            SetCommand::AutoCommit(v) => self.auto_commit.apply(v, s),
            SetCommand::QueryStats(v) => self.query_stats.apply(v, s),
        }
    }

    /// Apply a `\use` command and re-resolve ledger-entry settings.
    pub fn apply_use(&mut self, command: &UseCommand) -> Result<()> {
        let s = Setter::Shell;
        if let Some(ledger) = &command.ledger {
            if ledger.trim().is_empty() {
                return Err(Error::usage("ledger name must not be empty"));
            }
            self.ledger.apply(ledger.clone(), s);
        }
        // Values pinned for the previous ledger no longer apply.
        for setting in [&mut self.region, &mut self.profile, &mut self.session_endpoint] {
            if setting.setter == Setter::Shell {
                setting.value = None;
                setting.setter = Setter::Default;
            }
        }
        if command.region.is_some() {
            self.region.apply(command.region.clone(), s);
        }
        if command.profile.is_some() {
            self.profile.apply(command.profile.clone(), s);
        }
        if command.session_endpoint.is_some() {
            self.session_endpoint.apply(command.session_endpoint.clone(), s);
        }
        self.apply_ledger_entry();
        Ok(())
    }

    /// Where sessions should come from.
    pub fn target(&self) -> LedgerTarget {
        LedgerTarget {
            ledger: self.ledger.value.clone(),
            region: self.region.value.clone(),
            profile: self.profile.value.clone(),
            session_endpoint: self.session_endpoint.value.clone(),
        }
    }

    /// Ledger options derived from the config file.
    ///
    /// Profiles named by `[[ledgers]]` entries are the ones credentials are
    /// held for. A config that names none accepts any profile.
    pub fn ledger_options(&self) -> LedgerOptions {
        let mut known: Vec<String> = self
            .config
            .ledgers
            .iter()
            .filter_map(|l| l.profile.clone())
            .collect();
        known.sort();
        known.dedup();
        LedgerOptions {
            known_profiles: (!known.is_empty()).then_some(known),
            ..Default::default()
        }
    }

    pub fn is_interactive(&self) -> bool {
        self.interactive
    }

    pub fn ledger(&self) -> &str {
        &self.ledger.value
    }

    pub fn region(&self) -> Option<&str> {
        self.region.value.as_deref()
    }

    pub fn session_endpoint(&self) -> Option<&str> {
        self.session_endpoint.value.as_deref()
    }

    pub fn auto_commit(&self) -> bool {
        self.auto_commit.value
    }

    pub fn prompt(&self) -> &str {
        &self.prompt.value
    }

    pub fn format(&self) -> OutputMode {
        self.format.value
    }

    pub fn edit_mode(&self) -> EditMode {
        self.edit_mode.value
    }

    pub fn display_welcome(&self) -> bool {
        self.display_welcome.value
    }

    pub fn display_ctrl_signals(&self) -> bool {
        self.display_ctrl_signals.value
    }

    pub fn query_stats(&self) -> bool {
        self.query_stats.value
    }

    pub fn terminator_required(&self) -> bool {
        self.terminator_required.value
    }

    pub fn worker_thread(&self) -> bool {
        self.worker_thread.value
    }

    pub fn log_file(&self) -> Option<&Path> {
        self.log_file.value.as_deref()
    }
}

fn row(
    f: &mut fmt::Formatter<'_>,
    name: &str,
    value: &dyn fmt::Display,
    setter: Setter,
) -> fmt::Result {
    writeln!(f, "  {:<22} {:<40} [{}]", name, value.to_string(), setter)
}

fn row_opt<T: fmt::Display>(f: &mut fmt::Formatter<'_>, s: &Setting<Option<T>>) -> fmt::Result {
    match &s.value {
        Some(v) => row(f, s.name, v, s.setter),
        None => row(f, s.name, &"-", s.setter),
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Environment:")?;
        row(f, self.ledger.name, &self.ledger.value, self.ledger.setter)?;
        row_opt(f, &self.region)?;
        row_opt(f, &self.profile)?;
        row_opt(f, &self.session_endpoint)?;
        for s in [
            &self.auto_commit,
            &self.display_welcome,
            &self.display_ctrl_signals,
            &self.query_stats,
            &self.terminator_required,
            &self.worker_thread,
        ] {
            row(f, s.name, &s.value, s.setter)?;
        }
        row(f, self.prompt.name, &format!("{:?}", self.prompt.value), self.prompt.setter)?;
        row(f, self.format.name, &self.format.value, self.format.setter)?;
        row(f, self.edit_mode.name, &self.edit_mode.value, self.edit_mode.setter)?;
        match &self.log_file.value {
            Some(p) => row(f, self.log_file.name, &p.display(), self.log_file.setter),
            None => row(f, self.log_file.name, &"-", self.log_file.setter),
        }
    }
}
