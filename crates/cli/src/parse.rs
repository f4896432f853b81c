//! ArgMatches → CliOptions / MetaCommand conversion.

use std::path::PathBuf;

use clap::ArgMatches;

use ledgershell_core::{Error, Result};
use ledgershell_executor::strip_terminator;

use crate::commands::build_meta_cmd;
use crate::config::EditMode;
use crate::format::OutputMode;

/// Reported for anything that is not a known meta command.
pub const UNKNOWN_COMMAND: &str = "Unknown command, enter '\\help' for a list of commands.";

const META_NAMES: &[&str] = &["help", "?", "quit", "exit", "env", "status", "set", "use"];

/// Whether `word` names a meta command (case-insensitive, without backslash).
pub fn is_meta_name(word: &str) -> bool {
    let word = word.to_ascii_lowercase();
    META_NAMES.contains(&word.as_str())
}

/// Commands accepted without a leading backslash, with or without a
/// trailing terminator.
pub fn is_bare_meta(line: &str) -> bool {
    matches!(
        strip_terminator(line).to_ascii_lowercase().as_str(),
        "help" | "?" | "quit" | "exit"
    )
}

/// Options from the process command line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CliOptions {
    pub verbose: bool,
    pub region: Option<String>,
    pub session_endpoint: Option<String>,
    pub profile: Option<String>,
    pub ledger: Option<String>,
    pub query_stats: Option<bool>,
    pub format: Option<OutputMode>,
    pub execute: Option<String>,
    pub terminator_required: bool,
    pub auto_commit: Option<bool>,
    pub worker_thread: bool,
    pub config: Option<PathBuf>,
}

fn on_off(value: &str) -> bool {
    matches!(value, "on" | "true")
}

fn string(matches: &ArgMatches, id: &str) -> Option<String> {
    matches.get_one::<String>(id).cloned()
}

impl CliOptions {
    pub fn from_matches(matches: &ArgMatches) -> Result<Self> {
        let query_stats = if matches.get_flag("query-stats") {
            Some(true)
        } else if matches.get_flag("no-query-stats") {
            Some(false)
        } else {
            None
        };
        let format = match matches.get_one::<String>("format") {
            Some(f) => Some(f.parse()?),
            None => None,
        };
        Ok(Self {
            verbose: matches.get_flag("verbose"),
            region: string(matches, "region"),
            session_endpoint: string(matches, "session-endpoint"),
            profile: string(matches, "profile"),
            ledger: string(matches, "ledger"),
            query_stats,
            format,
            execute: string(matches, "execute"),
            terminator_required: matches.get_flag("terminator-required"),
            auto_commit: matches.get_one::<String>("auto-commit").map(|v| on_off(v)),
            worker_thread: matches.get_flag("worker-thread"),
            config: matches.get_one::<String>("config").map(PathBuf::from),
        })
    }
}

/// `\set` targets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SetCommand {
    EditMode(EditMode),
    TerminatorRequired(bool),
    AutoCommit(bool),
    QueryStats(bool),
}

/// `\use` arguments.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UseCommand {
    pub ledger: Option<String>,
    pub region: Option<String>,
    pub profile: Option<String>,
    pub session_endpoint: Option<String>,
}

/// A command typed at the prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MetaCommand {
    Help,
    Quit,
    Env,
    Status,
    Set(SetCommand),
    Use(UseCommand),
}

/// Parse a meta command line, with the leading backslash already removed.
pub fn parse_meta(line: &str) -> Result<MetaCommand> {
    let mut tokens = shlex::split(line).ok_or_else(|| Error::usage("Invalid quoting"))?;
    let Some(name) = tokens.first_mut() else {
        return Err(Error::usage(UNKNOWN_COMMAND));
    };
    if !is_meta_name(name) {
        return Err(Error::usage(UNKNOWN_COMMAND));
    }
    *name = name.to_ascii_lowercase();

    let matches = build_meta_cmd()
        .try_get_matches_from(tokens)
        .map_err(|e| Error::usage(e.render().to_string().trim_end().to_string()))?;
    matches_to_meta(&matches)
}

fn matches_to_meta(matches: &ArgMatches) -> Result<MetaCommand> {
    match matches.subcommand() {
        Some(("help", _)) => Ok(MetaCommand::Help),
        Some(("quit", _)) => Ok(MetaCommand::Quit),
        Some(("env", _)) => Ok(MetaCommand::Env),
        Some(("status", _)) => Ok(MetaCommand::Status),
        Some(("set", sub)) => {
            let set = match sub.subcommand() {
                Some(("edit-mode", m)) => {
                    let mode = m
                        .get_one::<String>("mode")
                        .ok_or_else(|| Error::usage("edit-mode requires a value"))?;
                    SetCommand::EditMode(mode.parse()?)
                }
                Some((name, m)) => {
                    let value = m
                        .get_one::<String>("value")
                        .map(|v| on_off(v))
                        .ok_or_else(|| Error::usage(format!("{} requires a value", name)))?;
                    match name {
                        "terminator-required" => SetCommand::TerminatorRequired(value),
                        "auto-commit" => SetCommand::AutoCommit(value),
                        "query-stats" => SetCommand::QueryStats(value),
                        _ => return Err(Error::usage(UNKNOWN_COMMAND)),
                    }
                }
                None => return Err(Error::usage(UNKNOWN_COMMAND)),
            };
            Ok(MetaCommand::Set(set))
        }
        Some(("use", sub)) => Ok(MetaCommand::Use(UseCommand {
            ledger: string(sub, "ledger"),
            region: string(sub, "region"),
            profile: string(sub, "profile"),
            session_endpoint: string(sub, "session-endpoint"),
        })),
        _ => Err(Error::usage(UNKNOWN_COMMAND)),
    }
}
