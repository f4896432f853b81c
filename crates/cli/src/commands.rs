//! Clap command tree definitions.
//!
//! `build_cli` parses the process arguments. `build_meta_cmd` is a multicall
//! tree for the backslash commands typed at the prompt, matched against
//! `shlex`-split tokens.

use clap::{Arg, ArgAction, Command};

const ON_OFF: [&str; 4] = ["on", "off", "true", "false"];

/// Build the process command line.
pub fn build_cli() -> Command {
    Command::new("ledgershell")
        .about("Interactive transaction shell for ledger databases")
        .version(env!("CARGO_PKG_VERSION"))
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Log debug output")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("region")
                .short('r')
                .long("region")
                .help("Region of the ledger"),
        )
        .arg(
            Arg::new("session-endpoint")
                .short('s')
                .long("session-endpoint")
                .help("Session endpoint override"),
        )
        .arg(
            Arg::new("profile")
                .short('p')
                .long("profile")
                .help("Credential profile name"),
        )
        .arg(
            Arg::new("ledger")
                .short('l')
                .long("ledger")
                .help("Name of the ledger (default: default_ledger from the config file)"),
        )
        .arg(
            Arg::new("query-stats")
                .long("query-stats")
                .help("Print document count, read IOs and timing after each statement")
                .action(ArgAction::SetTrue)
                .conflicts_with("no-query-stats"),
        )
        .arg(
            Arg::new("no-query-stats")
                .long("no-query-stats")
                .help("Do not print query statistics")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("format")
                .short('f')
                .long("format")
                .help("Output format")
                .value_parser(["human", "json", "raw", "table"]),
        )
        .arg(
            Arg::new("execute")
                .short('e')
                .long("execute")
                .value_name("STATEMENT")
                .help("Run one line and exit; '-' reads every line from stdin"),
        )
        .arg(
            Arg::new("terminator-required")
                .long("terminator-required")
                .help("Require statements to end with ';'")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("auto-commit")
                .long("auto-commit")
                .help("Run statements entered outside a transaction on their own")
                .value_parser(ON_OFF),
        )
        .arg(
            Arg::new("worker-thread")
                .long("worker-thread")
                .help("Run each transaction on a dedicated worker thread")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("config")
                .long("config")
                .value_name("PATH")
                .help("Configuration file (default: $XDG_CONFIG_HOME/ledgershell/config.toml)"),
        )
}

/// Build the multicall tree for backslash commands.
pub fn build_meta_cmd() -> Command {
    Command::new("meta")
        .multicall(true)
        .disable_help_subcommand(true)
        .subcommand_required(true)
        .subcommand(Command::new("help").alias("?").about("Show help"))
        .subcommand(Command::new("quit").alias("exit").about("Quit the shell"))
        .subcommand(Command::new("env").about("Show settings and where they were set"))
        .subcommand(Command::new("status").about("Show ledger, region and transaction state"))
        .subcommand(build_set())
        .subcommand(build_use())
}

fn on_off_value() -> Arg {
    Arg::new("value").required(true).value_parser(ON_OFF)
}

fn build_set() -> Command {
    Command::new("set")
        .about("Change a shell setting")
        .subcommand_required(true)
        .subcommand(
            Command::new("edit-mode").arg(
                Arg::new("mode")
                    .required(true)
                    .value_parser(["emacs", "vi"]),
            ),
        )
        .subcommand(Command::new("terminator-required").arg(on_off_value()))
        .subcommand(Command::new("auto-commit").arg(on_off_value()))
        .subcommand(Command::new("query-stats").arg(on_off_value()))
}

fn build_use() -> Command {
    Command::new("use")
        .about("Switch ledger, region, profile or endpoint")
        .arg(Arg::new("ledger").short('l').long("ledger"))
        .arg(Arg::new("region").short('r').long("region"))
        .arg(Arg::new("profile").short('p').long("profile"))
        .arg(Arg::new("session-endpoint").short('s').long("session-endpoint"))
}
