//! ledgershell: an interactive transaction shell for ledger databases.
//!
//! Two modes:
//! - **Interactive**: `ledgershell -l LEDGER` with stdin on a terminal
//! - **Script**: `ledgershell -l LEDGER -e STATEMENT`, `-e -`, or piped stdin,
//!   one line per tick

mod commands;
mod config;
mod environment;
mod format;
mod logging;
mod parse;
mod repl;
mod ui;

use std::io::IsTerminal;
use std::process;

use ledgershell_core::{Result, Session, SessionProvider};
use ledgershell_executor::WorkerProvider;
use ledgershell_ledger::connect_with;

use commands::build_cli;
use config::ShellConfig;
use environment::Environment;
use parse::CliOptions;
use repl::{welcome_text, ProgramFlow, Repl};
use ui::{ConsoleUi, ScriptUi, Ui};

fn main() {
    let matches = build_cli().get_matches();
    match run(&matches) {
        Ok(code) => process::exit(code),
        Err(e) => {
            eprintln!("{}", e);
            process::exit(1);
        }
    }
}

fn run(matches: &clap::ArgMatches) -> Result<i32> {
    let options = CliOptions::from_matches(matches)?;
    let config = ShellConfig::load(options.config.as_deref())?;
    let interactive = options.execute.is_none() && std::io::stdin().is_terminal();
    let mut env = Environment::resolve(interactive, config, &options)?;
    logging::init(options.verbose, env.log_file())?;

    let mut ui: Box<dyn Ui> = match options.execute.as_deref() {
        None if interactive => {
            Box::new(ConsoleUi::new(env.edit_mode(), env.terminator_required())?)
        }
        Some(statement) if statement != "-" => Box::new(ScriptUi::from_lines([statement])),
        _ => Box::new(ScriptUi::from_stdin()?),
    };

    let mut welcomed = false;
    loop {
        let ledger = connect_with(&env.target(), env.ledger_options())?;
        health_check(&ledger)?;
        tracing::info!(
            target: "ledgershell::shell",
            ledger = %env.ledger(),
            worker_thread = env.worker_thread(),
            "Connected"
        );

        if env.display_welcome() && !welcomed {
            ui.println(&welcome_text(env.ledger()));
            welcomed = true;
        }

        let flow = if env.worker_thread() {
            Repl::new(&mut env, ui.as_mut(), WorkerProvider::new(ledger)).run()
        } else {
            Repl::new(&mut env, ui.as_mut(), ledger).run()
        };
        match flow {
            ProgramFlow::Exit(code) => return Ok(code),
            ProgramFlow::Restart => continue,
        }
    }
}

/// Acquire and close one session so credential and endpoint problems
/// surface before the first prompt.
fn health_check<P: SessionProvider>(provider: &P) -> Result<()> {
    let mut session = provider.get_session()?;
    session.close();
    Ok(())
}
