//! Line input and console output.
//!
//! Interactive mode reads through rustyline (history, TAB completion,
//! emacs/vi bindings, terminator-required continuation). Script mode reads
//! a fixed list of lines. Both print to stdout.

use std::collections::VecDeque;
use std::io::{self, BufRead};
use std::path::PathBuf;

use rustyline::completion::{Completer, Pair};
use rustyline::config::Configurer;
use rustyline::error::ReadlineError;
use rustyline::highlight::Highlighter;
use rustyline::hint::Hinter;
use rustyline::history::DefaultHistory;
use rustyline::validate::{ValidationContext, ValidationResult, Validator};
use rustyline::{CompletionType, Config, Context, Editor, Helper};

use ledgershell_core::{Error, Result};
use ledgershell_executor::{strip_terminator, Keyword, TERMINATOR};

use crate::config::EditMode;
use crate::parse::is_meta_name;

/// Words offered by TAB completion.
const COMPLETIONS: &[&str] = &[
    "start", "commit", "abort", "help", "quit", "exit", "\\help", "\\quit", "\\exit", "\\env",
    "\\status", "\\set", "\\use",
];

/// What the shell loop reads from and writes to.
pub trait Ui {
    fn set_prompt(&mut self, prompt: String);

    /// Read the next line. `Interrupted` and `Eof` map to Ctrl-C and Ctrl-D.
    fn user_input(&mut self) -> std::result::Result<String, ReadlineError>;

    fn println(&mut self, line: &str);

    fn warn(&mut self, line: &str);

    fn set_edit_mode(&mut self, _mode: EditMode) {}

    fn set_terminator_required(&mut self, _required: bool) {}
}

pub(crate) fn readline_error(e: ReadlineError) -> Error {
    Error::Io {
        reason: e.to_string(),
    }
}

fn history_file() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".ledgershell_history"))
}

/// Whether `input` is complete when a terminator is required.
fn input_complete(input: &str) -> bool {
    let trimmed = input.trim();
    if trimmed.is_empty() || trimmed.ends_with(TERMINATOR) || trimmed.starts_with('\\') {
        return true;
    }
    let first = trimmed.split_whitespace().next().unwrap_or("");
    Keyword::parse(strip_terminator(trimmed)).is_some()
        || (is_meta_name(first) && !trimmed.contains(char::is_whitespace))
}

#[derive(Debug, Default)]
struct ShellHelper {
    terminator_required: bool,
}

impl Helper for ShellHelper {}
impl Highlighter for ShellHelper {}
impl Hinter for ShellHelper {
    type Hint = String;

    fn hint(&self, _line: &str, _pos: usize, _ctx: &Context<'_>) -> Option<String> {
        None
    }
}

impl Validator for ShellHelper {
    fn validate(&self, ctx: &mut ValidationContext<'_>) -> rustyline::Result<ValidationResult> {
        if !self.terminator_required || input_complete(ctx.input()) {
            Ok(ValidationResult::Valid(None))
        } else {
            Ok(ValidationResult::Incomplete)
        }
    }
}

impl Completer for ShellHelper {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &Context<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        let line_to_pos = &line[..pos];
        if line_to_pos.contains(char::is_whitespace) {
            return Ok((pos, Vec::new()));
        }
        let candidates = COMPLETIONS
            .iter()
            .filter(|word| word.starts_with(line_to_pos))
            .map(|word| Pair {
                display: word.to_string(),
                replacement: word.to_string(),
            })
            .collect();
        Ok((0, candidates))
    }
}

fn rustyline_mode(mode: EditMode) -> rustyline::EditMode {
    match mode {
        EditMode::Emacs => rustyline::EditMode::Emacs,
        EditMode::Vi => rustyline::EditMode::Vi,
    }
}

/// Terminal UI backed by rustyline.
pub struct ConsoleUi {
    editor: Editor<ShellHelper, DefaultHistory>,
    prompt: String,
    history: Option<PathBuf>,
}

impl ConsoleUi {
    pub fn new(edit_mode: EditMode, terminator_required: bool) -> Result<Self> {
        let config = Config::builder()
            .history_ignore_space(true)
            .completion_type(CompletionType::List)
            .edit_mode(rustyline_mode(edit_mode))
            .build();
        let mut editor: Editor<ShellHelper, DefaultHistory> =
            Editor::with_config(config).map_err(readline_error)?;
        editor.set_helper(Some(ShellHelper {
            terminator_required,
        }));

        let history = history_file();
        if let Some(ref path) = history {
            // A missing history file is normal on first run.
            let _ = editor.load_history(path);
        }

        Ok(Self {
            editor,
            prompt: "> ".to_string(),
            history,
        })
    }
}

impl Ui for ConsoleUi {
    fn set_prompt(&mut self, prompt: String) {
        self.prompt = prompt;
    }

    fn user_input(&mut self) -> std::result::Result<String, ReadlineError> {
        let line = self.editor.readline(&self.prompt)?;
        if !line.trim().is_empty() {
            let _ = self.editor.add_history_entry(line.as_str());
        }
        Ok(line)
    }

    fn println(&mut self, line: &str) {
        println!("{}", line);
    }

    fn warn(&mut self, line: &str) {
        eprintln!("{}", line);
    }

    fn set_edit_mode(&mut self, mode: EditMode) {
        self.editor.set_edit_mode(rustyline_mode(mode));
    }

    fn set_terminator_required(&mut self, required: bool) {
        if let Some(helper) = self.editor.helper_mut() {
            helper.terminator_required = required;
        }
    }
}

impl Drop for ConsoleUi {
    fn drop(&mut self) {
        if let Some(ref path) = self.history {
            if let Err(e) = self.editor.save_history(path) {
                tracing::warn!(target: "ledgershell::shell", error = %e, "Failed to save history");
            }
        }
    }
}

/// Non-interactive UI reading a fixed list of lines.
#[derive(Debug, Default)]
pub struct ScriptUi {
    lines: VecDeque<String>,
}

impl ScriptUi {
    pub fn from_lines<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            lines: lines.into_iter().map(Into::into).collect(),
        }
    }

    /// Read every line of stdin.
    pub fn from_stdin() -> Result<Self> {
        let lines = io::stdin().lock().lines().collect::<io::Result<Vec<_>>>()?;
        Ok(Self::from_lines(lines))
    }
}

impl Ui for ScriptUi {
    fn set_prompt(&mut self, _prompt: String) {}

    fn user_input(&mut self) -> std::result::Result<String, ReadlineError> {
        self.lines.pop_front().ok_or(ReadlineError::Eof)
    }

    fn println(&mut self, line: &str) {
        println!("{}", line);
    }

    fn warn(&mut self, line: &str) {
        eprintln!("{}", line);
    }
}
