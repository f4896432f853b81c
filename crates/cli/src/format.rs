//! Statement results → human/json/raw/table text.
//!
//! Four modes:
//! - **Human** (default): each document pretty-printed, separated by `,`
//! - **JSON**: one pretty-printed JSON array per statement
//! - **Raw**: one compact JSON document per line
//! - **Table**: one row per document, one column per field

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use comfy_table::Table;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use ledgershell_core::{Document, Error, ExecutionStats, Result, StatementResults};
use ledgershell_executor::ResultSink;

use crate::ui::Ui;

/// Output formatting mode.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputMode {
    #[default]
    Human,
    Json,
    Raw,
    Table,
}

/// Column for documents that are not objects.
const VALUE_COLUMN: &str = "VALUE";

impl FromStr for OutputMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "human" => Ok(OutputMode::Human),
            "json" => Ok(OutputMode::Json),
            "raw" => Ok(OutputMode::Raw),
            "table" => Ok(OutputMode::Table),
            other => Err(Error::usage(format!(
                "Invalid format '{}'. Expected \"human\", \"json\", \"raw\" or \"table\".",
                other
            ))),
        }
    }
}

impl fmt::Display for OutputMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputMode::Human => f.write_str("human"),
            OutputMode::Json => f.write_str("json"),
            OutputMode::Raw => f.write_str("raw"),
            OutputMode::Table => f.write_str("table"),
        }
    }
}

/// Format a statement's documents.
pub fn format_documents(documents: &[Document], mode: OutputMode) -> Result<String> {
    Ok(match mode {
        OutputMode::Json => serde_json::to_string_pretty(documents)?,
        OutputMode::Raw => documents
            .iter()
            .map(serde_json::to_string)
            .collect::<std::result::Result<Vec<_>, _>>()?
            .join("\n"),
        OutputMode::Human => documents
            .iter()
            .map(serde_json::to_string_pretty)
            .collect::<std::result::Result<Vec<_>, _>>()?
            .join(",\n"),
        OutputMode::Table => format_table(documents),
    })
}

/// Render documents as a table.
///
/// Columns are the union of object keys in first-seen order. If any
/// document is not an object, a leading `VALUE` column holds it.
fn format_table(documents: &[Document]) -> String {
    if documents.is_empty() {
        return String::new();
    }

    let mut headers: Vec<&str> = Vec::new();
    let mut has_value = false;
    for doc in documents {
        match doc {
            Value::Object(fields) => {
                for key in fields.keys() {
                    if !headers.contains(&key.as_str()) {
                        headers.push(key);
                    }
                }
            }
            _ => has_value = true,
        }
    }
    if has_value {
        headers.insert(0, VALUE_COLUMN);
    }

    let mut table = Table::new();
    table.set_header(headers.clone());
    for doc in documents {
        let row: Vec<String> = match doc {
            Value::Object(fields) => headers
                .iter()
                .map(|h| fields.get(*h).map(cell).unwrap_or_default())
                .collect(),
            other => {
                let mut row = vec![String::new(); headers.len()];
                row[0] = cell(other);
                row
            }
        };
        table.add_row(row);
    }
    table.to_string()
}

fn cell(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn or_unavailable(value: Option<u64>, unit: &str) -> String {
    match value {
        Some(v) => format!("{}{}", v, unit),
        None => "unavailable".to_string(),
    }
}

/// The query metrics line printed after a statement's documents.
pub fn stats_line(count: usize, stats: &ExecutionStats, elapsed: Duration) -> String {
    let noun = match count {
        1 => "document",
        _ => "documents",
    };
    format!(
        "{} {} in bag (read-ios: {}, server-time: {}, total-time: {}ms)",
        count,
        noun,
        or_unavailable(stats.read_ios, ""),
        or_unavailable(stats.processing_time_ms, "ms"),
        elapsed.as_millis()
    )
}

/// Writes statement results to the shell's UI.
pub struct ConsoleSink<'a> {
    ui: &'a mut dyn Ui,
    mode: OutputMode,
    show_stats: bool,
}

impl<'a> ConsoleSink<'a> {
    pub fn new(ui: &'a mut dyn Ui, mode: OutputMode, show_stats: bool) -> Self {
        Self {
            ui,
            mode,
            show_stats,
        }
    }
}

impl ResultSink for ConsoleSink<'_> {
    fn emit(
        &mut self,
        _statement: &str,
        results: StatementResults,
        elapsed: Duration,
    ) -> Result<()> {
        let stats = *results.stats();
        let documents: Vec<Document> = results.collect();
        let formatted = format_documents(&documents, self.mode)?;
        if !formatted.is_empty() {
            self.ui.println(&formatted);
        }
        if self.show_stats {
            self.ui.println(&stats_line(documents.len(), &stats, elapsed));
        }
        Ok(())
    }
}
