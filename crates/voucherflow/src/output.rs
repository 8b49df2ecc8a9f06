//! Output formatting: table, JSON, YAML, plain.
//!
//! Renders data in the format selected by `--output`. Table uses `tabled`,
//! structured formats use serde, plain emits one identifier per line.

use std::io::{self, IsTerminal, Write};

use owo_colors::OwoColorize;
use tabled::{Table, Tabled, settings::Style};

use voucherflow_core::NotificationStatus;

use crate::cli::{ColorMode, OutputFormat};

// ── Color helpers ────────────────────────────────────────────────────

/// Determine whether color output should be enabled.
pub fn should_color(mode: &ColorMode) -> bool {
    match mode {
        ColorMode::Always => true,
        ColorMode::Never => false,
        ColorMode::Auto => io::stdout().is_terminal() && std::env::var("NO_COLOR").is_err(),
    }
}

/// Status label, colored by state when `color` is on.
pub fn paint_status(status: NotificationStatus, color: bool) -> String {
    let label = status.label();
    if !color {
        return label.to_owned();
    }
    match status {
        NotificationStatus::Pending => label.yellow().to_string(),
        NotificationStatus::Validated => label.green().to_string(),
        NotificationStatus::Rejected => label.red().to_string(),
    }
}

pub fn dim(text: &str, color: bool) -> String {
    if color {
        text.dimmed().to_string()
    } else {
        text.to_owned()
    }
}

// ── Render dispatchers ───────────────────────────────────────────────

/// Render a list of serde-serializable + tabled items in the chosen format.
///
/// `to_rows` sees the whole slice so rows can carry their position.
/// Structured formats serialize `envelope` rather than the bare rows, so
/// pagination metadata survives in JSON/YAML output.
pub fn render_list<T, E, R>(
    format: &OutputFormat,
    data: &[T],
    envelope: &E,
    to_rows: impl FnOnce(&[T]) -> Vec<R>,
    id_fn: impl Fn(&T) -> String,
) -> String
where
    E: serde::Serialize + ?Sized,
    R: Tabled,
{
    match format {
        OutputFormat::Table => render_table(&to_rows(data)),
        OutputFormat::Json => render_json(envelope, false),
        OutputFormat::JsonCompact => render_json(envelope, true),
        OutputFormat::Yaml => render_yaml(envelope),
        OutputFormat::Plain => data.iter().map(&id_fn).collect::<Vec<_>>().join("\n"),
    }
}

/// Render a single serde-serializable item in the chosen format.
///
/// Table rendering uses `detail_fn`, a pre-formatted key/value block.
pub fn render_single<T>(
    format: &OutputFormat,
    data: &T,
    detail_fn: impl Fn(&T) -> String,
    id_fn: impl Fn(&T) -> String,
) -> String
where
    T: serde::Serialize,
{
    match format {
        OutputFormat::Table => detail_fn(data),
        OutputFormat::Json => render_json(data, false),
        OutputFormat::JsonCompact => render_json(data, true),
        OutputFormat::Yaml => render_yaml(data),
        OutputFormat::Plain => id_fn(data),
    }
}

/// Print the rendered output to stdout, respecting quiet mode.
pub fn print_output(output: &str, quiet: bool) {
    if quiet || output.is_empty() {
        return;
    }
    let mut stdout = io::stdout().lock();
    let _ = writeln!(stdout, "{output}");
}

/// Print a status line to stderr (table mode footers, confirmations).
pub fn print_note(note: &str, quiet: bool) {
    if quiet || note.is_empty() {
        return;
    }
    let mut stderr = io::stderr().lock();
    let _ = writeln!(stderr, "{note}");
}

// ── Format-specific renderers ────────────────────────────────────────

pub fn render_table<R: Tabled>(rows: &[R]) -> String {
    if rows.is_empty() {
        return "No notifications found.".into();
    }
    Table::new(rows).with(Style::rounded()).to_string()
}

fn render_json<T: serde::Serialize + ?Sized>(data: &T, compact: bool) -> String {
    let rendered = if compact {
        serde_json::to_string(data)
    } else {
        serde_json::to_string_pretty(data)
    };
    rendered.unwrap_or_else(|e| format!("{{\"error\":\"serialization failed: {e}\"}}"))
}

fn render_yaml<T: serde::Serialize + ?Sized>(data: &T) -> String {
    serde_yaml::to_string(data).unwrap_or_else(|e| format!("error: serialization failed: {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(serde::Serialize, Tabled)]
    struct Row {
        id: String,
    }

    #[test]
    fn plain_emits_one_id_per_line() {
        let data = vec![Row { id: "a".into() }, Row { id: "b".into() }];
        let out = render_list(
            &OutputFormat::Plain,
            &data,
            &data,
            |rows| rows.iter().map(|r| Row { id: r.id.clone() }).collect(),
            |r| r.id.clone(),
        );
        assert_eq!(out, "a\nb");
    }

    #[test]
    fn empty_table_says_so() {
        let data: Vec<Row> = Vec::new();
        let out = render_list(
            &OutputFormat::Table,
            &data,
            &data,
            |rows| rows.iter().map(|r| Row { id: r.id.clone() }).collect(),
            |r| r.id.clone(),
        );
        assert_eq!(out, "No notifications found.");
    }

    #[test]
    fn status_is_uncolored_when_disabled() {
        assert_eq!(paint_status(NotificationStatus::Rejected, false), "Rejected");
        assert!(paint_status(NotificationStatus::Rejected, true).contains("\u{1b}["));
    }
}
