//! Output formatting: table, JSON, plain.
//!
//! Renders data in the format selected by `--output`. Table uses `tabled`,
//! structured formats use serde, plain emits one value per line.

use std::io::{self, IsTerminal, Write};
use std::time::Duration;

use clap::ValueEnum;
use indicatif::{ProgressBar, ProgressStyle};
use owo_colors::OwoColorize;
use tabled::{Table, Tabled, settings::Style};

use switchboard_config::Defaults;
use switchboard_core::ConnectionState;

use crate::cli::{ColorMode, GlobalOpts, OutputFormat};
use crate::error::CliError;

const SPINNER_TICK_CHARS: &str = "⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏";
const SPINNER_TICK_MS: u64 = 80;

// ── Resolved output settings ─────────────────────────────────────────

/// Output settings after merging flags with config defaults.
#[derive(Debug, Clone, Copy)]
pub struct Output {
    pub format: OutputFormat,
    pub color: bool,
    pub quiet: bool,
}

impl Output {
    /// Flags win; unparseable config values fall back to table / auto.
    pub fn resolve(global: &GlobalOpts, defaults: &Defaults) -> Self {
        let format = global
            .output
            .or_else(|| OutputFormat::from_str(&defaults.output, true).ok())
            .unwrap_or(OutputFormat::Table);
        let color = global
            .color
            .or_else(|| ColorMode::from_str(&defaults.color, true).ok())
            .unwrap_or(ColorMode::Auto);

        Self {
            format,
            color: should_color(color),
            quiet: global.quiet,
        }
    }

    /// Print the rendered output to stdout, respecting quiet mode.
    pub fn print(&self, output: &str) {
        print_output(output, self.quiet);
    }

    /// Spinner on stderr for interactive table output, `None` otherwise.
    pub fn spinner(&self, message: &str) -> Option<ProgressBar> {
        if self.quiet || self.format != OutputFormat::Table || !io::stderr().is_terminal() {
            return None;
        }

        let style = ProgressStyle::default_spinner()
            .template("{spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_chars(SPINNER_TICK_CHARS);

        let pb = ProgressBar::new_spinner();
        pb.set_style(style);
        pb.set_message(message.to_owned());
        pb.enable_steady_tick(Duration::from_millis(SPINNER_TICK_MS));
        Some(pb)
    }
}

/// Determine whether color output should be enabled.
pub fn should_color(mode: ColorMode) -> bool {
    match mode {
        ColorMode::Always => true,
        ColorMode::Never => false,
        ColorMode::Auto => io::stdout().is_terminal() && std::env::var("NO_COLOR").is_err(),
    }
}

// ── Indicators ───────────────────────────────────────────────────────

/// Connection indicator, e.g. `● connected`.
pub fn connection_indicator(state: ConnectionState, color: bool) -> String {
    let (glyph, label) = match state {
        ConnectionState::Connected => ("●", "connected"),
        ConnectionState::Disconnected => ("○", "disconnected"),
        ConnectionState::Unknown => ("?", "unknown"),
    };
    let text = format!("{glyph} {label}");
    if !color {
        return text;
    }
    match state {
        ConnectionState::Connected => text.green().bold().to_string(),
        ConnectionState::Disconnected => text.red().bold().to_string(),
        ConnectionState::Unknown => text.yellow().to_string(),
    }
}

/// `ON` / `OFF`, colored when enabled.
pub fn on_off(on: bool, color: bool) -> String {
    match (on, color) {
        (true, true) => "ON".green().bold().to_string(),
        (false, true) => "OFF".dimmed().to_string(),
        (true, false) => "ON".into(),
        (false, false) => "OFF".into(),
    }
}

// ── Render dispatchers ───────────────────────────────────────────────

/// Render a single serde-serializable item in the chosen format.
///
/// Table rendering uses a custom `detail_fn` that returns a pre-formatted
/// string, since single-item views don't use `Tabled` derive.
pub fn render_single<T>(
    format: OutputFormat,
    data: &T,
    detail_fn: impl Fn(&T) -> String,
    plain_fn: impl Fn(&T) -> String,
) -> Result<String, CliError>
where
    T: serde::Serialize,
{
    match format {
        OutputFormat::Table => Ok(detail_fn(data)),
        OutputFormat::Json => render_json(data, false),
        OutputFormat::JsonCompact => render_json(data, true),
        OutputFormat::Plain => Ok(plain_fn(data)),
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

// ── Format-specific renderers ────────────────────────────────────────

pub(crate) fn render_table<R: Tabled>(rows: &[R]) -> String {
    Table::new(rows).with(Style::rounded()).to_string()
}

pub(crate) fn render_json<T: serde::Serialize + ?Sized>(
    data: &T,
    compact: bool,
) -> Result<String, CliError> {
    if compact {
        Ok(serde_json::to_string(data)?)
    } else {
        Ok(serde_json::to_string_pretty(data)?)
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    #[derive(serde::Serialize)]
    struct Item {
        name: &'static str,
        on: bool,
    }

    #[test]
    fn plain_single_uses_plain_fn() {
        let out = render_single(
            OutputFormat::Plain,
            &Item { name: "pump", on: true },
            |_| "table".into(),
            |i| format!("{}={}", i.name, i.on),
        )
        .unwrap();
        assert_eq!(out, "pump=true");
    }

    #[test]
    fn compact_json_is_single_line() {
        let out = render_single(
            OutputFormat::JsonCompact,
            &Item { name: "pump", on: true },
            |_| String::new(),
            |_| String::new(),
        )
        .unwrap();
        assert_eq!(out, r#"{"name":"pump","on":true}"#);
    }

    #[test]
    fn indicators_without_color_are_plain_text() {
        assert_eq!(
            connection_indicator(ConnectionState::Connected, false),
            "● connected"
        );
        assert_eq!(
            connection_indicator(ConnectionState::Disconnected, false),
            "○ disconnected"
        );
        assert_eq!(on_off(true, false), "ON");
        assert_eq!(on_off(false, false), "OFF");
    }
}
