//! Output formatting: JSON, YAML, table, plain.
//!
//! Structured formats serialize the result as-is. `table` prints one
//! `tabled` table per frame; `plain` prints tab-separated rows.

use std::io::{self, IsTerminal, Write};

use owo_colors::OwoColorize;
use serde::Serialize;
use tabled::{builder::Builder, settings::Style};

use triplex_core::{CheckHealthResult, DataResponse, Frame, QueryDataResponse};

use crate::cli::{ColorMode, OutputFormat};

// ── Color ────────────────────────────────────────────────────────────

/// Whether color output should be enabled.
pub fn should_color(mode: ColorMode) -> bool {
    match mode {
        ColorMode::Always => true,
        ColorMode::Never => false,
        ColorMode::Auto => io::stdout().is_terminal() && std::env::var_os("NO_COLOR").is_none(),
    }
}

// ── Render dispatchers ───────────────────────────────────────────────

/// Render a batch result.
pub fn render_query_result(
    format: OutputFormat,
    result: &QueryDataResponse,
    color: bool,
) -> String {
    match format {
        OutputFormat::Json => render_json(result, false),
        OutputFormat::JsonCompact => render_json(result, true),
        OutputFormat::Yaml => render_yaml(result),
        OutputFormat::Table => result
            .iter()
            .map(|(ref_id, response)| {
                let heading = format!("── {ref_id} ──");
                let heading = if color {
                    heading.bold().to_string()
                } else {
                    heading
                };
                format!("{heading}\n{}", render_response_table(response, color))
            })
            .collect::<Vec<_>>()
            .join("\n\n"),
        OutputFormat::Plain => result
            .iter()
            .flat_map(|(ref_id, response)| plain_lines(ref_id, response))
            .collect::<Vec<_>>()
            .join("\n"),
    }
}

/// Render a health probe result.
pub fn render_health(format: OutputFormat, result: &CheckHealthResult, color: bool) -> String {
    match format {
        OutputFormat::Json => render_json(result, false),
        OutputFormat::JsonCompact => render_json(result, true),
        OutputFormat::Yaml => render_yaml(result),
        OutputFormat::Table | OutputFormat::Plain => {
            let status = result.status.to_string();
            let status = match (color, result.is_ok()) {
                (false, _) => status,
                (true, true) => status.green().bold().to_string(),
                (true, false) => status.red().bold().to_string(),
            };
            format!("{status}: {}", result.message)
        }
    }
}

/// Render any serializable value; table falls back to TOML text.
pub fn render_document<T: Serialize>(format: OutputFormat, data: &T) -> String {
    match format {
        OutputFormat::Json => render_json(data, false),
        OutputFormat::JsonCompact => render_json(data, true),
        OutputFormat::Yaml => render_yaml(data),
        OutputFormat::Table | OutputFormat::Plain => toml::to_string_pretty(data)
            .unwrap_or_else(|e| format!("failed to render: {e}")),
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

// ── Frames ───────────────────────────────────────────────────────────

fn render_response_table(response: &DataResponse, color: bool) -> String {
    match response {
        DataResponse::Error(err) => {
            let label = format!("error [{}]", err.kind());
            let label = if color {
                label.red().to_string()
            } else {
                label
            };
            format!("{label}: {err}")
        }
        DataResponse::Frames(frames) if frames.is_empty() => "(no frames)".into(),
        DataResponse::Frames(frames) => frames
            .iter()
            .map(|frame| {
                let title = frame_title(frame);
                let title = if color {
                    title.dimmed().to_string()
                } else {
                    title
                };
                format!("{title}\n{}", frame_table(frame))
            })
            .collect::<Vec<_>>()
            .join("\n"),
    }
}

fn frame_title(frame: &Frame) -> String {
    let name = frame.name.as_deref().unwrap_or("(unnamed)");
    match frame.frame_type {
        Some(kind) => format!("{name} [{kind}] {} rows", frame.row_count()),
        None => format!("{name} {} rows", frame.row_count()),
    }
}

fn frame_table(frame: &Frame) -> String {
    let mut builder = Builder::default();
    builder.push_record(frame.fields.iter().map(|f| f.display_name().to_owned()));
    for row in 0..frame.row_count() {
        builder.push_record(frame_row(frame, row));
    }
    builder.build().with(Style::rounded()).to_string()
}

fn frame_row(frame: &Frame, row: usize) -> Vec<String> {
    frame
        .fields
        .iter()
        .map(|f| f.values.display_at(row).unwrap_or_default())
        .collect()
}

fn plain_lines(ref_id: &str, response: &DataResponse) -> Vec<String> {
    match response {
        DataResponse::Error(err) => vec![format!("{ref_id}\terror\t{}\t{err}", err.kind())],
        DataResponse::Frames(frames) => frames
            .iter()
            .flat_map(|frame| {
                (0..frame.row_count()).map(move |row| {
                    let mut cells = vec![ref_id.to_owned()];
                    cells.extend(frame_row(frame, row));
                    cells.join("\t")
                })
            })
            .collect(),
    }
}

// ── Format-specific renderers ────────────────────────────────────────

fn render_json<T: Serialize + ?Sized>(data: &T, compact: bool) -> String {
    let rendered = if compact {
        serde_json::to_string(data)
    } else {
        serde_json::to_string_pretty(data)
    };
    rendered.unwrap_or_else(|e| format!("{{\"error\": \"failed to render: {e}\"}}"))
}

fn render_yaml<T: Serialize + ?Sized>(data: &T) -> String {
    serde_yaml::to_string(data).unwrap_or_else(|e| format!("error: failed to render: {e}"))
}
