//! Report rendering
//!
//! Text output uses the same ANSI palette as the rest of the CLI; JSON output
//! is the serde form of the report rows.

use anyhow::{Context, Result};
use serde::Serialize;

use super::constants::{APP_NAME, DEFAULT_PATTERN_PREVIEW, REQUEST_PREVIEW_MAX_LENGTH};
use crate::data::types::{AnalysisReport, SchemaField};
use crate::domain::normalize::StageStep;
use crate::utils::string::{format_seconds, pattern_preview, truncate_preview};

const BOLD: &str = "\x1b[1m";
const CYAN: &str = "\x1b[36m";
const GRAY: &str = "\x1b[90m";
const GREEN: &str = "\x1b[32m";
const YELLOW: &str = "\x1b[33m";
const RED: &str = "\x1b[31m";
const RESET: &str = "\x1b[0m";

/// Pretty-printed JSON of any report value
pub fn render_json<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    serde_json::to_string_pretty(value).context("Failed to serialize report")
}

fn heading(lines: &mut Vec<String>, title: &str, count: usize) {
    lines.push(String::new());
    lines.push(format!("  {BOLD}{title}{RESET} {GRAY}({count}){RESET}"));
}

fn request_cell(request: &str) -> String {
    truncate_preview(request, REQUEST_PREVIEW_MAX_LENGTH)
}

/// Human-readable report
pub fn render_text(report: &AnalysisReport) -> String {
    let mut lines = Vec::new();
    lines.push(format!(
        "  {BOLD}{CYAN}{APP_NAME}{RESET} {GRAY}engine={} records={} skipped={} groups={}{RESET}",
        report.engine, report.total_records, report.skipped_records, report.group_count
    ));

    heading(&mut lines, "Performance", report.performance.len());
    for row in &report.performance {
        lines.push(format!(
            "  {CYAN}{:<62}{RESET} n={:<6} total={:<10} avg={:<9} p95={:<9} p99={:<9} max={}",
            request_cell(&row.request),
            row.total_requests,
            format_seconds(row.total_time),
            format_seconds(row.avg_time),
            format_seconds(row.p95_time),
            format_seconds(row.p99_time),
            format_seconds(row.max_time),
        ));
        if !row.original_patterns.is_empty() {
            lines.push(format!(
                "    {GRAY}e.g. {}{RESET}",
                pattern_preview(
                    &row.original_patterns,
                    DEFAULT_PATTERN_PREVIEW,
                    REQUEST_PREVIEW_MAX_LENGTH
                )
            ));
        }
    }

    heading(&mut lines, "Status chart", report.status_chart.len());
    for row in &report.status_chart {
        lines.push(format!(
            "  {CYAN}{:<62}{RESET} total={:<6} {GREEN}2xx={:<5}{RESET} {GRAY}3xx={:<5}{RESET} {YELLOW}4xx={:<5}{RESET} {RED}5xx={}{RESET}",
            request_cell(&row.request),
            row.total,
            row.success,
            row.redirect,
            row.client_error,
            row.server_error,
        ));
    }

    heading(&mut lines, "Status codes", report.status_codes.len());
    for row in &report.status_codes {
        lines.push(format!(
            "  {:<62} {:>3}  {}",
            request_cell(&row.request),
            row.status,
            row.count
        ));
    }

    lines.push(String::new());
    lines.push(render_schema_text(&report.schema));
    lines.join("\n")
}

/// Schema as `name  TYPE  [nullable]` lines
pub fn render_schema_text(schema: &[SchemaField]) -> String {
    let width = schema.iter().map(|f| f.name.len()).max().unwrap_or(0);
    let mut lines = vec![format!(
        "  {BOLD}Schema{RESET} {GRAY}({}){RESET}",
        schema.len()
    )];
    for field in schema {
        let nullable = if field.nullable { " nullable" } else { "" };
        lines.push(format!(
            "  {:<width$}  {CYAN}{}{RESET}{GRAY}{}{RESET}",
            field.name, field.inferred_type, nullable
        ));
    }
    lines.join("\n")
}

/// Normalization result for one request, optionally with every stage output
pub fn render_normalize_text(raw: &str, steps: &[StageStep], trace: bool) -> String {
    let template = steps.last().map(|s| s.output.as_str()).unwrap_or(raw);
    let mut lines = vec![format!("  {raw} {GREEN}➜{RESET}  {CYAN}{template}{RESET}")];
    if trace {
        for (i, step) in steps.iter().enumerate() {
            lines.push(format!(
                "    {GRAY}{}. {:<22}{RESET} {}",
                i + 1,
                step.stage.name(),
                step.output
            ));
        }
    }
    lines.join("\n")
}
