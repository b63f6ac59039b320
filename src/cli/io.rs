//! Report output on stdout
//!
//! - JSON: one object per command, newline terminated
//! - Text: one line per file, findings indented beneath
//!
//! Logs never go here; see the observability module.

use std::fmt::Write as _;
use std::io::{self, Write};

use serde::Serialize;

use crate::integrity::{FileReport, IntegrityReport};

use super::errors::CliResult;

/// Writes `data` as a single JSON line to stdout.
pub fn write_json<T: Serialize>(data: &T) -> CliResult<()> {
    let mut stdout = io::stdout();
    serde_json::to_writer(&mut stdout, data)?;
    writeln!(stdout)?;
    stdout.flush()?;
    Ok(())
}

/// Writes preformatted text to stdout.
pub fn write_text(text: &str) -> CliResult<()> {
    let mut stdout = io::stdout();
    stdout.write_all(text.as_bytes())?;
    stdout.flush()?;
    Ok(())
}

/// Human-readable rendering of an integrity report.
pub fn render_report(report: &IntegrityReport) -> String {
    let mut out = String::new();
    for file in report.files.iter().chain(report.index.iter()) {
        render_file(&mut out, file);
    }

    let checked = report.files.len() + usize::from(report.index.is_some());
    let _ = writeln!(
        out,
        "{} file(s) checked, {} invalid, {} finding(s)",
        checked,
        report.invalid_file_count(),
        report.finding_count()
    );
    out
}

fn render_file(out: &mut String, file: &FileReport) {
    let status = if file.valid { "ok" } else { "FAIL" };
    let _ = writeln!(out, "{:<4} {}", status, file.file);
    for finding in &file.findings {
        let _ = writeln!(out, "     {}", finding);
    }
}
