//! CLI output formatting for the merge pipeline.
//!
//! # Information-First Display
//!
//! Output is information-centric, not file-centric: the primary display for
//! every entity is its semantic identity (positional index plus name), with
//! origin details shown as indented context lines. Each command has a pure
//! `format_*` function (returns `Vec<String>`) for testability and a
//! `print_*` wrapper that writes to stdout. Format functions do no I/O.
//!
//! # Output Format
//!
//! ## Check
//!
//! ```text
//! Columns (2)
//!     Vorname
//!     Nachname
//! Rows: 2
//!
//! Template placeholders
//!     001 Anrede (no matching column)
//!     002 Vorname
//!
//! Filename pattern
//!     {Datum} has no matching column
//! ```
//!
//! ## Merge
//!
//! ```text
//! Documents
//! 001 Dokument_Muster_Anna.docx
//!     Row: 1
//! 002 Dokument_Meier_Bob.docx
//!     Row: 2
//!
//! Failures
//! 001 Dokument_Kaputt_Schmidt
//!     Row: 3
//!     Reason: render failed: template part word/document.xml is not valid UTF-8 XML
//!
//! Wrote dokumente.zip: 2 entries, 1 row failed
//! ```

use crate::batch::{BatchReport, CheckReport};

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

// ============================================================================
// Check output
// ============================================================================

/// Format the preflight report.
pub fn format_check_output(report: &CheckReport) -> Vec<String> {
    let mut lines = Vec::new();

    lines.push(format!("Columns ({})", report.columns.len()));
    for column in &report.columns {
        lines.push(format!("    {column}"));
    }
    lines.push(format!("Rows: {}", report.rows));

    lines.push(String::new());
    lines.push("Template placeholders".to_string());
    if report.template_placeholders.is_empty() {
        lines.push("    (none found)".to_string());
    }
    for (i, token) in report.template_placeholders.iter().enumerate() {
        let marker = if report.unknown_template_placeholders.contains(token) {
            " (no matching column)"
        } else {
            ""
        };
        lines.push(format!("    {} {}{}", format_index(i + 1), token, marker));
    }

    if !report.unknown_filename_placeholders.is_empty() {
        lines.push(String::new());
        lines.push("Filename pattern".to_string());
        for token in &report.unknown_filename_placeholders {
            lines.push(format!("    {{{token}}} has no matching column"));
        }
    }

    lines
}

/// Print check output to stdout.
pub fn print_check_output(report: &CheckReport) {
    for line in format_check_output(report) {
        println!("{}", line);
    }
}

// ============================================================================
// Merge output
// ============================================================================

/// Format the batch report after a merge run.
///
/// Rows are displayed 1-based (the first data row is "Row: 1"), matching
/// how users count lines in their spreadsheet below the header.
pub fn format_merge_output(report: &BatchReport, archive_name: &str) -> Vec<String> {
    let mut lines = Vec::new();

    lines.push("Documents".to_string());
    if report.entries.is_empty() {
        lines.push("    (none generated)".to_string());
    }
    for (i, entry) in report.entries.iter().enumerate() {
        lines.push(format!("{} {}", format_index(i + 1), entry.name));
        lines.push(format!("    Row: {}", entry.row + 1));
    }

    if !report.failures.is_empty() {
        lines.push(String::new());
        lines.push("Failures".to_string());
        for (i, failure) in report.failures.iter().enumerate() {
            lines.push(format!("{} {}", format_index(i + 1), failure.name));
            lines.push(format!("    Row: {}", failure.row + 1));
            lines.push(format!("    Reason: {}", failure.reason));
        }
    }

    lines.push(String::new());
    let failed = report.failures.len();
    let summary = if failed == 0 {
        format!(
            "Wrote {}: {} {}",
            archive_name,
            report.entries.len(),
            plural(report.entries.len(), "entry", "entries"),
        )
    } else {
        format!(
            "Wrote {}: {} {}, {} {} failed",
            archive_name,
            report.entries.len(),
            plural(report.entries.len(), "entry", "entries"),
            failed,
            plural(failed, "row", "rows"),
        )
    };
    lines.push(summary);

    lines
}

/// Print merge output to stdout.
pub fn print_merge_output(report: &BatchReport, archive_name: &str) {
    for line in format_merge_output(report, archive_name) {
        println!("{}", line);
    }
}

fn plural<'a>(count: usize, one: &'a str, many: &'a str) -> &'a str {
    if count == 1 { one } else { many }
}
