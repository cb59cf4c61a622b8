//! Batch orchestration: the per-row merge loop.
//!
//! The orchestrator drives the whole pipeline for one batch:
//!
//! ```text
//! for each row (source order, position i from 0):
//!     1. build the row context
//!     2. expand the filename pattern (blank -> Entry_i)
//!     3. render the document            ── row failure on error
//!     4. convert to PDF if configured   ── row failure on error
//!     5. write the staged entries into the archive
//! ```
//!
//! ## Failure policy
//!
//! A failing row is recorded and skipped; the remaining rows continue. The
//! archive holds the successes and the [`BatchReport`] lists every failure
//! with its row index and reason, so a single bad row neither aborts the
//! batch nor silently drops data. Only precondition violations (empty
//! source) and archive-write failures abort the whole run, and then no
//! archive is surfaced at all.
//!
//! Entries for a row are staged and written only after every step for that
//! row succeeded: with `both` output, a failed PDF conversion must not
//! leave a half-merged row (a DOCX entry without its PDF sibling).
//!
//! ## Execution model
//!
//! Single-threaded and synchronous. The template bytes are shared read-only
//! across rows; the archive is appended to by exactly one logical worker.
//! No timeouts are enforced on the render/convert calls; this is an
//! interactive, human-attended tool, not a service.

use serde::Serialize;
use thiserror::Error;

use crate::archive::{ArchiveBuilder, ArchiveError};
use crate::config::OutputFormat;
use crate::convert::FormatConverter;
use crate::expand::{expand, fallback_name, tokens};
use crate::render::DocumentRenderer;
use crate::source::TabularSource;
use crate::template::{TemplateDoc, TemplateError};

#[derive(Error, Debug)]
pub enum BatchError {
    #[error("data source has no rows; nothing to generate")]
    EmptySource,
    #[error("archive error: {0}")]
    Archive(#[from] ArchiveError),
}

/// Per-batch settings, resolved from config and CLI flags by the caller.
#[derive(Debug, Clone)]
pub struct BatchOptions {
    /// Filename pattern expanded per row.
    pub filename_template: String,
    /// Formats written per row.
    pub format: OutputFormat,
}

/// One archive entry written for a successful row.
#[derive(Debug, Clone, Serialize)]
pub struct ArchiveEntry {
    /// 0-based source row the entry belongs to.
    pub row: usize,
    /// Entry name inside the archive.
    pub name: String,
}

/// One skipped row, with the reason it failed.
#[derive(Debug, Clone, Serialize)]
pub struct RowFailure {
    /// 0-based source row.
    pub row: usize,
    /// Expanded filename stem, for identifying the row in the report.
    pub name: String,
    /// Human-readable failure reason.
    pub reason: String,
}

/// Result of a batch run: the archive plus what went into it.
#[derive(Debug)]
pub struct BatchReport {
    /// Entries written, in archive order.
    pub entries: Vec<ArchiveEntry>,
    /// Rows skipped because rendering or conversion failed.
    pub failures: Vec<RowFailure>,
    /// The finished ZIP archive.
    pub archive: Vec<u8>,
}

impl BatchReport {
    /// Rows that produced at least one entry.
    pub fn successful_rows(&self) -> usize {
        let mut rows: Vec<usize> = self.entries.iter().map(|e| e.row).collect();
        rows.dedup();
        rows.len()
    }
}

/// Run the full batch over every source row.
///
/// Preconditions: the template is present and valid (guaranteed by
/// [`TemplateDoc::from_bytes`]) and the source has at least one data row;
/// an empty source is a [`BatchError::EmptySource`] before anything runs.
pub fn run(
    template: &TemplateDoc,
    source: &TabularSource,
    renderer: &impl DocumentRenderer,
    converter: &impl FormatConverter,
    options: &BatchOptions,
) -> Result<BatchReport, BatchError> {
    if source.is_empty() {
        return Err(BatchError::EmptySource);
    }

    let mut builder = ArchiveBuilder::new();
    let mut entries = Vec::new();
    let mut failures = Vec::new();

    for row in 0..source.len() {
        let context = source.context(row);
        let stem = fallback_name(&expand(&options.filename_template, &context), row);

        let docx = match renderer.render(template, &context) {
            Ok(bytes) => bytes,
            Err(e) => {
                failures.push(RowFailure {
                    row,
                    name: stem,
                    reason: e.to_string(),
                });
                continue;
            }
        };

        // Stage everything for the row before touching the archive.
        let pdf = if options.format.wants_pdf() {
            match converter.convert(&docx) {
                Ok(bytes) => Some(bytes),
                Err(e) => {
                    failures.push(RowFailure {
                        row,
                        name: stem,
                        reason: e.to_string(),
                    });
                    continue;
                }
            }
        } else {
            None
        };

        if options.format.wants_docx() {
            let name = builder.push(&stem, "docx", &docx, row)?;
            entries.push(ArchiveEntry { row, name });
        }
        if let Some(pdf) = pdf {
            let name = builder.push(&stem, "pdf", &pdf, row)?;
            entries.push(ArchiveEntry { row, name });
        }
    }

    Ok(BatchReport {
        entries,
        failures,
        archive: builder.finish()?,
    })
}

/// Pre-flight inspection of a template/source pair.
///
/// Everything the `check` subcommand reports: the declared columns, the
/// row count, the tokens found in the template body, and the tokens (in
/// template or filename pattern) that match no column. Unknown tokens are
/// not errors, substitution is best-effort, but they are the most common
/// authoring mistake and worth surfacing before a batch runs.
#[derive(Debug, Serialize)]
pub struct CheckReport {
    pub columns: Vec<String>,
    pub rows: usize,
    pub template_placeholders: Vec<String>,
    pub unknown_template_placeholders: Vec<String>,
    pub unknown_filename_placeholders: Vec<String>,
}

pub fn preflight(
    template: &TemplateDoc,
    source: &TabularSource,
    filename_template: &str,
) -> Result<CheckReport, TemplateError> {
    let columns: Vec<String> = source.headers().to_vec();
    let in_template = template.placeholders()?;
    let in_filename = tokens(filename_template);

    let known = |token: &String| columns.iter().any(|c| c == token);
    let unknown_template: Vec<String> =
        in_template.iter().filter(|t| !known(t)).cloned().collect();
    let unknown_filename: Vec<String> =
        in_filename.iter().filter(|t| !known(t)).cloned().collect();

    Ok(CheckReport {
        columns,
        rows: source.len(),
        template_placeholders: in_template.into_iter().collect(),
        unknown_template_placeholders: unknown_template,
        unknown_filename_placeholders: unknown_filename,
    })
}
