//! # doc-merge
//!
//! A mail-merge batch document generator. A DOCX template with `{column}`
//! placeholder tokens plus a delimiter-separated data source produce one
//! filled document per row, packaged into a single ZIP archive.
//!
//! # Architecture: Per-Row Pipeline
//!
//! Every batch runs the same one-directional pipeline over each data row:
//!
//! ```text
//! data row  →  row context  →  filename expansion
//!                           →  rendered DOCX  (→ converted PDF)  →  archive entry
//! ```
//!
//! The stages are deliberately separated:
//!
//! - **Testability**: expansion and orchestration are pure logic, tested
//!   without touching DOCX packing; rendering and conversion sit behind
//!   traits with mock implementations.
//! - **Isolation**: a row that fails to render is recorded and skipped;
//!   the archive is assembled from the successes and the report lists the
//!   failures, so one bad row never discards the whole batch.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`expand`] | `{column}` token substitution for filename patterns, blank-name fallback |
//! | [`source`] | Tabular source parsing (semicolon CSV, header-declared columns), row contexts |
//! | [`template`] | DOCX template resource: open, inspect placeholders, fill, repack |
//! | [`render`] | `DocumentRenderer` capability seam and the production DOCX renderer |
//! | [`convert`] | `FormatConverter` capability seam and the pandoc-based PDF converter |
//! | [`archive`] | Append-only in-memory ZIP builder with unique entry names |
//! | [`batch`] | Batch orchestrator: preconditions, per-row loop, failure report; preflight check |
//! | [`config`] | `merge.toml` loading, validation, stock config generation |
//! | [`output`] | CLI output formatting, information-first display of results |
//!
//! # Design Decisions
//!
//! ## Best-Effort Substitution
//!
//! A token with no matching column is left verbatim, in documents and in
//! filenames. A malformed or unknown placeholder never blocks generation;
//! the `check` subcommand surfaces unknown tokens before a batch runs.
//! There is no escaping mechanism, so literal text that spells a valid
//! `{column}` token is always substituted. That is documented behavior,
//! kept rather than silently "fixed" with an escape syntax.
//!
//! ## In-Process Rendering, External Conversion
//!
//! Filling a DOCX is ZIP-and-XML work the `zip` crate handles in process,
//! with no system dependencies. PDF conversion is different: it needs a
//! real layout engine, so it shells out to pandoc behind the
//! [`convert::FormatConverter`] seam and stays off the default path
//! (DOCX-only output) until explicitly enabled.
//!
//! ## One Logical Worker
//!
//! The batch is single-threaded and synchronous. Runs are human-attended
//! and bounded by their data source; the simplicity of one append-only
//! archive writer and zero shared mutable state outweighs the win from
//! parallel rendering.

pub mod archive;
pub mod batch;
pub mod config;
pub mod convert;
pub mod expand;
pub mod output;
pub mod render;
pub mod source;
pub mod template;

#[cfg(test)]
pub(crate) mod test_helpers;
