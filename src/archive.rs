//! Output archive assembly.
//!
//! The batch result is a single ZIP archive built in memory, deflate
//! compressed, with one or two entries per successful row. The builder is
//! append-only: entries are written in the order the orchestrator produces
//! them and are never revisited.
//!
//! ## Entry names
//!
//! Entry names come from user-controlled filename expansion, so the builder
//! enforces the archive invariants itself:
//!
//! - names are never empty (the caller guarantees this via the positional
//!   fallback, see [`crate::expand::fallback_name`]),
//! - names are unique: when two rows expand to the same name, the later
//!   entry gets the 0-based row index suffixed to its stem
//!   (`Dokument_Meier.docx`, then `Dokument_Meier_3.docx`).
//!
//! No other sanitization happens. A cell value containing `/` lands in the
//! entry name as-is, which unzips into a subdirectory; that is the faithful
//! substitution behavior, not a bug to fix silently.

use std::collections::BTreeSet;
use std::io::{Cursor, Write};
use thiserror::Error;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

#[derive(Error, Debug)]
pub enum ArchiveError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("archive write failed: {0}")]
    Zip(#[from] zip::result::ZipError),
}

/// Append-only in-memory ZIP builder with unique entry names.
pub struct ArchiveBuilder {
    writer: ZipWriter<Cursor<Vec<u8>>>,
    names: BTreeSet<String>,
}

impl Default for ArchiveBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ArchiveBuilder {
    pub fn new() -> Self {
        Self {
            writer: ZipWriter::new(Cursor::new(Vec::new())),
            names: BTreeSet::new(),
        }
    }

    /// Append `{stem}.{extension}` with the given bytes.
    ///
    /// `row` is the 0-based source row, used to disambiguate colliding
    /// names deterministically. Returns the entry name actually written.
    pub fn push(
        &mut self,
        stem: &str,
        extension: &str,
        bytes: &[u8],
        row: usize,
    ) -> Result<String, ArchiveError> {
        let mut name = format!("{stem}.{extension}");
        if self.names.contains(&name) {
            name = format!("{stem}_{row}.{extension}");
        }
        // A column value could itself spell the suffixed form; keep
        // appending the row index until the name is free. Terminates
        // because every iteration strictly lengthens the name.
        let suffix = format!(".{extension}");
        while self.names.contains(&name) {
            let stem_now = name.strip_suffix(&suffix).unwrap_or(&name).to_string();
            name = format!("{stem_now}_{row}.{extension}");
        }

        // Pinned entry timestamp, same batch in produces the same archive
        // bytes out.
        let options = SimpleFileOptions::default()
            .compression_method(CompressionMethod::Deflated)
            .last_modified_time(zip::DateTime::default());
        self.writer.start_file(name.as_str(), options)?;
        self.writer.write_all(bytes)?;
        self.names.insert(name.clone());
        Ok(name)
    }

    /// Number of entries written so far.
    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Finalize the central directory and return the archive bytes.
    pub fn finish(self) -> Result<Vec<u8>, ArchiveError> {
        Ok(self.writer.finish()?.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{archive_entry, archive_names};

    #[test]
    fn entries_preserve_insertion_order() {
        let mut builder = ArchiveBuilder::new();
        builder.push("Dokument_Muster_Anna", "docx", b"a", 0).unwrap();
        builder.push("Dokument_Meier_Bob", "docx", b"b", 1).unwrap();
        let bytes = builder.finish().unwrap();

        assert_eq!(
            archive_names(&bytes),
            ["Dokument_Muster_Anna.docx", "Dokument_Meier_Bob.docx"]
        );
    }

    #[test]
    fn entry_bytes_round_trip() {
        let mut builder = ArchiveBuilder::new();
        builder.push("brief", "docx", b"inhalt", 0).unwrap();
        let bytes = builder.finish().unwrap();
        assert_eq!(archive_entry(&bytes, "brief.docx"), b"inhalt");
    }

    #[test]
    fn colliding_name_gets_row_suffix() {
        let mut builder = ArchiveBuilder::new();
        let first = builder.push("Dokument_Meier", "docx", b"a", 0).unwrap();
        let second = builder.push("Dokument_Meier", "docx", b"b", 3).unwrap();

        assert_eq!(first, "Dokument_Meier.docx");
        assert_eq!(second, "Dokument_Meier_3.docx");

        let bytes = builder.finish().unwrap();
        assert_eq!(archive_entry(&bytes, "Dokument_Meier_3.docx"), b"b");
    }

    #[test]
    fn same_stem_different_extension_does_not_collide() {
        let mut builder = ArchiveBuilder::new();
        builder.push("brief", "docx", b"a", 0).unwrap();
        builder.push("brief", "pdf", b"b", 0).unwrap();
        let bytes = builder.finish().unwrap();
        assert_eq!(archive_names(&bytes), ["brief.docx", "brief.pdf"]);
    }

    #[test]
    fn suffixed_form_already_taken_keeps_appending() {
        let mut builder = ArchiveBuilder::new();
        builder.push("x", "docx", b"a", 0).unwrap();
        builder.push("x_2", "docx", b"b", 1).unwrap();
        // Row 2 collides with "x_2.docx" after the first suffix round.
        let name = builder.push("x_2", "docx", b"c", 2).unwrap();
        assert_eq!(name, "x_2_2.docx");
    }

    #[test]
    fn empty_archive_finishes_cleanly() {
        let builder = ArchiveBuilder::new();
        assert!(builder.is_empty());
        let bytes = builder.finish().unwrap();
        assert!(archive_names(&bytes).is_empty());
    }
}
