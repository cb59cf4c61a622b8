//! Shared test utilities for the doc-merge test suite.
//!
//! Provides the canonical two-row fixture source, DOCX template fixtures
//! built with `docx-rs` (real OOXML containers, so template tests exercise
//! the same parsing path as production), and ZIP readback helpers for
//! asserting on archive contents.

use std::io::{Cursor, Read};

use crate::source::TabularSource;
use crate::template::TemplateDoc;

/// The canonical fixture source: two rows under `Vorname;Nachname`.
pub fn sample_csv() -> &'static str {
    "Vorname;Nachname\nAnna;Muster\nBob;Meier\n"
}

/// Parse semicolon-delimited text into a source. Panics on parse errors.
pub fn source_from(text: &str) -> TabularSource {
    TabularSource::parse(text.as_bytes(), b';').unwrap()
}

pub fn sample_source() -> TabularSource {
    source_from(sample_csv())
}

/// Build a real DOCX template with one paragraph per line.
///
/// `docx-rs` packs a genuine OOXML container, so fixtures go through the
/// exact container parsing the production renderer uses.
pub fn fixture_template(lines: &[&str]) -> TemplateDoc {
    use docx_rs::{Docx, Paragraph, Run};

    let mut docx = Docx::new();
    for line in lines {
        docx = docx.add_paragraph(Paragraph::new().add_run(Run::new().add_text(*line)));
    }

    let mut buf = Cursor::new(Vec::new());
    docx.build().pack(&mut buf).unwrap();
    TemplateDoc::from_bytes(buf.into_inner()).unwrap()
}

/// Entry names of a ZIP archive, in central directory order.
pub fn archive_names(bytes: &[u8]) -> Vec<String> {
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
    (0..archive.len())
        .map(|i| archive.by_index(i).unwrap().name().to_string())
        .collect()
}

/// Read one entry out of a ZIP archive. Panics if the entry is missing.
pub fn archive_entry(bytes: &[u8], name: &str) -> Vec<u8> {
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
    let mut entry = archive.by_name(name).unwrap_or_else(|_| {
        panic!("entry '{name}' not found in archive");
    });
    let mut content = Vec::new();
    entry.read_to_end(&mut content).unwrap();
    content
}

/// The `word/document.xml` part of a DOCX, as a string.
pub fn document_xml(docx_bytes: &[u8]) -> String {
    String::from_utf8(archive_entry(docx_bytes, "word/document.xml")).unwrap()
}
