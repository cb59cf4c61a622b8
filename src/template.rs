//! DOCX template resource: open, inspect, fill, repack.
//!
//! A template is an OOXML word-processing document, which is a ZIP container
//! of XML parts. The merge fields are plain `{column}` tokens typed into the
//! document body. Filling a template is literal token substitution inside
//! the text-bearing XML parts followed by repacking the container:
//!
//! ```text
//! template.docx ──unzip──> word/document.xml   ──substitute──┐
//!                          word/header*.xml    ──substitute──┤──zip──> filled.docx
//!                          word/footer*.xml    ──substitute──┤
//!                          everything else     ──copied──────┘
//! ```
//!
//! ## Token rules
//!
//! - Substituted values are XML-escaped, so cell content like `Müller & Co`
//!   cannot corrupt the document markup.
//! - Tokens with no matching column are left verbatim in the output, same
//!   best-effort policy as filename expansion ([`crate::expand`]).
//! - A token must survive as a contiguous run of text in the XML. Word
//!   sometimes splits text typed with intermittent formatting across runs;
//!   retyping the token in one go keeps it contiguous.
//! - No escaping mechanism: literal `{column}` text is always substituted.
//!
//! ## Inspection
//!
//! [`TemplateDoc::placeholders`] scans the text parts for token candidates.
//! The preflight check uses this to warn about tokens that match no source
//! column before a batch runs.

use std::collections::BTreeSet;
use std::io::{Cursor, Read, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

use crate::source::RowContext;

#[derive(Error, Debug)]
pub enum TemplateError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("template is not a DOCX container: {0}")]
    Container(#[from] zip::result::ZipError),
    #[error("template is empty")]
    Empty,
    #[error("template has no word/document.xml part")]
    MissingDocumentPart,
    #[error("template part {0} is not valid UTF-8 XML")]
    InvalidPart(String),
    #[error("template not found: {0}")]
    NotFound(PathBuf),
    #[error("failed to pack starter template: {0}")]
    Pack(String),
}

/// An opaque, immutable DOCX template identified by its byte content.
#[derive(Debug, Clone)]
pub struct TemplateDoc {
    bytes: Vec<u8>,
}

/// The XML parts that carry document text and therefore merge tokens.
fn is_text_part(name: &str) -> bool {
    name == "word/document.xml"
        || name == "word/footnotes.xml"
        || name == "word/endnotes.xml"
        || (name.starts_with("word/header") && name.ends_with(".xml"))
        || (name.starts_with("word/footer") && name.ends_with(".xml"))
}

/// Escape a value for insertion into XML text content.
fn xml_escape(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Replace every `{key}` token in an XML part with the escaped value.
fn substitute(xml: &str, context: &RowContext) -> String {
    let mut result = xml.to_string();
    for (key, value) in context {
        let token = format!("{{{key}}}");
        if result.contains(&token) {
            result = result.replace(&token, &xml_escape(value));
        }
    }
    result
}

/// Scan XML text for `{name}` token candidates.
///
/// Best-effort by design: a candidate is a brace pair whose inner text
/// contains no whitespace, braces, or markup characters. Tokens split
/// across XML runs are not found (and would not be substituted either).
fn scan_tokens(xml: &str, found: &mut BTreeSet<String>) {
    let mut rest = xml;
    while let Some(start) = rest.find('{') {
        rest = &rest[start + 1..];
        let Some(end) = rest.find(['}', '{']) else {
            break;
        };
        if rest.as_bytes()[end] == b'}' {
            let candidate = &rest[..end];
            if !candidate.is_empty()
                && !candidate
                    .chars()
                    .any(|c| c.is_whitespace() || c == '<' || c == '>')
            {
                found.insert(candidate.to_string());
            }
            rest = &rest[end + 1..];
        }
        // On '{' the outer loop restarts the scan from the new brace.
    }
}

impl TemplateDoc {
    /// Load a template from its byte content.
    ///
    /// Validates that the bytes are a ZIP container with a
    /// `word/document.xml` part. The content is held immutably; every fill
    /// starts from the same pristine bytes.
    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self, TemplateError> {
        if bytes.is_empty() {
            return Err(TemplateError::Empty);
        }
        let mut archive = ZipArchive::new(Cursor::new(&bytes))?;
        archive
            .by_name("word/document.xml")
            .map_err(|_| TemplateError::MissingDocumentPart)?;
        Ok(Self { bytes })
    }

    /// Read and load a template file.
    pub fn from_path(path: &Path) -> Result<Self, TemplateError> {
        if !path.exists() {
            return Err(TemplateError::NotFound(path.to_path_buf()));
        }
        Self::from_bytes(std::fs::read(path)?)
    }

    /// All `{name}` token candidates found in the text-bearing parts.
    pub fn placeholders(&self) -> Result<BTreeSet<String>, TemplateError> {
        let mut archive = ZipArchive::new(Cursor::new(&self.bytes))?;
        let mut found = BTreeSet::new();
        for i in 0..archive.len() {
            let mut part = archive.by_index(i)?;
            if !is_text_part(part.name()) {
                continue;
            }
            let name = part.name().to_string();
            let mut xml = String::new();
            part.read_to_string(&mut xml)
                .map_err(|_| TemplateError::InvalidPart(name))?;
            scan_tokens(&xml, &mut found);
        }
        Ok(found)
    }

    /// Fill the template with a row context and repack the container.
    ///
    /// Pure function of the template bytes and the context: the same inputs
    /// produce byte-identical output. Non-text parts are copied through
    /// unchanged.
    pub fn fill(&self, context: &RowContext) -> Result<Vec<u8>, TemplateError> {
        let mut archive = ZipArchive::new(Cursor::new(&self.bytes))?;
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        // Pinned entry timestamp: rendering must stay a pure function of
        // template bytes and context, byte for byte.
        let options = SimpleFileOptions::default()
            .compression_method(CompressionMethod::Deflated)
            .last_modified_time(zip::DateTime::default());

        for i in 0..archive.len() {
            let mut part = archive.by_index(i)?;
            let name = part.name().to_string();
            if part.is_dir() {
                writer.add_directory(name, options)?;
                continue;
            }
            if is_text_part(&name) {
                let mut xml = String::new();
                part.read_to_string(&mut xml)
                    .map_err(|_| TemplateError::InvalidPart(name.clone()))?;
                let filled = substitute(&xml, context);
                writer.start_file(name, options)?;
                writer.write_all(filled.as_bytes())?;
            } else {
                let mut raw = Vec::new();
                part.read_to_end(&mut raw)?;
                writer.start_file(name, options)?;
                writer.write_all(&raw)?;
            }
        }

        Ok(writer.finish()?.into_inner())
    }
}

/// Build a minimal starter template demonstrating the token syntax.
///
/// Used by the `gen-template` subcommand so a new user has a working
/// `.docx` to open and adapt instead of starting from a blank document.
pub fn starter_template() -> Result<Vec<u8>, TemplateError> {
    use docx_rs::{Docx, Paragraph, Run};

    let lines = [
        "{Vorname} {Nachname}",
        "",
        "Sehr geehrte/r {Vorname} {Nachname},",
        "",
        "dieser Platzhaltertext wird pro Datenzeile ersetzt. Jede Spalte der",
        "Datenquelle ist als {Spaltenname} verwendbar.",
        "",
        "Mit freundlichen Grüßen",
    ];

    let mut docx = Docx::new();
    for line in lines {
        docx = docx.add_paragraph(Paragraph::new().add_run(Run::new().add_text(line)));
    }

    let mut buf = Cursor::new(Vec::new());
    docx.build()
        .pack(&mut buf)
        .map_err(|e| TemplateError::Pack(e.to_string()))?;
    Ok(buf.into_inner())
}
