//! Format conversion seam (DOCX to PDF).
//!
//! The [`FormatConverter`] trait mirrors the rendering seam: an opaque,
//! single-call external capability with no retry. The production
//! implementation shells out to `pandoc`, which expects file paths, so each
//! conversion runs through a uniquely-named temporary directory that is
//! removed on every exit path. A fixed shared temp filename would be a
//! concurrency hazard across simultaneous invocations of the tool.
//!
//! Conversion is wired but off the default path: the stock output format is
//! DOCX-only, and PDF output is a configuration choice
//! ([`OutputFormat`](crate::config::OutputFormat)), not a redesign.

use std::path::PathBuf;
use std::process::Command;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConvertError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("conversion tool not available: {0}")]
    ToolUnavailable(String),
    #[error("conversion failed: {0}")]
    ToolFailed(String),
}

/// Trait for document format converters.
pub trait FormatConverter {
    /// Convert rendered DOCX bytes into the alternate format.
    fn convert(&self, doc: &[u8]) -> Result<Vec<u8>, ConvertError>;
}

/// Production converter: `pandoc in.docx -o out.pdf` through a scoped
/// temporary directory.
///
/// Requires pandoc plus a PDF engine (a LaTeX installation) on the host.
#[derive(Debug, Clone)]
pub struct PandocConverter {
    binary: String,
}

impl Default for PandocConverter {
    fn default() -> Self {
        Self::new("pandoc")
    }
}

impl PandocConverter {
    pub fn new(binary: impl Into<String>) -> Self {
        Self {
            binary: binary.into(),
        }
    }
}

impl FormatConverter for PandocConverter {
    fn convert(&self, doc: &[u8]) -> Result<Vec<u8>, ConvertError> {
        // TempDir removes the directory when dropped, including on the
        // error paths below.
        let dir = tempfile::TempDir::new()?;
        let docx_path: PathBuf = dir.path().join("input.docx");
        let pdf_path: PathBuf = dir.path().join("output.pdf");
        std::fs::write(&docx_path, doc)?;

        let output = Command::new(&self.binary)
            .arg(&docx_path)
            .arg("-o")
            .arg(&pdf_path)
            .output()
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    ConvertError::ToolUnavailable(self.binary.clone())
                } else {
                    ConvertError::Io(e)
                }
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(ConvertError::ToolFailed(stderr.trim().to_string()));
        }

        Ok(std::fs::read(&pdf_path)?)
    }
}
