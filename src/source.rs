//! Tabular data source parsing and row context building.
//!
//! The data source is delimiter-separated text (semicolon by default, the
//! common export format of German spreadsheet locales). The first record is
//! a mandatory header row that declares the column set; every following
//! record is one document to generate.
//!
//! ## Cell semantics
//!
//! Every cell is a string. There is no numeric or date inference: a cell
//! containing `0042` merges as `0042`. Rows shorter than the header are
//! padded with empty strings, so a missing cell is an empty value, never an
//! absent key. Rows longer than the header are rejected, since the extra
//! cells have no column to bind to.
//!
//! ## Row contexts
//!
//! [`TabularSource::context`] converts one row into a [`RowContext`], the
//! flat string-to-string mapping consumed by both document rendering
//! ([`crate::render`]) and filename expansion ([`crate::expand`]). Column
//! names must be unique so that context keys are unambiguous.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SourceError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("CSV parse error: {0}")]
    Csv(#[from] csv::Error),
    #[error("data source has no header row")]
    MissingHeader,
    #[error("duplicate column name: {0}")]
    DuplicateColumn(String),
    #[error("row {row} has {got} cells but the header declares {expected} columns")]
    RowTooLong {
        row: usize,
        expected: usize,
        got: usize,
    },
    #[error("data source not found: {0}")]
    NotFound(PathBuf),
}

/// String-keyed mapping derived from one row, used for rendering and
/// filename expansion. `BTreeMap` keeps key iteration deterministic.
pub type RowContext = BTreeMap<String, String>;

/// A parsed tabular source: header-declared columns plus data rows.
///
/// Rows preserve source order; row indices used throughout the pipeline
/// (fallback names, failure reports) are 0-based positions into this order.
#[derive(Debug, Clone)]
pub struct TabularSource {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl TabularSource {
    /// Parse delimiter-separated bytes into a source.
    ///
    /// The reader runs in flexible mode: short rows are padded with empty
    /// strings to the header width, long rows are a [`SourceError::RowTooLong`].
    pub fn parse(input: &[u8], delimiter: u8) -> Result<Self, SourceError> {
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(delimiter)
            .has_headers(true)
            .flexible(true)
            .from_reader(input);

        let headers: Vec<String> = reader.headers()?.iter().map(String::from).collect();
        if headers.is_empty() || headers.iter().all(|h| h.is_empty()) {
            return Err(SourceError::MissingHeader);
        }

        let mut seen = std::collections::HashSet::new();
        for header in &headers {
            if !seen.insert(header.as_str()) {
                return Err(SourceError::DuplicateColumn(header.clone()));
            }
        }

        let mut rows = Vec::new();
        for (i, result) in reader.records().enumerate() {
            let record = result?;
            let mut row: Vec<String> = record.iter().map(String::from).collect();
            if row.len() > headers.len() {
                return Err(SourceError::RowTooLong {
                    row: i,
                    expected: headers.len(),
                    got: row.len(),
                });
            }
            row.resize(headers.len(), String::new());
            rows.push(row);
        }

        Ok(Self { headers, rows })
    }

    /// Read and parse a source file.
    pub fn from_path(path: &Path, delimiter: u8) -> Result<Self, SourceError> {
        if !path.exists() {
            return Err(SourceError::NotFound(path.to_path_buf()));
        }
        let bytes = std::fs::read(path)?;
        Self::parse(&bytes, delimiter)
    }

    /// Column names in header order.
    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    /// Number of data rows (header excluded).
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Build the context for row `index`. Every column becomes a key, 1:1.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of range; callers iterate `0..len()`.
    pub fn context(&self, index: usize) -> RowContext {
        self.headers
            .iter()
            .cloned()
            .zip(self.rows[index].iter().cloned())
            .collect()
    }
}
