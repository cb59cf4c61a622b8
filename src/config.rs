//! Merge configuration module.
//!
//! Handles loading and validating an optional `merge.toml`. Configuration
//! is sparse: the file only needs the values that differ from the stock
//! defaults, and every setting can also be overridden per invocation on the
//! command line (CLI flag wins over file wins over default).
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! # Pattern for generated filenames; {Spalte} tokens come from the data
//! # source columns. A row whose expansion is blank falls back to Entry_<n>.
//! filename_template = "Dokument_{Nachname}_{Vorname}"
//!
//! # Name of the ZIP archive written by `merge`.
//! archive_name = "dokumente.zip"
//!
//! [source]
//! delimiter = ";"          # Cell delimiter of the data source
//!
//! [output]
//! format = "docx"          # docx | pdf | both
//!
//! [convert]
//! pandoc = "pandoc"        # Binary used for DOCX -> PDF conversion
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Which document formats a batch writes per row.
///
/// PDF output needs an external conversion toolchain, so the stock value is
/// DOCX-only; enabling PDF is a configuration change, not a redesign.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Docx,
    Pdf,
    Both,
}

impl OutputFormat {
    pub fn wants_docx(self) -> bool {
        matches!(self, OutputFormat::Docx | OutputFormat::Both)
    }

    pub fn wants_pdf(self) -> bool {
        matches!(self, OutputFormat::Pdf | OutputFormat::Both)
    }
}

/// Merge configuration loaded from `merge.toml`.
///
/// All fields have defaults. User config files need only specify the values
/// they want to override. Unknown keys are rejected.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MergeConfig {
    /// Filename pattern expanded per row.
    pub filename_template: String,
    /// Name of the output archive.
    pub archive_name: String,
    /// Data source settings.
    pub source: SourceConfig,
    /// Output format settings.
    pub output: OutputConfig,
    /// Format conversion settings.
    pub convert: ConvertConfig,
}

impl Default for MergeConfig {
    fn default() -> Self {
        Self {
            filename_template: "Dokument_{Nachname}_{Vorname}".to_string(),
            archive_name: "dokumente.zip".to_string(),
            source: SourceConfig::default(),
            output: OutputConfig::default(),
            convert: ConvertConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SourceConfig {
    /// Cell delimiter, a single ASCII character.
    pub delimiter: char,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self { delimiter: ';' }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OutputConfig {
    /// Formats written per row.
    pub format: OutputFormat,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConvertConfig {
    /// Conversion binary invoked for PDF output.
    pub pandoc: String,
}

impl Default for ConvertConfig {
    fn default() -> Self {
        Self {
            pandoc: "pandoc".to_string(),
        }
    }
}

impl MergeConfig {
    /// Validate config values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.source.delimiter.is_ascii() {
            return Err(ConfigError::Validation(
                "source.delimiter must be a single ASCII character".into(),
            ));
        }
        if self.archive_name.trim().is_empty() {
            return Err(ConfigError::Validation(
                "archive_name must not be empty".into(),
            ));
        }
        if self.convert.pandoc.trim().is_empty() {
            return Err(ConfigError::Validation(
                "convert.pandoc must not be empty".into(),
            ));
        }
        Ok(())
    }
}

/// Load config from a file, or return defaults when the file is absent.
pub fn load_config(path: &Path) -> Result<MergeConfig, ConfigError> {
    if !path.exists() {
        return Ok(MergeConfig::default());
    }
    let content = std::fs::read_to_string(path)?;
    let config: MergeConfig = toml::from_str(&content)?;
    config.validate()?;
    Ok(config)
}

/// Return a stock `merge.toml` with all options documented.
pub fn stock_config_toml() -> String {
    r#"# doc-merge configuration.
# All options are optional - the values below are the stock defaults.

# Pattern for generated filenames. {Spalte} tokens come from the data
# source columns; a row whose expansion is blank falls back to Entry_<n>.
filename_template = "Dokument_{Nachname}_{Vorname}"

# Name of the ZIP archive written by `merge`.
archive_name = "dokumente.zip"

[source]
# Cell delimiter of the data source (German spreadsheet exports use ";").
delimiter = ";"

[output]
# Formats written per row: "docx", "pdf", or "both".
# PDF output requires pandoc plus a LaTeX installation.
format = "docx"

[convert]
# Binary used for DOCX -> PDF conversion.
pandoc = "pandoc"
"#
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_stock_tool() {
        let config = MergeConfig::default();
        assert_eq!(config.filename_template, "Dokument_{Nachname}_{Vorname}");
        assert_eq!(config.archive_name, "dokumente.zip");
        assert_eq!(config.source.delimiter, ';');
        assert_eq!(config.output.format, OutputFormat::Docx);
    }

    #[test]
    fn sparse_override_keeps_other_defaults() {
        let config: MergeConfig = toml::from_str("[output]\nformat = \"both\"\n").unwrap();
        assert_eq!(config.output.format, OutputFormat::Both);
        assert_eq!(config.archive_name, "dokumente.zip");
        assert_eq!(config.source.delimiter, ';');
    }

    #[test]
    fn unknown_keys_rejected() {
        let result: Result<MergeConfig, _> = toml::from_str("archiv_name = \"x.zip\"\n");
        assert!(result.is_err());
    }

    #[test]
    fn format_values_parse_lowercase() {
        for (text, expected) in [
            ("docx", OutputFormat::Docx),
            ("pdf", OutputFormat::Pdf),
            ("both", OutputFormat::Both),
        ] {
            let config: MergeConfig =
                toml::from_str(&format!("[output]\nformat = \"{text}\"\n")).unwrap();
            assert_eq!(config.output.format, expected);
        }
    }

    #[test]
    fn format_paths() {
        assert!(OutputFormat::Docx.wants_docx());
        assert!(!OutputFormat::Docx.wants_pdf());
        assert!(!OutputFormat::Pdf.wants_docx());
        assert!(OutputFormat::Pdf.wants_pdf());
        assert!(OutputFormat::Both.wants_docx());
        assert!(OutputFormat::Both.wants_pdf());
    }

    #[test]
    fn non_ascii_delimiter_rejected() {
        let config: MergeConfig = toml::from_str("[source]\ndelimiter = \"€\"\n").unwrap();
        assert!(matches!(config.validate(), Err(ConfigError::Validation(_))));
    }

    #[test]
    fn blank_archive_name_rejected() {
        let config: MergeConfig = toml::from_str("archive_name = \"  \"\n").unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn missing_file_yields_defaults() {
        let config = load_config(Path::new("/nonexistent/merge.toml")).unwrap();
        assert_eq!(config.archive_name, "dokumente.zip");
    }

    #[test]
    fn stock_config_parses_to_defaults() {
        let parsed: MergeConfig = toml::from_str(&stock_config_toml()).unwrap();
        let stock = MergeConfig::default();
        assert_eq!(parsed.filename_template, stock.filename_template);
        assert_eq!(parsed.archive_name, stock.archive_name);
        assert_eq!(parsed.source.delimiter, stock.source.delimiter);
        assert_eq!(parsed.output.format, stock.output.format);
        assert_eq!(parsed.convert.pandoc, stock.convert.pandoc);
    }
}
