use std::fmt;
use std::path::PathBuf;

use serde::Serialize;
use thiserror::Error;

/// Failure while turning raw input into a [`SalesTable`](crate::data::model::SalesTable).
#[derive(Debug, Error)]
pub enum LoadError {
    /// A required column is absent from the header row.
    #[error("missing required column(s): {}", .missing.join(", "))]
    Schema { missing: Vec<String> },

    /// A date or numeric cell could not be parsed.
    #[error("line {line}, column '{column}': cannot parse '{value}' as {expected}")]
    Parse {
        line: usize,
        column: String,
        value: String,
        expected: &'static str,
    },

    #[error("line {line}: cell is not valid UTF-8")]
    Encoding { line: usize },

    #[error("unsupported file extension: .{0}")]
    UnsupportedFormat(String),

    #[error("malformed delimited text: {0}")]
    Csv(#[from] csv::Error),

    #[error("malformed JSON records: {0}")]
    Json(#[from] serde_json::Error),

    #[error("unexpected JSON layout: {0}")]
    JsonShape(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl LoadError {
    /// Whether this error is about a single row rather than the whole input.
    pub fn is_row_error(&self) -> bool {
        matches!(self, LoadError::Parse { .. } | LoadError::Encoding { .. })
    }
}

/// Failure while serialising a table or the derived views.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("writing delimited text: {0}")]
    Csv(#[from] csv::Error),

    #[error("writing JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("exported text is not UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("reading config {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("parsing config: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("delimiter must be a single ASCII character, got {0:?}")]
    InvalidDelimiter(char),
}

/// Non-fatal outcome of filtering. Presentation renders an empty state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum FilterWarning {
    /// No row satisfies the criteria.
    EmptyResult,
    /// The start date lies after the end date; the result is empty.
    InvalidRange,
}

impl fmt::Display for FilterWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FilterWarning::EmptyResult => write!(f, "no records match the selected filters"),
            FilterWarning::InvalidRange => write!(f, "start date is after end date"),
        }
    }
}
