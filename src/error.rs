//! Error handling for EPS file parsing.
//!
//! Provides error types with file/line context for malformed tokens,
//! reader defects, include resolution and table export failures.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EpsError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("File not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("Unsupported file format: {path} (expected .edf, .itl or .evf)")]
    UnsupportedFormat { path: PathBuf },

    #[error("Parse error in {path} at line {line}: {source}")]
    Parse {
        path: PathBuf,
        line: usize,
        #[source]
        source: Box<EpsError>,
    },

    #[error("Malformed time token '{token}': {reason}")]
    MalformedTime { token: String, reason: String },

    #[error("Malformed value '{value}' for {field}: {reason}")]
    MalformedValue {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Elapsed time '{token}' has no reference date to resolve against")]
    MissingReferenceDate { token: String },

    #[error("Missing mandatory header field: {field}")]
    MissingHeaderField { field: String },

    #[error(
        "Ragged table '{table}': column '{column}' has {found} values, expected {expected}"
    )]
    RaggedColumns {
        table: String,
        column: String,
        expected: usize,
        found: usize,
    },

    #[error("Event at {time} ({raw_time}) is {relation} the declared {bound} {limit}")]
    TimeOutOfRange {
        raw_time: String,
        time: chrono::NaiveDateTime,
        relation: &'static str,
        bound: &'static str,
        limit: chrono::NaiveDateTime,
    },

    #[error("Include cycle detected: {path} is already being merged")]
    IncludeCycle { path: PathBuf },

    #[error("Include depth {depth} exceeded while merging {path}")]
    IncludeDepthExceeded { path: PathBuf, depth: usize },

    #[error("Unknown table: {name}")]
    UnknownTable { name: String },
}

impl EpsError {
    /// Attach source location to a line-level failure.
    pub fn at(path: impl Into<PathBuf>, line: usize, source: EpsError) -> Self {
        Self::Parse {
            path: path.into(),
            line,
            source: Box::new(source),
        }
    }

    pub fn malformed_time(token: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::MalformedTime {
            token: token.into(),
            reason: reason.into(),
        }
    }

    pub fn malformed_value(
        field: impl Into<String>,
        value: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::MalformedValue {
            field: field.into(),
            value: value.into(),
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, EpsError>;
