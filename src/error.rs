//! Errors raised while turning a source file into nominee records.

use std::path::PathBuf;
use thiserror::Error;

/// Failures at the data-loading boundary.
#[derive(Error, Debug)]
pub enum IngestError {
    /// The dataset file could not be read.
    #[error("Failed to read dataset {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A remote dataset could not be fetched.
    #[error("Failed to fetch dataset {url}: {message}")]
    Fetch { url: String, message: String },

    /// A required column is absent from the header row.
    #[error("Missing required column '{column}' (found: {found})")]
    MissingColumn { column: String, found: String },

    /// A year field is not an integer.
    #[error("Invalid year '{value}' on line {line}")]
    InvalidYear { line: usize, value: String },

    /// The CSV structure itself is broken.
    #[error("CSV error on line {line}: {message}")]
    Csv { line: usize, message: String },

    /// The header row could not be read.
    #[error("Failed to read CSV headers: {0}")]
    Headers(#[source] csv::Error),
}
