//! Error types for the data-loader crate.
//!
//! Every variant describes a dataset that cannot be turned into a
//! [`RatingsTable`](crate::RatingsTable). Callers treat all of them as fatal
//! for model construction.

use thiserror::Error;

/// Errors that can occur while loading, merging or caching the ratings dataset
#[derive(Error, Debug)]
pub enum DataLoadError {
    /// File could not be found or opened
    #[error("Failed to open file: {path}")]
    FileNotFound { path: String },

    /// I/O error occurred while reading or writing a file
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// The CSV reader rejected the input outright (not a skippable bad row)
    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),

    /// Line in data file couldn't be parsed
    #[error("Parse error at line {line} in {file}: {reason}")]
    ParseError {
        file: String,
        line: u64,
        reason: String,
    },

    /// A required column is absent from the header row
    #[error("Missing column {column} in {file}")]
    MissingColumn { file: String, column: String },

    /// A data field had an invalid value
    #[error("Invalid value for {field}: {value}")]
    InvalidValue { field: String, value: String },

    /// The prepared cache could not be serialized or deserialized
    #[error("Cache error: {0}")]
    CacheError(#[from] serde_json::Error),

    /// Data validation failed
    #[error("Validation failed: {0}")]
    ValidationError(String),
}

/// Convenience type alias for Results in this crate
pub type Result<T> = std::result::Result<T, DataLoadError>;
