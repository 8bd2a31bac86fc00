//! Error types for the data-loader crate.
//!
//! Only construction can fail. Once a [`Catalog`](crate::Catalog) and a
//! [`SimilarityMatrix`](crate::SimilarityMatrix) exist, every query over them
//! is total.

use thiserror::Error;

/// Errors that can occur while loading the dataset or the similarity matrix
#[derive(Error, Debug)]
pub enum DataLoadError {
    /// File could not be found or opened
    #[error("Failed to open file: {path}")]
    FileNotFound { path: String },

    /// I/O error occurred while reading file
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// The CSV reader rejected the file (bad quoting, missing header, ...)
    #[error("CSV error in {file}: {source}")]
    Csv {
        file: String,
        #[source]
        source: csv::Error,
    },

    /// A row in the dataset couldn't be turned into a movie record
    #[error("Parse error at line {line} in {file}: {reason}")]
    ParseError {
        file: String,
        line: u64,
        reason: String,
    },

    /// The similarity matrix file is not valid JSON of the expected shape
    #[error("Invalid similarity matrix JSON: {0}")]
    MatrixJson(#[from] serde_json::Error),

    /// A data field had an invalid value
    #[error("Invalid value for {field}: {value}")]
    InvalidValue { field: String, value: String },

    /// The similarity matrix is not square or not aligned with the catalog
    #[error("Similarity matrix has {found} entries where {expected} were expected ({context})")]
    DimensionMismatch {
        expected: usize,
        found: usize,
        context: String,
    },

    /// The dataset had a header but no rows
    #[error("Dataset {file} contains no movies")]
    EmptyDataset { file: String },
}

/// Convenience type alias for Results in this crate
pub type Result<T> = std::result::Result<T, DataLoadError>;
