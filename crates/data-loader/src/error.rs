//! Error types for the data-loader crate.

use thiserror::Error;

/// Errors that can occur while reading and parsing input data
#[derive(Error, Debug)]
pub enum DataLoadError {
    /// File could not be found or opened
    #[error("failed to open '{path}'")]
    Open {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// I/O error occurred while reading
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed CSV record
    #[error(transparent)]
    Csv(#[from] csv::Error),

    /// A field had a value that does not parse
    #[error("invalid value '{value}' for {field} at line {line}")]
    InvalidValue {
        field: &'static str,
        line: usize,
        value: String,
    },

    /// A record is missing expected columns
    #[error("expected at least {expected} fields but found {found} at line {line}")]
    FieldCountMismatch {
        expected: usize,
        found: usize,
        line: usize,
    },

    /// The input carried no usable rows
    #[error("empty input: {0}")]
    Empty(&'static str),

    /// Loaded data violated an engine invariant
    #[error(transparent)]
    Engine(#[from] engine::EngineError),
}

/// Convenience type alias for Results in this crate
pub type Result<T> = std::result::Result<T, DataLoadError>;
