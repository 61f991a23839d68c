//! Error types for loading provider data.

use thiserror::Error;

/// Errors that can occur while loading a MovieLens directory
#[derive(Error, Debug)]
pub enum LoadError {
    /// I/O error occurred while reading a file
    #[error("I/O error reading {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Line in a data file couldn't be parsed
    #[error("Parse error at line {line} in {file}: {reason}")]
    ParseError {
        file: String,
        line: usize,
        reason: String,
    },

    /// A field parsed but holds a value outside its domain
    #[error("Invalid value for {field}: {value}")]
    InvalidValue { field: String, value: String },

    /// A rating points at a movie that is not in movies.dat
    #[error("Missing reference: {entity} with id {id}")]
    MissingReference { entity: String, id: String },
}

/// Convenience type alias for Results in this crate
pub type Result<T> = std::result::Result<T, LoadError>;
