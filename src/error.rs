//! Error types for the FIT-to-Parquet transformer library.

use thiserror::Error;

/// Result type alias for transformer operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while decoding FIT files or writing Parquet output.
#[derive(Debug, Error)]
pub enum Error {
    /// I/O error occurred while reading or writing
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid FIT file structure (bad header, wrong magic bytes)
    #[error("invalid FIT file: {0}")]
    InvalidFormat(String),

    /// FIT file failed its CRC integrity check
    #[error("FIT file integrity failure: {0}")]
    Integrity(String),

    /// Message stream decoding error (truncated record, missing definition)
    #[error("decode error: {0}")]
    Decode(String),

    /// Configuration file error
    #[error("configuration error: {0}")]
    Config(String),

    /// A value of the wrong type was handed to a column accumulator
    #[error("column type mismatch: {0}")]
    ColumnType(String),

    /// Arrow array or record batch error
    #[error("arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),

    /// Parquet write error
    #[error("parquet error: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),

    /// UTF-8 encoding/decoding error
    #[error("UTF-8 error: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}
