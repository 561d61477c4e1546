use thiserror::Error;

/// Result type local to s3select-io.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("decode error: {0}")]
    Decode(#[from] DecodeError),

    #[error("cache error: {0}")]
    Cache(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Core(#[from] s3select_core::error::Error),

    #[cfg(feature = "parquet")]
    #[error("parquet error: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),

    #[cfg(feature = "parquet")]
    #[error("arrow error: {0}")]
    Arrow(#[from] arrow_schema::ArrowError),
}

impl Error {
    /// True when the chunk itself was not valid input for the reader.
    pub fn is_decode(&self) -> bool {
        matches!(self, Error::Decode(_))
    }
}

/// A chunk that does not conform to the wire format a reader requested.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("chunk is not valid UTF-8: {0}")]
    Utf8(#[from] std::str::Utf8Error),

    #[error("malformed CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("row {row}, column '{column}': {message}")]
    Cast {
        row: usize,
        column: String,
        message: String,
    },

    #[error("row {row} has {found} fields, expected at most {expected}")]
    RowWidth {
        row: usize,
        expected: usize,
        found: usize,
    },
}
