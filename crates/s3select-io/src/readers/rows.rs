//! CSV chunks into lazy streams of untyped string rows.

use std::fmt;
use std::io::Cursor;

use s3select_core::schema::ColumnSpec;
use s3select_core::select::OutputSerialization;

use super::{csv_reader_builder, Reader, CSV_SERIALIZATION};
use crate::error::{DecodeError, Error, Result};

/// One record, fields in response order. No type coercion is applied.
pub type Row = Vec<String>;

/// Pull-based row stream. Rows are parsed only as they are requested;
/// dropping the stream abandons the rest of the work.
pub struct Rows {
    inner: Box<dyn Iterator<Item = Result<Row>> + Send>,
}

impl Rows {
    pub fn new<I>(iter: I) -> Self
    where
        I: Iterator<Item = Result<Row>> + Send + 'static,
    {
        Self {
            inner: Box::new(iter),
        }
    }

    pub fn empty() -> Self {
        Self::new(std::iter::empty())
    }
}

impl Iterator for Rows {
    type Item = Result<Row>;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next()
    }
}

impl fmt::Debug for Rows {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Rows").finish_non_exhaustive()
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct RowReader;

impl RowReader {
    pub fn new() -> Self {
        Self
    }
}

impl Reader for RowReader {
    type Output = Rows;

    /// The chunk must be UTF-8; that is checked up front. Rows are ragged
    /// if the response is, `columns` is not consulted.
    fn read(&self, chunk: &[u8], _columns: &ColumnSpec) -> Result<Rows> {
        std::str::from_utf8(chunk).map_err(DecodeError::Utf8)?;
        tracing::trace!(bytes = chunk.len(), "queued row chunk");

        let records = csv_reader_builder()
            .from_reader(Cursor::new(chunk.to_vec()))
            .into_records()
            .map(|rec| {
                rec.map(|r| r.iter().map(str::to_string).collect())
                    .map_err(|e| Error::from(DecodeError::Csv(e)))
            });
        Ok(Rows::new(records))
    }

    fn combine(&self, partials: Vec<Rows>) -> Rows {
        tracing::trace!(parts = partials.len(), "chaining row streams");
        Rows::new(partials.into_iter().flatten())
    }

    fn serialization(&self) -> &OutputSerialization {
        &CSV_SERIALIZATION
    }
}
