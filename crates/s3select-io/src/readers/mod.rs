//! The reader contract and its three implementations.
//!
//! A caller picks one reader per query, feeds every response chunk through
//! [`Reader::read`] in arrival order, and merges the partial results with
//! [`Reader::combine`]. Readers that can persist a combined result also
//! implement [`CacheableReader`]; callers discover that through
//! [`Reader::as_cacheable`].

pub mod jsonl;
pub mod rows;
pub mod tabular;

use std::path::Path;

use s3select_core::schema::ColumnSpec;
use s3select_core::select::{CsvOutput, OutputSerialization};

use crate::error::Result;

pub trait Reader {
    /// Decoded form of one chunk, and of the combination of many.
    type Output;

    /// Decode one response chunk. `columns` drives type interpretation where
    /// the reader does any.
    fn read(&self, chunk: &[u8], columns: &ColumnSpec) -> Result<Self::Output>;

    /// Merge partial results in the given order. An empty input yields an
    /// empty result.
    fn combine(&self, partials: Vec<Self::Output>) -> Self::Output;

    /// Response format this reader needs from the service. Constant for the
    /// lifetime of the reader.
    fn serialization(&self) -> &OutputSerialization;

    fn as_cacheable(&self) -> Option<&dyn CacheableReader<Output = Self::Output>> {
        None
    }

    fn supports_caching(&self) -> bool {
        self.as_cacheable().is_some()
    }

    /// `read` every chunk, then `combine`.
    fn read_all<'a, I>(&self, chunks: I, columns: &ColumnSpec) -> Result<Self::Output>
    where
        I: IntoIterator<Item = &'a [u8]>,
        Self: Sized,
    {
        let partials = chunks
            .into_iter()
            .map(|chunk| self.read(chunk, columns))
            .collect::<Result<Vec<_>>>()?;
        Ok(self.combine(partials))
    }
}

/// Readers whose combined result round-trips through a file on disk.
///
/// Writers to the same path must be serialized by the caller.
pub trait CacheableReader: Reader {
    fn read_cache(&self, path: &Path) -> Result<Self::Output>;

    fn write_cache(&self, path: &Path, contents: &Self::Output) -> Result<()>;
}

/// CSV reader configured for the dialect [`CsvOutput::reader_default`] asks
/// the service to produce. No header row; records may be ragged, callers
/// decide what that means.
pub(crate) fn csv_reader_builder() -> csv::ReaderBuilder {
    let dialect = CsvOutput::reader_default();
    let mut builder = csv::ReaderBuilder::new();
    builder
        .has_headers(false)
        .flexible(true)
        .delimiter(dialect.field_delimiter as u8)
        .quote(dialect.quote_character as u8)
        .double_quote(dialect.quote_escape_character == dialect.quote_character);
    builder
}

pub(crate) static CSV_SERIALIZATION: OutputSerialization =
    OutputSerialization::Csv(CsvOutput::reader_default());
