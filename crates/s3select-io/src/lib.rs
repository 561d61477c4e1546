#![forbid(unsafe_code)]
//! s3select-io: decoders for chunked select-query responses.
//!
//! Three interchangeable [`Reader`]s turn raw response chunks into records:
//!
//! - [`TabularReader`]: CSV into a typed `RowBatch`, with an optional Parquet
//!   cache of the combined table (`parquet` feature, on by default).
//! - [`RowReader`]: CSV into a lazy stream of untyped string rows.
//! - [`JsonLinesReader`]: newline-delimited JSON into a lazy stream of values.
//!
//! Fetching chunks, choosing a reader, and managing cache paths all happen
//! outside this crate.

pub mod error;
pub mod readers;

#[cfg(feature = "parquet")]
pub mod parquet;

pub use error::{DecodeError, Error, Result};
pub use readers::jsonl::{ChunkValues, JsonLinesReader, JsonValues, StreamEnd};
pub use readers::rows::{Row, RowReader, Rows};
pub use readers::tabular::TabularReader;
pub use readers::{CacheableReader, Reader};
