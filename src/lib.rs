#![forbid(unsafe_code)]
//! Decoders for chunked results of S3 Select style queries.
//!
//! Re-exports the workspace crates under one name:
//!
//! - [`model`]: column specs, decoded tables, request descriptors, config.
//! - [`io`]: the [`io::Reader`] contract and its tabular, row, and NDJSON
//!   implementations.
//!
//! ```
//! use s3select::model::schema::{ColumnSpec, DataType};
//! use s3select::io::{Reader, RowReader};
//!
//! let cols = ColumnSpec::from_pairs([("x", DataType::Int64), ("y", DataType::Utf8)]).unwrap();
//! let reader = RowReader::new();
//! let rows: Vec<_> = reader
//!     .read_all([&b"1,\"a\"\n"[..], &b"2,\"b\"\n"[..]], &cols)
//!     .unwrap()
//!     .collect::<Result<_, _>>()
//!     .unwrap();
//! assert_eq!(rows, vec![vec!["1", "a"], vec!["2", "b"]]);
//! ```

pub use s3select_core as model;
pub use s3select_io as io;
