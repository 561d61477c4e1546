#![forbid(unsafe_code)]
//! s3select-core: shared types for decoding select-query results.
//!
//! Nothing in here performs I/O. The readers in `s3select-io` turn raw chunks
//! into the `RowBatch` tables defined here, and the transport uses the
//! descriptors in [`select`] to ask the remote service for a wire format the
//! readers understand.

pub mod config;
pub mod error;
pub mod prelude;
pub mod query;
pub mod schema;
pub mod select;
pub mod types;
