//! Convenient re-exports for downstream crates.

pub use crate::config::{CacheCompression, CacheConfig, ReaderConfig};
pub use crate::error::{Error, Result};
pub use crate::query::{CacheKey, CmpOp, Filter, Literal, SelectQuery};
pub use crate::schema::{ColumnSpec, DataType, Field};
pub use crate::select::{
    CsvInput, CsvOutput, InputFormat, InputSerialization, JsonInput, JsonOutput,
    OutputSerialization, QuoteFields,
};
pub use crate::types::{Column, RowBatch, Scalar};
