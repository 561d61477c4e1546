//! CSV chunks into typed tables.
//!
//! Two modes:
//! - strict: every cell is cast to its column's declared type; the first
//!   failure fails the chunk.
//! - lenient (default): cells are read as text and only numeric columns are
//!   coerced. A cell that is a number but not of the declared type (`1.5` in
//!   an Int64 column) is kept as an integer when whole and in range, else as
//!   `F64`. Only text that is not a number at all becomes `Scalar::Null`.
//!
//! Empty cells are missing values in both modes. Rows shorter than the
//! column spec are padded with `Null`; longer rows are a decode error.

#[cfg(feature = "parquet")]
use std::path::Path;

use s3select_core::config::{CacheConfig, ReaderConfig};
use s3select_core::schema::{ColumnSpec, DataType, Field};
use s3select_core::select::OutputSerialization;
use s3select_core::types::{Column, RowBatch, Scalar};

#[cfg(feature = "parquet")]
use super::CacheableReader;
use super::{csv_reader_builder, Reader, CSV_SERIALIZATION};
use crate::error::{DecodeError, Result};

#[derive(Debug, Clone, Default)]
pub struct TabularReader {
    strict: bool,
    cache: CacheConfig,
}

impl TabularReader {
    pub fn new(strict: bool) -> Self {
        Self {
            strict,
            cache: CacheConfig::default(),
        }
    }

    pub fn lenient() -> Self {
        Self::new(false)
    }

    pub fn strict() -> Self {
        Self::new(true)
    }

    pub fn from_config(cfg: &ReaderConfig) -> Result<Self> {
        cfg.validate()?;
        Ok(Self {
            strict: cfg.strict,
            cache: cfg.cache.clone(),
        })
    }

    pub fn is_strict(&self) -> bool {
        self.strict
    }

    pub fn cache_config(&self) -> &CacheConfig {
        &self.cache
    }

    fn decode_cell(
        &self,
        text: &str,
        field: &Field,
        row: usize,
        coerced: &mut usize,
    ) -> Result<Scalar> {
        if self.strict {
            return Scalar::parse_as(text, field.data_type).map_err(|message| {
                DecodeError::Cast {
                    row,
                    column: field.name.clone(),
                    message,
                }
                .into()
            });
        }
        if text.is_empty() {
            return Ok(Scalar::Null);
        }
        if field.data_type.is_numeric() {
            return Ok(Scalar::parse_as(text, field.data_type)
                .ok()
                .or_else(|| coerce_number(text, field.data_type))
                .unwrap_or_else(|| {
                    *coerced += 1;
                    Scalar::Null
                }));
        }
        Ok(Scalar::Str(text.to_string()))
    }
}

/// Fallback for numeric cells that miss the declared type's own parser.
fn coerce_number(text: &str, ty: DataType) -> Option<Scalar> {
    let x = text.trim().parse::<f64>().ok()?;
    if !x.is_finite() {
        return Some(Scalar::F64(x));
    }
    let whole = x.fract() == 0.0;
    let scalar = match ty {
        DataType::Int32 if whole && x >= i32::MIN as f64 && x <= i32::MAX as f64 => {
            Scalar::I32(x as i32)
        }
        // i64::MAX as f64 rounds up to 2^63, hence the strict bound.
        DataType::Int64 if whole && x >= i64::MIN as f64 && x < i64::MAX as f64 => {
            Scalar::I64(x as i64)
        }
        _ => Scalar::F64(x),
    };
    Some(scalar)
}

impl Reader for TabularReader {
    type Output = RowBatch;

    fn read(&self, chunk: &[u8], columns: &ColumnSpec) -> Result<RowBatch> {
        let mut values: Vec<Vec<Scalar>> = vec![Vec::new(); columns.len()];
        let mut rdr = csv_reader_builder().from_reader(chunk);
        let mut record = csv::StringRecord::new();
        let mut row = 0usize;
        let mut coerced = 0usize;

        while rdr.read_record(&mut record).map_err(DecodeError::Csv)? {
            if record.len() > columns.len() {
                return Err(DecodeError::RowWidth {
                    row,
                    expected: columns.len(),
                    found: record.len(),
                }
                .into());
            }
            for (idx, field) in columns.fields().iter().enumerate() {
                let text = record.get(idx).unwrap_or("");
                values[idx].push(self.decode_cell(text, field, row, &mut coerced)?);
            }
            row += 1;
        }

        tracing::debug!(
            rows = row,
            columns = columns.len(),
            coerced,
            strict = self.strict,
            "decoded tabular chunk"
        );

        Ok(RowBatch {
            columns: columns
                .fields()
                .iter()
                .zip(values)
                .map(|(f, v)| Column::new(f.name.clone(), v))
                .collect(),
        })
    }

    fn combine(&self, partials: Vec<RowBatch>) -> RowBatch {
        let parts = partials.len();
        let out = RowBatch::concat_rows(partials);
        tracing::debug!(parts, rows = out.num_rows(), "combined tabular chunks");
        out
    }

    fn serialization(&self) -> &OutputSerialization {
        &CSV_SERIALIZATION
    }

    #[cfg(feature = "parquet")]
    fn as_cacheable(&self) -> Option<&dyn CacheableReader<Output = RowBatch>> {
        Some(self)
    }
}

#[cfg(feature = "parquet")]
impl CacheableReader for TabularReader {
    fn read_cache(&self, path: &Path) -> Result<RowBatch> {
        crate::parquet::read_table(path)
    }

    fn write_cache(&self, path: &Path, contents: &RowBatch) -> Result<()> {
        crate::parquet::write_table(path, contents, &self.cache)
    }
}
