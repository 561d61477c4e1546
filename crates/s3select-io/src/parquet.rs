//! Parquet cache for combined tabular results (enabled with `--features parquet`).
//!
//! Each `RowBatch` column becomes one nullable Arrow column whose type comes
//! from its first non-null value; columns with no values at all are stored
//! as Utf8. A column mixing numeric types (lenient decoding can put `F64`
//! cells in an integer column) is widened to Float64. `Date64` cells are
//! stored as millisecond timestamps so the time of day survives the Parquet
//! date encoding.
//!
//! A table without columns cannot be represented and is refused.

use std::fs::File;
use std::path::Path;
use std::sync::Arc;

use arrow_array::cast::AsArray;
use arrow_array::types::{
    Date32Type, Date64Type, Float32Type, Float64Type, Int32Type, Int64Type,
    TimestampMillisecondType,
};
use arrow_array::{
    Array, ArrayRef, ArrowPrimitiveType, BooleanArray, Float32Array, Float64Array, Int32Array,
    Int64Array, RecordBatch, RecordBatchOptions, StringArray, TimestampMillisecondArray,
};
use arrow_schema::{DataType as ArrowType, Field as ArrowField, Schema as ArrowSchema, TimeUnit};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use parquet::arrow::ArrowWriter;
use parquet::basic::{Compression, ZstdLevel};
use parquet::file::properties::WriterProperties;

use s3select_core::config::{CacheCompression, CacheConfig};
use s3select_core::schema::DataType;
use s3select_core::types::{Column, RowBatch, Scalar};

use crate::error::{Error, Result};

const MS_PER_DAY: i64 = 86_400_000;

/// Write `table` to `path`, replacing any existing file.
pub fn write_table(path: &Path, table: &RowBatch, cfg: &CacheConfig) -> Result<()> {
    if table.num_columns() == 0 {
        return Err(Error::Cache(format!(
            "refusing to cache a table with no columns at {}",
            path.display()
        )));
    }
    let batch = to_record_batch(table)?;
    let props = WriterProperties::builder()
        .set_compression(compression(cfg.compression))
        .set_max_row_group_size(cfg.max_row_group_size)
        .build();

    let file = File::create(path)?;
    let mut writer = ArrowWriter::try_new(file, batch.schema(), Some(props))?;
    writer.write(&batch)?;
    writer.close()?;

    tracing::debug!(
        path = %path.display(),
        rows = table.num_rows(),
        columns = table.num_columns(),
        "wrote tabular cache"
    );
    Ok(())
}

/// Read a table previously written by [`write_table`].
pub fn read_table(path: &Path) -> Result<RowBatch> {
    let file = File::open(path)?;
    let builder = ParquetRecordBatchReaderBuilder::try_new(file)?;
    let schema = builder.schema().clone();
    let reader = builder.build()?;

    let mut parts = Vec::new();
    for batch in reader {
        parts.push(from_record_batch(&batch?)?);
    }

    let table = if parts.is_empty() {
        RowBatch {
            columns: schema
                .fields()
                .iter()
                .map(|f| Column::new(f.name().clone(), Vec::new()))
                .collect(),
        }
    } else {
        RowBatch::concat_rows(parts)
    };

    tracing::debug!(
        path = %path.display(),
        rows = table.num_rows(),
        columns = table.num_columns(),
        "read tabular cache"
    );
    Ok(table)
}

fn compression(c: CacheCompression) -> Compression {
    match c {
        CacheCompression::None => Compression::UNCOMPRESSED,
        CacheCompression::Snappy => Compression::SNAPPY,
        CacheCompression::Zstd => Compression::ZSTD(ZstdLevel::default()),
    }
}

/// Convert a `RowBatch` into a single Arrow `RecordBatch`.
pub fn to_record_batch(table: &RowBatch) -> Result<RecordBatch> {
    let mut fields = Vec::with_capacity(table.num_columns());
    let mut arrays = Vec::with_capacity(table.num_columns());
    for col in &table.columns {
        let array = column_to_array(col)?;
        fields.push(ArrowField::new(&col.name, array.data_type().clone(), true));
        arrays.push(array);
    }
    let schema = Arc::new(ArrowSchema::new(fields));
    let options = RecordBatchOptions::new().with_row_count(Some(table.num_rows()));
    Ok(RecordBatch::try_new_with_options(schema, arrays, &options)?)
}

fn column_type(col: &Column) -> Result<DataType> {
    let mut found: Option<DataType> = None;
    for v in &col.values {
        let Some(ty) = v.data_type() else { continue };
        match found {
            None => found = Some(ty),
            Some(prev) if prev != ty && prev.is_numeric() && ty.is_numeric() => {
                found = Some(DataType::Float64)
            }
            Some(prev) if prev != ty => {
                return Err(Error::Cache(format!(
                    "column '{}' mixes {:?} and {:?} values",
                    col.name, prev, ty
                )))
            }
            Some(_) => {}
        }
    }
    Ok(found.unwrap_or(DataType::Utf8))
}

fn column_to_array(col: &Column) -> Result<ArrayRef> {
    let values = &col.values;
    let array: ArrayRef = match column_type(col)? {
        DataType::Boolean => Arc::new(BooleanArray::from(collect(values, |v| match v {
            Scalar::Bool(b) => Some(*b),
            _ => None,
        }))),
        DataType::Int32 => Arc::new(Int32Array::from(collect(values, |v| match v {
            Scalar::I32(i) => Some(*i),
            _ => None,
        }))),
        DataType::Int64 => Arc::new(Int64Array::from(collect(values, |v| match v {
            Scalar::I64(i) => Some(*i),
            _ => None,
        }))),
        DataType::Float32 => Arc::new(Float32Array::from(collect(values, |v| match v {
            Scalar::F32(x) => Some(*x),
            _ => None,
        }))),
        DataType::Float64 => Arc::new(Float64Array::from(collect(values, |v| match v {
            Scalar::F64(x) => Some(*x),
            Scalar::F32(x) => Some(f64::from(*x)),
            Scalar::I32(i) => Some(f64::from(*i)),
            Scalar::I64(i) => Some(*i as f64),
            _ => None,
        }))),
        DataType::Utf8 => Arc::new(StringArray::from(collect(values, |v| match v {
            Scalar::Str(s) => Some(s.clone()),
            _ => None,
        }))),
        DataType::Date64 => Arc::new(TimestampMillisecondArray::from(collect(values, |v| {
            match v {
                Scalar::Date64(ms) => Some(*ms),
                _ => None,
            }
        }))),
    };
    Ok(array)
}

fn collect<T>(values: &[Scalar], f: impl Fn(&Scalar) -> Option<T>) -> Vec<Option<T>> {
    values.iter().map(f).collect()
}

/// Convert an Arrow `RecordBatch` back into a `RowBatch`.
pub fn from_record_batch(batch: &RecordBatch) -> Result<RowBatch> {
    let schema = batch.schema();
    let columns = schema
        .fields()
        .iter()
        .zip(batch.columns())
        .map(|(field, array)| -> Result<Column> {
            Ok(Column::new(field.name().clone(), array_to_values(array)?))
        })
        .collect::<Result<Vec<_>>>()?;
    Ok(RowBatch { columns })
}

fn array_to_values(array: &ArrayRef) -> Result<Vec<Scalar>> {
    let values = match array.data_type() {
        ArrowType::Boolean => array
            .as_boolean()
            .iter()
            .map(|v| v.map(Scalar::Bool).unwrap_or(Scalar::Null))
            .collect(),
        ArrowType::Int32 => primitive::<Int32Type>(array, Scalar::I32),
        ArrowType::Int64 => primitive::<Int64Type>(array, Scalar::I64),
        ArrowType::Float32 => primitive::<Float32Type>(array, Scalar::F32),
        ArrowType::Float64 => primitive::<Float64Type>(array, Scalar::F64),
        ArrowType::Utf8 => array
            .as_string::<i32>()
            .iter()
            .map(|v| v.map(|s| Scalar::Str(s.to_string())).unwrap_or(Scalar::Null))
            .collect(),
        ArrowType::Timestamp(TimeUnit::Millisecond, _) => {
            primitive::<TimestampMillisecondType>(array, Scalar::Date64)
        }
        ArrowType::Date64 => primitive::<Date64Type>(array, Scalar::Date64),
        ArrowType::Date32 => {
            primitive::<Date32Type>(array, |days| Scalar::Date64(days as i64 * MS_PER_DAY))
        }
        other => {
            return Err(Error::Cache(format!(
                "unsupported cached column type {other}"
            )))
        }
    };
    Ok(values)
}

fn primitive<T: ArrowPrimitiveType>(
    array: &ArrayRef,
    f: impl Fn(T::Native) -> Scalar,
) -> Vec<Scalar> {
    array
        .as_primitive::<T>()
        .iter()
        .map(|v| v.map(&f).unwrap_or(Scalar::Null))
        .collect()
}
