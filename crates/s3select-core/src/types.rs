//! Lightweight value/column containers for decoded tabular results.
//!
//! The tabular reader produces these directly; the Parquet cache in
//! `s3select-io` converts them to and from Arrow arrays.

use serde::{Deserialize, Serialize};
use time::format_description::well_known::Rfc3339;
use time::{Date, OffsetDateTime};

use crate::error::{Error, Result};
use crate::schema::DataType;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Scalar {
    /// Missing value marker (empty field, or a lenient coercion that failed).
    Null,
    Bool(bool),
    I32(i32),
    I64(i64),
    F32(f32),
    F64(f64),
    Str(String),
    Date64(i64),
}

impl Scalar {
    /// `None` for `Null`, which carries no type of its own.
    pub fn data_type(&self) -> Option<DataType> {
        match self {
            Scalar::Null => None,
            Scalar::Bool(_) => Some(DataType::Boolean),
            Scalar::I32(_) => Some(DataType::Int32),
            Scalar::I64(_) => Some(DataType::Int64),
            Scalar::F32(_) => Some(DataType::Float32),
            Scalar::F64(_) => Some(DataType::Float64),
            Scalar::Str(_) => Some(DataType::Utf8),
            Scalar::Date64(_) => Some(DataType::Date64),
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Scalar::Null)
    }

    /// Parse a text cell as `ty`. Empty text is always `Null`.
    ///
    /// The error carries a short reason; callers attach row/column context.
    pub fn parse_as(text: &str, ty: DataType) -> std::result::Result<Scalar, String> {
        if text.is_empty() {
            return Ok(Scalar::Null);
        }
        let num = text.trim();
        match ty {
            DataType::Utf8 => Ok(Scalar::Str(text.to_string())),
            DataType::Int32 => num
                .parse::<i32>()
                .map(Scalar::I32)
                .map_err(|e| format!("invalid Int32 '{text}': {e}")),
            DataType::Int64 => num
                .parse::<i64>()
                .map(Scalar::I64)
                .map_err(|e| format!("invalid Int64 '{text}': {e}")),
            DataType::Float32 => num
                .parse::<f32>()
                .map(Scalar::F32)
                .map_err(|e| format!("invalid Float32 '{text}': {e}")),
            DataType::Float64 => num
                .parse::<f64>()
                .map(Scalar::F64)
                .map_err(|e| format!("invalid Float64 '{text}': {e}")),
            DataType::Boolean => {
                if num.eq_ignore_ascii_case("true") {
                    Ok(Scalar::Bool(true))
                } else if num.eq_ignore_ascii_case("false") {
                    Ok(Scalar::Bool(false))
                } else {
                    Err(format!("invalid Boolean '{text}'"))
                }
            }
            DataType::Date64 => parse_date64(num)
                .map(Scalar::Date64)
                .ok_or_else(|| format!("invalid Date64 '{text}'")),
        }
    }
}

/// Accepts `YYYY-MM-DD` (midnight UTC) or an RFC 3339 timestamp.
fn parse_date64(s: &str) -> Option<i64> {
    if let Ok(ts) = OffsetDateTime::parse(s, &Rfc3339) {
        return i64::try_from(ts.unix_timestamp_nanos() / 1_000_000).ok();
    }
    let fmt = time::format_description::parse("[year]-[month]-[day]").ok()?;
    let date = Date::parse(s, &fmt).ok()?;
    Some(date.midnight().assume_utc().unix_timestamp() * 1_000)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Column {
    pub name: String,
    pub values: Vec<Scalar>,
}

impl Column {
    pub fn new(name: impl Into<String>, values: Vec<Scalar>) -> Self {
        Self {
            name: name.into(),
            values,
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// A decoded table: named columns of equal length.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RowBatch {
    pub columns: Vec<Column>,
}

impl RowBatch {
    /// A table with no columns and no rows.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build a batch, checking that every column has the same length and
    /// that names are unique.
    pub fn try_new(columns: Vec<Column>) -> Result<Self> {
        if let Some(first) = columns.first() {
            for c in &columns[1..] {
                if c.len() != first.len() {
                    return Err(Error::Invariant(format!(
                        "column '{}' has {} rows, expected {}",
                        c.name,
                        c.len(),
                        first.len()
                    )));
                }
            }
        }
        for (i, c) in columns.iter().enumerate() {
            if columns[..i].iter().any(|p| p.name == c.name) {
                return Err(Error::Invariant(format!("duplicate column '{}'", c.name)));
            }
        }
        Ok(Self { columns })
    }

    pub fn num_rows(&self) -> usize {
        self.columns.first().map(|c| c.len()).unwrap_or(0)
    }

    pub fn num_columns(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.num_rows() == 0
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|c| c.name.as_str())
    }

    /// Values of row `idx`, in column order.
    pub fn row(&self, idx: usize) -> Option<Vec<&Scalar>> {
        if idx >= self.num_rows() {
            return None;
        }
        Some(self.columns.iter().map(|c| &c.values[idx]).collect())
    }

    /// Stack batches vertically, in order.
    ///
    /// The output column set is the union of the inputs' columns in
    /// first-seen order; a batch lacking a column contributes `Null` cells.
    pub fn concat_rows<I>(batches: I) -> RowBatch
    where
        I: IntoIterator<Item = RowBatch>,
    {
        let mut out: Vec<Column> = Vec::new();
        let mut total_rows = 0usize;

        for batch in batches {
            let rows = batch.num_rows();
            for col in batch.columns {
                match out.iter_mut().find(|c| c.name == col.name) {
                    Some(existing) => existing.values.extend(col.values),
                    None => {
                        let mut values = Vec::with_capacity(total_rows + rows);
                        values.resize(total_rows, Scalar::Null);
                        values.extend(col.values);
                        out.push(Column {
                            name: col.name,
                            values,
                        });
                    }
                }
            }
            total_rows += rows;
            // Columns this batch did not have.
            for c in &mut out {
                c.values.resize(total_rows, Scalar::Null);
            }
        }

        RowBatch { columns: out }
    }
}
