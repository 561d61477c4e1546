//! Column specifications supplied alongside every chunk.
//!
//! A `ColumnSpec` names the columns of a select result (in output order) and
//! the semantic type each one should decode to. Select responses carry no
//! header row, so this is the only source of column names.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DataType {
    Boolean,
    Int32,
    Int64,
    Float32,
    Float64,
    Utf8,
    /// Milliseconds since the Unix epoch.
    Date64,
}

impl DataType {
    pub fn is_numeric(&self) -> bool {
        matches!(
            self,
            DataType::Int32 | DataType::Int64 | DataType::Float32 | DataType::Float64
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Field {
    pub name: String,
    pub data_type: DataType,
    pub nullable: bool,
}

impl Field {
    pub fn new(name: impl Into<String>, data_type: DataType, nullable: bool) -> Self {
        Self {
            name: name.into(),
            data_type,
            nullable,
        }
    }
}

/// Ordered column name -> type mapping. Names are unique.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnSpec {
    fields: Vec<Field>,
}

impl ColumnSpec {
    /// Build a spec, rejecting empty or duplicate column names.
    pub fn try_new(fields: Vec<Field>) -> Result<Self> {
        let mut seen = HashSet::with_capacity(fields.len());
        for f in &fields {
            if f.name.is_empty() {
                return Err(Error::Schema("column name must not be empty".into()));
            }
            if !seen.insert(f.name.as_str()) {
                return Err(Error::Schema(format!("duplicate column '{}'", f.name)));
            }
        }
        Ok(Self { fields })
    }

    /// Shorthand for nullable columns given as `(name, type)` pairs.
    pub fn from_pairs<I, S>(pairs: I) -> Result<Self>
    where
        I: IntoIterator<Item = (S, DataType)>,
        S: Into<String>,
    {
        Self::try_new(
            pairs
                .into_iter()
                .map(|(name, ty)| Field::new(name, ty, true))
                .collect(),
        )
    }

    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn field(&self, idx: usize) -> Option<&Field> {
        self.fields.get(idx)
    }

    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|f| f.name == name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|f| f.name.as_str())
    }
}
