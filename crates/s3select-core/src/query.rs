//! Builds the SQL expression for a projected, filtered select.
//!
//! `SELECT s.a,s.b FROM S3Object s WHERE s.a = 'x' AND s.n >= 10`

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::schema::ColumnSpec;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CmpOp {
    Eq,
    NotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,
    In,
    Like,
}

impl fmt::Display for CmpOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            CmpOp::Eq => "=",
            CmpOp::NotEq => "!=",
            CmpOp::Lt => "<",
            CmpOp::LtEq => "<=",
            CmpOp::Gt => ">",
            CmpOp::GtEq => ">=",
            CmpOp::In => "IN",
            CmpOp::Like => "LIKE",
        };
        f.write_str(s)
    }
}

/// Right-hand side of a filter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Literal {
    Str(String),
    Int(i64),
    Float(f64),
    Bool(bool),
    /// ISO-8601 date or timestamp text, quoted like a string.
    Date(String),
    List(Vec<Literal>),
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Literal::Str(s) | Literal::Date(s) => write!(f, "'{}'", s.replace('\'', "''")),
            Literal::Int(i) => write!(f, "{i}"),
            Literal::Float(x) => write!(f, "{x}"),
            Literal::Bool(b) => write!(f, "{b}"),
            Literal::List(items) => {
                f.write_str("(")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(",")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str(")")
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Filter {
    pub column: String,
    pub op: CmpOp,
    pub value: Literal,
}

impl Filter {
    pub fn new(column: impl Into<String>, op: CmpOp, value: Literal) -> Self {
        Self {
            column: column.into(),
            op,
            value,
        }
    }
}

/// Projection plus conjunctive filters over `S3Object s`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SelectQuery {
    pub columns: Vec<String>,
    pub filters: Vec<Filter>,
}

impl SelectQuery {
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            filters: Vec::new(),
        }
    }

    /// Project exactly the columns of `spec`, in spec order.
    pub fn for_spec(spec: &ColumnSpec) -> Self {
        Self::new(spec.names().map(str::to_string).collect())
    }

    pub fn filter(mut self, column: impl Into<String>, op: CmpOp, value: Literal) -> Self {
        self.filters.push(Filter::new(column, op, value));
        self
    }

    pub fn to_sql(&self) -> Result<String> {
        for name in self.columns.iter().chain(self.filters.iter().map(|f| &f.column)) {
            check_identifier(name)?;
        }

        let projection = if self.columns.is_empty() {
            "*".to_string()
        } else {
            self.columns
                .iter()
                .map(|c| format!("s.{c}"))
                .collect::<Vec<_>>()
                .join(",")
        };
        let mut sql = format!("SELECT {projection} FROM S3Object s");
        if !self.filters.is_empty() {
            let predicate = self
                .filters
                .iter()
                .map(|f| format!("s.{} {} {}", f.column, f.op, f.value))
                .collect::<Vec<_>>()
                .join(" AND ");
            sql.push_str(" WHERE ");
            sql.push_str(&predicate);
        }
        Ok(sql)
    }

    /// blake3 digest of the rendered query and the column spec it decodes
    /// with. Two queries share a key only if their cached tables would match.
    pub fn fingerprint(&self, spec: &ColumnSpec) -> Result<CacheKey> {
        let bytes = serde_json::to_vec(&(self.to_sql()?, spec))?;
        Ok(CacheKey(blake3::hash(&bytes).into()))
    }
}

/// Key for a cached result table, see [`SelectQuery::fingerprint`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CacheKey([u8; 32]);

impl CacheKey {
    pub fn to_hex(&self) -> String {
        self.0.iter().map(|b| format!("{b:02x}")).collect()
    }

    /// `<hex>.parquet`, the file name callers place under their cache dir.
    pub fn file_name(&self) -> String {
        format!("{}.parquet", self.to_hex())
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

fn check_identifier(name: &str) -> Result<()> {
    let mut chars = name.chars();
    let ok = match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        _ => false,
    };
    if ok {
        Ok(())
    } else {
        Err(Error::Query(format!("invalid column identifier '{name}'")))
    }
}
