//! Reader configuration that callers embed in their own config files.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReaderConfig {
    /// Enforce column types exactly; a failed cast fails the whole chunk.
    /// When false, numeric cells that fail to parse become missing values.
    pub strict: bool,

    /// Settings for the tabular result cache.
    pub cache: CacheConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    pub compression: CacheCompression,

    /// Upper bound on rows per Parquet row group.
    pub max_row_group_size: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            compression: CacheCompression::Snappy,
            max_row_group_size: 1024 * 1024,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CacheCompression {
    None,
    #[default]
    Snappy,
    Zstd,
}

impl ReaderConfig {
    pub fn strict() -> Self {
        Self {
            strict: true,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.cache.max_row_group_size == 0 {
            return Err(Error::Config(
                "cache.max_row_group_size must be greater than zero".into(),
            ));
        }
        Ok(())
    }
}
