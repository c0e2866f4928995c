//! Store configuration
//!
//! Read from the repository's `config` file. The placeholder file written by
//! [`RepoLayout::create`](crate::RepoLayout::create) is empty, which means
//! defaults; anything else is parsed as JSON.

use crate::store::codec::DEFAULT_HEADER_LIMIT;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Tunables for an [`ObjectStore`](crate::ObjectStore)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// zstd compression level
    pub compression_level: i32,
    /// Max decompressed bytes buffered while looking for a header terminator
    pub header_limit: usize,
    /// Streamed writes stay in memory up to this many bytes, then spill to disk
    pub spool_threshold: usize,
    /// Re-hash fully read objects and compare against the requested id
    pub verify_on_read: bool,
    /// fsync each object before it is renamed into place
    pub fsync: bool,
}

impl Default for StoreConfig {
    fn default() -> Self {
        StoreConfig {
            compression_level: 3,
            header_limit: DEFAULT_HEADER_LIMIT,
            spool_threshold: 8 * 1024 * 1024,
            verify_on_read: true,
            fsync: false,
        }
    }
}

impl StoreConfig {
    /// Load config from a file; an empty file yields defaults
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(Error::storage(path))?;

        if content.trim().is_empty() {
            return Ok(Self::default());
        }

        let config: StoreConfig = serde_json::from_str(&content).map_err(|e| {
            Error::Config(format!("Failed to parse {}: {}", path.display(), e))
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Write config as pretty JSON
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let content = serde_json::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("Failed to serialize config: {}", e)))?;
        std::fs::write(path, content).map_err(Error::storage(path))
    }

    fn validate(&self) -> Result<()> {
        let levels = zstd::compression_level_range();
        if !levels.contains(&self.compression_level) {
            return Err(Error::Config(format!(
                "compression_level {} outside {}..={}",
                self.compression_level,
                levels.start(),
                levels.end()
            )));
        }
        // "blob 0\0" is the shortest legal header
        if self.header_limit < 8 {
            return Err(Error::Config(format!(
                "header_limit {} is too small",
                self.header_limit
            )));
        }
        Ok(())
    }
}
