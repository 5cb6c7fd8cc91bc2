//! Where a ratings table comes from.
//!
//! Model construction only needs "a cleaned ratings table". Whether that
//! table is merged from the raw exports, read from the prepared cache, or
//! built in memory is decided by the [`RatingsSource`] handed to the model
//! cache.

use crate::cache;
use crate::error::Result;
use crate::types::RatingsTable;
use std::path::PathBuf;

/// Provides the cleaned ratings table.
///
/// `Send + Sync` so one source can back a model cache shared across
/// threads. `load` may be called again when an operator reloads the model.
pub trait RatingsSource: Send + Sync {
    /// Short description for logs
    fn name(&self) -> String;

    /// Produce the table. Any error here makes the model unavailable.
    fn load(&self) -> Result<RatingsTable>;
}

/// Merges `Books.csv`, `Users.csv` and `Book-Ratings.csv` from a directory
#[derive(Debug, Clone)]
pub struct RawExportSource {
    data_dir: PathBuf,
}

impl RawExportSource {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }
}

impl RatingsSource for RawExportSource {
    fn name(&self) -> String {
        format!("raw exports in {}", self.data_dir.display())
    }

    fn load(&self) -> Result<RatingsTable> {
        RatingsTable::load_from_files(&self.data_dir)
    }
}

/// Reads the JSON cache written by the prepare step
#[derive(Debug, Clone)]
pub struct CacheSource {
    path: PathBuf,
}

impl CacheSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl RatingsSource for CacheSource {
    fn name(&self) -> String {
        format!("cache {}", self.path.display())
    }

    fn load(&self) -> Result<RatingsTable> {
        cache::read_cache(&self.path)
    }
}

/// An already-built table is its own source
impl RatingsSource for RatingsTable {
    fn name(&self) -> String {
        format!("in-memory table ({} ratings)", self.len())
    }

    fn load(&self) -> Result<RatingsTable> {
        Ok(self.clone())
    }
}
