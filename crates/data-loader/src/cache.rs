//! Prepared-dataset cache.
//!
//! Merging the raw exports means parsing about a million ratings. The
//! `prepare` step does it once and writes the cleaned table as JSON; later
//! processes read the cache instead.

use crate::error::Result;
use crate::types::RatingsTable;
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;
use tracing::info;

/// Serialize a ratings table to `path`
pub fn write_cache(table: &RatingsTable, path: &Path) -> Result<()> {
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer(&mut writer, table)?;
    writer.flush()?;

    info!("Wrote {} ratings to cache {:?}", table.len(), path);
    Ok(())
}

/// Read a ratings table previously written by [`write_cache`]
///
/// The zero-rating invariant is re-applied and validated, so a hand-edited
/// cache cannot smuggle implicit ratings into the models.
pub fn read_cache(path: &Path) -> Result<RatingsTable> {
    let file = File::open(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => crate::DataLoadError::FileNotFound {
            path: path.display().to_string(),
        },
        _ => e.into(),
    })?;
    let raw: RatingsTable = serde_json::from_reader(BufReader::new(file))?;
    let table = RatingsTable::from_records(raw.records().iter().cloned());
    table.validate()?;

    info!("Read {} ratings from cache {:?}", table.len(), path);
    Ok(table)
}

/// Merge the raw exports in `data_dir` and write the result to `output`
pub fn prepare(data_dir: &Path, output: &Path) -> Result<RatingsTable> {
    let table = RatingsTable::load_from_files(data_dir)?;
    write_cache(&table, output)?;
    Ok(table)
}
