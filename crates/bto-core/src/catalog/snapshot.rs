//! JSON snapshot of the whole catalog, written after every command and
//! read back on the next start.

use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use crate::allocation::Catalog;

#[derive(Debug, thiserror::Error)]
pub enum SnapshotIoError {
    #[error("failed to access catalog snapshot: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid catalog snapshot: {0}")]
    Json(#[from] serde_json::Error),
}

/// Load a previously written snapshot. `Ok(None)` means no snapshot exists
/// yet and the caller should fall back to the CSV seeds.
pub fn read_catalog<P: AsRef<Path>>(path: P) -> Result<Option<Catalog>, SnapshotIoError> {
    let path = path.as_ref();
    if !path.exists() {
        return Ok(None);
    }
    let file = File::open(path)?;
    let catalog = serde_json::from_reader(BufReader::new(file))?;
    Ok(Some(catalog))
}

pub fn write_catalog<P: AsRef<Path>>(path: P, catalog: &Catalog) -> Result<(), SnapshotIoError> {
    let path = path.as_ref();
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    let file = File::create(path)?;
    serde_json::to_writer_pretty(BufWriter::new(file), catalog)?;
    Ok(())
}
