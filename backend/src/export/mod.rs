//! JSON export of clean records.
//!
//! The output is written to a temporary file next to the target and renamed
//! into place, so readers see either the previous file or the complete new
//! one.

use std::fs;
use std::io::Write;
use std::path::Path;

use crate::error::{ExportError, ExportResult};
use crate::models::CleanRecord;

/// Pretty JSON array (2-space indent) of `records`.
pub fn records_to_json(records: &[CleanRecord]) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(records)
}

/// Write `records` to `path` atomically. An empty slice writes `[]`.
pub fn export_records(records: &[CleanRecord], path: &Path) -> ExportResult<()> {
    let json = records_to_json(records)?;
    let io_err = |source: std::io::Error| ExportError::IoError {
        path: path.to_path_buf(),
        source,
    };

    let dir = match path.parent() {
        Some(d) if !d.as_os_str().is_empty() => d,
        _ => Path::new("."),
    };
    fs::create_dir_all(dir).map_err(io_err)?;

    let mut tmp = tempfile::NamedTempFile::new_in(dir).map_err(io_err)?;
    tmp.write_all(json.as_bytes()).map_err(io_err)?;
    tmp.write_all(b"\n").map_err(io_err)?;
    tmp.as_file().sync_all().map_err(io_err)?;
    tmp.persist(path).map_err(|e| io_err(e.error))?;

    Ok(())
}
