//! Snapshot cache - the last good live table, kept for when the sheet is down.
//!
//! The snapshot is the raw CSV exactly as fetched, so it parses the same way
//! the live source does. A sidecar `<snapshot>.meta.json` records when and
//! from where it was saved.
//!
//! Both files are written to a temporary file in the same directory and
//! renamed into place, so an interrupted save leaves the previous snapshot
//! intact.

use serde::{Deserialize, Serialize};
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// Sidecar metadata of a saved snapshot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotMeta {
    /// RFC 3339 save time
    pub saved_at: String,
    /// Source location the bytes came from
    pub source: String,
    /// Data rows in the snapshot
    pub row_count: usize,
    pub bytes: usize,
}

/// A single-file snapshot cache
#[derive(Debug, Clone)]
pub struct SnapshotCache {
    path: PathBuf,
}

impl SnapshotCache {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Path of the metadata sidecar
    pub fn meta_path(&self) -> PathBuf {
        let mut name = self.path.as_os_str().to_owned();
        name.push(".meta.json");
        PathBuf::from(name)
    }

    pub fn exists(&self) -> bool {
        self.path.is_file()
    }

    /// Replace the snapshot with `bytes` and refresh the sidecar
    pub fn save(&self, bytes: &[u8], source: &str, row_count: usize) -> io::Result<SnapshotMeta> {
        write_atomic(&self.path, bytes)?;

        let meta = SnapshotMeta {
            saved_at: chrono::Utc::now().to_rfc3339(),
            source: source.to_string(),
            row_count,
            bytes: bytes.len(),
        };
        let content = serde_json::to_string_pretty(&meta)?;
        write_atomic(&self.meta_path(), content.as_bytes())?;

        Ok(meta)
    }

    /// Raw bytes of the snapshot
    pub fn load(&self) -> io::Result<Vec<u8>> {
        fs::read(&self.path)
    }

    /// Sidecar metadata, if present and readable
    pub fn meta(&self) -> Option<SnapshotMeta> {
        let content = fs::read_to_string(self.meta_path()).ok()?;
        serde_json::from_str(&content).ok()
    }
}

/// Replace `path` with `bytes` via a temp file and rename.
fn write_atomic(path: &Path, bytes: &[u8]) -> io::Result<()> {
    let dir = match path.parent() {
        Some(d) if !d.as_os_str().is_empty() => d,
        _ => Path::new("."),
    };
    fs::create_dir_all(dir)?;

    let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
    tmp.write_all(bytes)?;
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_save_and_load_roundtrip() {
        let dir = tempdir().unwrap();
        let cache = SnapshotCache::new(dir.path().join("sheet_cache.csv"));
        assert!(!cache.exists());
        assert!(cache.meta().is_none());

        let meta = cache.save(b"SiteName,lat\nS1,1\n", "https://example.com/x.csv", 1).unwrap();
        assert!(cache.exists());
        assert_eq!(cache.load().unwrap(), b"SiteName,lat\nS1,1\n");
        assert_eq!(cache.meta(), Some(meta.clone()));
        assert_eq!(meta.row_count, 1);
        assert_eq!(meta.source, "https://example.com/x.csv");
    }

    #[test]
    fn test_meta_path_is_sidecar() {
        let cache = SnapshotCache::new("out/sheet_cache.csv");
        assert_eq!(cache.meta_path(), PathBuf::from("out/sheet_cache.csv.meta.json"));
    }

    #[test]
    fn test_resave_replaces_snapshot_without_leftovers() {
        let dir = tempdir().unwrap();
        let cache = SnapshotCache::new(dir.path().join("sheet_cache.csv"));
        cache.save(b"SiteName\nold-and-longer\n", "first", 1).unwrap();
        cache.save(b"SiteName\nnew\n", "second", 1).unwrap();

        assert_eq!(cache.load().unwrap(), b"SiteName\nnew\n");
        assert_eq!(cache.meta().unwrap().source, "second");

        let mut names: Vec<String> = fs::read_dir(dir.path())
            .unwrap()
            .flatten()
            .map(|e| e.file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        assert_eq!(names, vec!["sheet_cache.csv", "sheet_cache.csv.meta.json"]);
    }

    #[test]
    fn test_save_creates_parent_directories() {
        let dir = tempdir().unwrap();
        let cache = SnapshotCache::new(dir.path().join("nested/deeper/cache.csv"));
        cache.save(b"a\n1\n", "local.csv", 1).unwrap();
        assert!(cache.exists());
    }
}
