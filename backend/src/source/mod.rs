//! Table loading with snapshot fallback.
//!
//! ```text
//! live source ──ok──▶ parse ──▶ save snapshot ──▶ table
//!      │ fail
//!      ▼
//! snapshot cache ──ok──▶ parse ──▶ table
//!      │ fail
//!      ▼
//! SourceError::Unavailable
//! ```
//!
//! A live response that does not parse as CSV counts as a live failure, so
//! an HTML error page never replaces a good snapshot.

use std::time::Duration;

use serde::Serialize;

use crate::cache::SnapshotCache;
use crate::config::{PipelineConfig, SourceLocation};
use crate::error::{SourceError, SourceResult};
use crate::logs::{log_info, log_success, log_warning};
use crate::parser::{parse_bytes_auto, ParseResult};

/// Where the loaded table came from
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum TableOrigin {
    Live,
    #[serde(rename_all = "camelCase")]
    Cache { saved_at: Option<String> },
}

/// A parsed table and its origin
#[derive(Debug, Clone)]
pub struct LoadedTable {
    pub parsed: ParseResult,
    pub origin: TableOrigin,
}

/// Fetch the raw bytes of the live source.
pub async fn fetch_live(source: &SourceLocation, timeout: Duration) -> SourceResult<Vec<u8>> {
    match source {
        SourceLocation::Url(url) => {
            let client = reqwest::Client::builder()
                .timeout(timeout)
                .build()
                .map_err(|e| SourceError::HttpError(e.to_string()))?;

            let response = client
                .get(url)
                .send()
                .await
                .map_err(|e| http_error(e, timeout))?
                .error_for_status()
                .map_err(|e| http_error(e, timeout))?;

            let bytes = response.bytes().await.map_err(|e| http_error(e, timeout))?;
            Ok(bytes.to_vec())
        }
        SourceLocation::File(path) => Ok(tokio::fs::read(path).await?),
    }
}

fn http_error(e: reqwest::Error, timeout: Duration) -> SourceError {
    if e.is_timeout() {
        SourceError::Timeout(timeout.as_secs())
    } else {
        SourceError::HttpError(e.to_string())
    }
}

async fn load_live(config: &PipelineConfig) -> SourceResult<(Vec<u8>, ParseResult)> {
    let bytes = fetch_live(&config.source, config.fetch_timeout).await?;
    let parsed = parse_bytes_auto(&bytes)?;
    Ok((bytes, parsed))
}

/// Read and parse the snapshot; the error is a human-readable reason.
pub fn load_cached(cache: &SnapshotCache) -> Result<LoadedTable, String> {
    if !cache.exists() {
        return Err(format!("no cache found at {}", cache.path().display()));
    }

    let bytes = cache
        .load()
        .map_err(|e| format!("cannot read cache {}: {}", cache.path().display(), e))?;
    let parsed = parse_bytes_auto(&bytes)
        .map_err(|e| format!("cache {} is unreadable: {}", cache.path().display(), e))?;

    Ok(LoadedTable {
        parsed,
        origin: TableOrigin::Cache {
            saved_at: cache.meta().map(|m| m.saved_at),
        },
    })
}

/// Load the table from the live source, falling back to the snapshot.
///
/// A successful live load refreshes the snapshot; failing to write it only
/// logs a warning.
pub async fn load_table(config: &PipelineConfig) -> SourceResult<LoadedTable> {
    let cache = SnapshotCache::new(&config.cache_path);
    log_info(format!("Loading sheet: {}", config.source));

    match load_live(config).await {
        Ok((bytes, parsed)) => {
            log_success(format!("Loaded live sheet: {} rows", parsed.table.len()));
            match cache.save(&bytes, &config.source.to_string(), parsed.table.len()) {
                Ok(_) => log_info(format!("Snapshot refreshed: {}", cache.path().display())),
                Err(e) => log_warning(format!("Could not refresh snapshot: {}", e)),
            }
            Ok(LoadedTable {
                parsed,
                origin: TableOrigin::Live,
            })
        }
        Err(live_err) => {
            log_warning(format!("Live sheet failed ({}), trying cache...", live_err));
            let loaded = load_cached(&cache).map_err(|cache_err| SourceError::Unavailable {
                live: live_err.to_string(),
                cache: cache_err,
            })?;
            log_success(format!("Loaded cache: {} rows", loaded.parsed.table.len()));
            Ok(loaded)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    const SHEET: &str = "SiteName,RegionName,COWStatus,NextFuelingPlan,lat,lng\n\
                         S1,Central,ON-AIR,12-15-2025,24.7,46.6\n";

    #[tokio::test]
    async fn test_live_file_refreshes_snapshot() {
        let dir = tempdir().unwrap();
        let source = dir.path().join("sheet.csv");
        fs::write(&source, SHEET).unwrap();

        let config = PipelineConfig::default()
            .with_source(SourceLocation::File(source))
            .with_cache_path(dir.path().join("cache.csv"));

        let loaded = load_table(&config).await.unwrap();
        assert_eq!(loaded.origin, TableOrigin::Live);
        assert_eq!(loaded.parsed.table.len(), 1);

        let cache = SnapshotCache::new(dir.path().join("cache.csv"));
        assert_eq!(cache.load().unwrap(), SHEET.as_bytes());
        assert_eq!(cache.meta().unwrap().row_count, 1);
    }

    #[tokio::test]
    async fn test_falls_back_to_cache() {
        let dir = tempdir().unwrap();
        let cache = SnapshotCache::new(dir.path().join("cache.csv"));
        cache.save(SHEET.as_bytes(), "earlier", 1).unwrap();

        let config = PipelineConfig::default()
            .with_source(SourceLocation::File(dir.path().join("missing.csv")))
            .with_cache_path(cache.path());

        let loaded = load_table(&config).await.unwrap();
        assert!(matches!(loaded.origin, TableOrigin::Cache { saved_at: Some(_) }));
        assert_eq!(loaded.parsed.table.len(), 1);
    }

    #[tokio::test]
    async fn test_unparseable_live_source_uses_cache() {
        let dir = tempdir().unwrap();
        let source = dir.path().join("empty.csv");
        fs::write(&source, "").unwrap();
        let cache = SnapshotCache::new(dir.path().join("cache.csv"));
        cache.save(SHEET.as_bytes(), "earlier", 1).unwrap();

        let config = PipelineConfig::default()
            .with_source(SourceLocation::File(source))
            .with_cache_path(cache.path());

        let loaded = load_table(&config).await.unwrap();
        assert!(matches!(loaded.origin, TableOrigin::Cache { .. }));
        // the good snapshot was not overwritten
        assert_eq!(cache.load().unwrap(), SHEET.as_bytes());
    }

    #[tokio::test]
    async fn test_unavailable_without_cache() {
        let dir = tempdir().unwrap();
        let config = PipelineConfig::default()
            .with_source(SourceLocation::File(dir.path().join("missing.csv")))
            .with_cache_path(dir.path().join("cache.csv"));

        let err = load_table(&config).await.unwrap_err();
        match err {
            SourceError::Unavailable { live, cache } => {
                assert!(!live.is_empty());
                assert!(cache.contains("no cache found"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
