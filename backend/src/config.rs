//! Pipeline configuration.
//!
//! Everything the pipeline needs from the outside world is carried by a
//! [`PipelineConfig`] passed into [`crate::transform::pipeline::run`]. The CLI
//! fills it from flags, then from the environment (a `.env` file is loaded
//! first), then from the defaults below.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::resolve::ColumnAliases;

/// Published CSV export of the "Energy Dashboard" sheet.
pub const DEFAULT_SHEET_URL: &str = "https://docs.google.com/spreadsheets/d/e/\
2PACX-1vS0GkXnQMdKYZITuuMsAzeWDtGUqEJ3lWwqNdA67NewOsDOgqsZHKHECEEkea4nrukx4-DqxKmf62nC\
/pub?gid=1149576218&single=true&output=csv";

pub const DEFAULT_CACHE_PATH: &str = "sheet_cache.csv";

pub const DEFAULT_OUTPUT_PATH: &str = "data.json";

pub const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 30;

pub const ENV_SOURCE: &str = "FUELMAP_SOURCE";
pub const ENV_CACHE_PATH: &str = "FUELMAP_CACHE_PATH";
pub const ENV_OUTPUT: &str = "FUELMAP_OUTPUT";
pub const ENV_TIMEOUT_SECS: &str = "FUELMAP_TIMEOUT_SECS";

/// Where the live table comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceLocation {
    /// `http://` or `https://` URL of a CSV export.
    Url(String),
    /// Local CSV file.
    File(PathBuf),
}

impl SourceLocation {
    pub fn parse(location: &str) -> Self {
        let location = location.trim();
        let lower = location.to_lowercase();
        if lower.starts_with("http://") || lower.starts_with("https://") {
            SourceLocation::Url(location.to_string())
        } else {
            SourceLocation::File(PathBuf::from(location))
        }
    }
}

impl FromStr for SourceLocation {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::parse(s))
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceLocation::Url(url) => f.write_str(url),
            SourceLocation::File(path) => write!(f, "{}", path.display()),
        }
    }
}

/// Options for one pipeline run
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub source: SourceLocation,
    /// Snapshot of the last good live table, read when the source fails
    pub cache_path: PathBuf,
    /// Where the JSON array is written
    pub output_path: PathBuf,
    pub fetch_timeout: Duration,
    pub aliases: ColumnAliases,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            source: SourceLocation::Url(DEFAULT_SHEET_URL.to_string()),
            cache_path: PathBuf::from(DEFAULT_CACHE_PATH),
            output_path: PathBuf::from(DEFAULT_OUTPUT_PATH),
            fetch_timeout: Duration::from_secs(DEFAULT_FETCH_TIMEOUT_SECS),
            aliases: ColumnAliases::default(),
        }
    }
}

impl PipelineConfig {
    /// Defaults overridden by `FUELMAP_*` environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Defaults overridden by whatever `lookup` returns for each variable.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let mut config = Self::default();

        if let Some(source) = get(ENV_SOURCE) {
            config.source = SourceLocation::parse(&source);
        }
        if let Some(cache) = get(ENV_CACHE_PATH) {
            config.cache_path = PathBuf::from(cache);
        }
        if let Some(output) = get(ENV_OUTPUT) {
            config.output_path = PathBuf::from(output);
        }
        if let Some(secs) = get(ENV_TIMEOUT_SECS).and_then(|v| v.trim().parse::<u64>().ok()) {
            config.fetch_timeout = Duration::from_secs(secs);
        }

        config
    }

    pub fn with_source(mut self, source: SourceLocation) -> Self {
        self.source = source;
        self
    }

    pub fn with_cache_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.cache_path = path.into();
        self
    }

    pub fn with_output_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.output_path = path.into();
        self
    }

    pub fn with_fetch_timeout(mut self, timeout: Duration) -> Self {
        self.fetch_timeout = timeout;
        self
    }
}
