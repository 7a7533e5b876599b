//! # Fuelmap - COW fueling plan sheet to dashboard JSON
//!
//! Fuelmap reads the fueling plan sheet of the Central region's cells on
//! wheels (live CSV export, or the last good snapshot when the sheet is down),
//! keeps the sites that are on air or being installed and have a usable
//! fueling date and coordinates, and writes them as the JSON array the map
//! dashboard loads.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │ Sheet / CSV │────▶│   Parser    │────▶│  Transform  │────▶│  data.json  │
//! │ (or cache)  │     │  (auto-enc) │     │ (4 filters) │     │  (records)  │
//! └─────────────┘     └─────────────┘     └─────────────┘     └─────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use fuelmap::{run, PipelineConfig};
//!
//! #[tokio::main]
//! async fn main() {
//!     let summary = run(&PipelineConfig::default()).await.unwrap();
//!     println!("Exported {} sites", summary.exported);
//! }
//! ```
//!
//! ## Modules
//!
//! - [`error`] - Hierarchical error types
//! - [`models`] - Cells, raw tables and clean records
//! - [`logs`] - Log broadcasting
//! - [`config`] - Pipeline configuration
//! - [`normalize`] - Date normalization
//! - [`resolve`] - Header to logical field resolution
//! - [`parser`] - CSV parsing with auto-detection
//! - [`cache`] - Snapshot of the last good sheet
//! - [`source`] - Live load with cache fallback
//! - [`transform`] - Filters, projection and pipeline
//! - [`export`] - Atomic JSON export
//! - [`validation`] - Clean record schema validation
//! - [`api`] - HTTP API server

// Core modules
pub mod error;
pub mod logs;
pub mod models;

// Configuration
pub mod config;

// Normalization
pub mod normalize;
pub mod resolve;

// Loading
pub mod cache;
pub mod parser;
pub mod source;

// Transformation
pub mod transform;

// Output
pub mod export;
pub mod validation;

// HTTP API
pub mod api;

// =============================================================================
// Re-exports - Error types
// =============================================================================

pub use error::{
    CsvError, ExportError, PipelineError, ProjectionError, ResolveError, ServerError,
    SourceError, ValidationError,
};

// =============================================================================
// Re-exports - Models
// =============================================================================

pub use models::{CellValue, CleanRecord, CowStatus, RawRow, RawTable};

// =============================================================================
// Re-exports - Configuration
// =============================================================================

pub use config::{PipelineConfig, SourceLocation};

// =============================================================================
// Re-exports - Normalization
// =============================================================================

pub use normalize::{analyze_date, normalize_date, DateMatch, DateRule};
pub use resolve::{resolve_columns, resolve_with_aliases, ColumnAliases, FieldMap, LogicalField};

// =============================================================================
// Re-exports - CSV Parsing and loading
// =============================================================================

pub use cache::{SnapshotCache, SnapshotMeta};
pub use parser::{
    decode_content, detect_delimiter, detect_encoding, parse_bytes_auto, parse_csv_file_auto,
    parse_csv_str, CsvInfo, ParseResult,
};
pub use source::{load_table, LoadedTable, TableOrigin};

// =============================================================================
// Re-exports - Pipeline
// =============================================================================

pub use transform::{
    clean_bytes, clean_table, clean_table_with, filter_rows, project_record, run, CleanOutput,
    FilterReport, FilterStage, RunSummary, StageCount,
};

// =============================================================================
// Re-exports - Output
// =============================================================================

pub use export::{export_records, records_to_json};
pub use validation::{is_valid_clean_record, validate_clean_record, validate_records};

// =============================================================================
// Re-exports - API
// =============================================================================

pub use api::types::{error_response, CleanResponse};

// Server
pub mod server {
    pub use crate::api::server::start_server;
}
