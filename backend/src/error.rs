//! Error types for the fuelmap pipeline.
//!
//! - [`CsvError`] - CSV decoding and parsing errors
//! - [`SourceError`] - live fetch and snapshot cache errors
//! - [`ResolveError`] - header to logical field resolution errors
//! - [`ProjectionError`] - a surviving row that cannot form a clean record
//! - [`ExportError`] - output file errors
//! - [`ValidationError`] - output schema violations
//! - [`PipelineError`] - top-level orchestration errors
//!
//! Conversion into [`PipelineError`] is automatic via `From`, so `?` works
//! across layer boundaries. Row-level data problems are not errors at all:
//! the filter stages drop such rows and count them.

use std::path::PathBuf;

use thiserror::Error;

use crate::resolve::LogicalField;

// =============================================================================
// CSV Parsing Errors
// =============================================================================

/// Errors during CSV parsing.
#[derive(Debug, Error)]
pub enum CsvError {
    /// Failed to read file.
    #[error("Failed to read file: {0}")]
    IoError(#[from] std::io::Error),

    /// Content could not be decoded with the detected encoding.
    #[error("Failed to decode content: {0}")]
    EncodingError(String),

    /// Invalid CSV format.
    #[error("Invalid CSV format at line {line}: {message}")]
    ParseError { line: usize, message: String },

    /// Empty file.
    #[error("CSV file is empty")]
    EmptyFile,

    /// No headers found.
    #[error("No headers found in CSV")]
    NoHeaders,
}

// =============================================================================
// Source Errors
// =============================================================================

/// Errors while obtaining the raw table.
#[derive(Debug, Error)]
pub enum SourceError {
    /// HTTP request failed or returned a non-success status.
    #[error("HTTP request failed: {0}")]
    HttpError(String),

    /// HTTP request timed out.
    #[error("Request timed out after {0} seconds")]
    Timeout(u64),

    /// Local source or cache could not be read.
    #[error("Source IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// The bytes were fetched but are not a usable table.
    #[error("Source is not a readable table: {0}")]
    Csv(#[from] CsvError),

    /// Live source failed and the cache could not stand in for it.
    #[error("Live source failed ({live}) and cache fallback failed ({cache})")]
    Unavailable { live: String, cache: String },
}

// =============================================================================
// Column Resolution Errors
// =============================================================================

/// Errors while mapping headers to logical fields.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
    /// One or more mandatory logical fields matched no header.
    #[error(
        "Missing expected columns: {}; available (normalized) headers: [{}]",
        list_fields(.missing),
        .available.join(", ")
    )]
    MissingFields {
        missing: Vec<LogicalField>,
        available: Vec<String>,
    },
}

fn list_fields(fields: &[LogicalField]) -> String {
    fields
        .iter()
        .map(|f| f.name())
        .collect::<Vec<_>>()
        .join(", ")
}

// =============================================================================
// Projection Errors
// =============================================================================

/// A row passed every filter but still breaks a clean record invariant.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Row {row}: invalid {} ({message})", .field.name())]
pub struct ProjectionError {
    pub row: usize,
    pub field: LogicalField,
    pub message: String,
}

// =============================================================================
// Export Errors
// =============================================================================

/// Errors while writing the output artifact.
#[derive(Debug, Error)]
pub enum ExportError {
    /// IO error while creating or renaming the output.
    #[error("Failed to write {path}: {source}")]
    IoError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

// =============================================================================
// Validation Errors
// =============================================================================

/// Output records that do not satisfy the clean record schema.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// Schema validation failed for the record at `index`.
    #[error("Record {index} failed validation: {}", .errors.join("; "))]
    SchemaError { index: usize, errors: Vec<String> },
}

// =============================================================================
// Pipeline Errors (top-level)
// =============================================================================

/// Top-level pipeline orchestration errors.
///
/// This is the error type returned by [`crate::transform::pipeline::run`] and
/// [`crate::transform::pipeline::clean_table`]. Any of these aborts the run
/// before output is written.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// CSV parsing error.
    #[error("CSV error: {0}")]
    Csv(#[from] CsvError),

    /// No table could be obtained.
    #[error("Source error: {0}")]
    Source(#[from] SourceError),

    /// Header schema drift.
    #[error("Schema mismatch: {0}")]
    Resolve(#[from] ResolveError),

    /// Output validation error.
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Output could not be written.
    #[error("Export error: {0}")]
    Export(#[from] ExportError),
}

// =============================================================================
// Server Errors
// =============================================================================

/// HTTP server errors.
#[derive(Debug, Error)]
pub enum ServerError {
    /// Pipeline error.
    #[error("Pipeline error: {0}")]
    Pipeline(#[from] PipelineError),

    /// Invalid request.
    #[error("Invalid request: {0}")]
    BadRequest(String),
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Result type for CSV operations.
pub type CsvResult<T> = Result<T, CsvError>;

/// Result type for source operations.
pub type SourceResult<T> = Result<T, SourceError>;

/// Result type for export operations.
pub type ExportResult<T> = Result<T, ExportError>;

/// Result type for pipeline operations.
pub type PipelineResult<T> = Result<T, PipelineError>;
