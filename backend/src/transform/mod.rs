//! Transformation module.
//!
//! - Filter: the four row stages and their counts
//! - Project: surviving rows to clean records
//! - Pipeline: load, clean, validate and export

pub mod filter;
pub mod pipeline;
pub mod project;

pub use filter::{filter_rows, FilterReport, FilterStage, FilteredRow, StageCount};
pub use pipeline::{clean_bytes, clean_table, clean_table_with, run, CleanOutput, RunSummary};
pub use project::project_record;
