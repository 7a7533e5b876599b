//! High-level pipeline API: sheet to dashboard JSON.
//!
//! ```text
//! load (live → cache) → parse → resolve columns → filter → project → validate → export
//! ```
//!
//! [`clean_table`] is the synchronous core and touches neither the network
//! nor the filesystem. [`run`] wraps it with loading and export. Every fatal
//! error aborts before the output file is touched.
//!
//! # Example
//!
//! ```rust,ignore
//! use fuelmap::config::PipelineConfig;
//! use fuelmap::transform::pipeline::run;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let summary = run(&PipelineConfig::from_env()).await?;
//!     println!("Exported {} sites", summary.exported);
//!     Ok(())
//! }
//! ```

use std::path::PathBuf;

use serde::Serialize;

use crate::config::PipelineConfig;
use crate::error::PipelineResult;
use crate::export::export_records;
use crate::logs::{log_info, log_info_indent, log_success, log_warning};
use crate::models::{CleanRecord, RawTable};
use crate::parser::{parse_bytes_auto, CsvInfo, ParseResult};
use crate::resolve::{resolve_with_aliases, ColumnAliases, FieldMap};
use crate::source::{load_table, TableOrigin};
use crate::validation::validate_records;

use super::filter::{filter_rows, FilterReport};
use super::project::project_record;

/// Records and diagnostics of one cleaning pass
#[derive(Debug, Clone)]
pub struct CleanOutput {
    pub records: Vec<CleanRecord>,
    pub report: FilterReport,
    /// Resolved columns; `None` when the table had no headers at all
    pub fields: Option<FieldMap>,
}

/// What a full [`run`] did
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunSummary {
    pub origin: TableOrigin,
    pub csv_info: CsvInfo,
    pub report: FilterReport,
    /// Records written to `output_path`
    pub exported: usize,
    pub output_path: PathBuf,
}

/// Clean a table with the default column aliases.
pub fn clean_table(table: &RawTable) -> PipelineResult<CleanOutput> {
    clean_table_with(table, &ColumnAliases::default())
}

/// Resolve columns, filter rows and project the survivors.
///
/// A table with no headers and no rows yields no records. Any other table
/// must carry all six logical columns.
pub fn clean_table_with(table: &RawTable, aliases: &ColumnAliases) -> PipelineResult<CleanOutput> {
    if table.headers().is_empty() && table.is_empty() {
        log_warning("Table is empty, nothing to clean");
        return Ok(CleanOutput {
            records: Vec::new(),
            report: FilterReport::empty(),
            fields: None,
        });
    }

    log_info("Resolving columns...");
    let fields = resolve_with_aliases(table.headers(), aliases)?;
    for (field, idx) in fields.entries() {
        log_info_indent(format!("{} → [{}] {}", field, idx + 1, table.headers()[idx]), 1);
    }

    log_info(format!("Filtering {} rows...", table.len()));
    let (rows, mut report) = filter_rows(table, &fields);
    for stage in &report.stages {
        log_info_indent(
            format!(
                "{}: {} → {} (-{})",
                stage.stage.label(),
                stage.before,
                stage.after,
                stage.removed
            ),
            1,
        );
    }
    if report.ambiguous_dates > 0 {
        log_warning(format!(
            "{} fueling dates also read as valid with day and month swapped",
            report.ambiguous_dates
        ));
    }

    let mut records = Vec::with_capacity(rows.len());
    for row in &rows {
        match project_record(row) {
            Ok(record) => records.push(record),
            Err(e) => {
                report.rejected += 1;
                log_warning(e.to_string());
            }
        }
    }

    log_success(format!("{} clean records", records.len()));

    Ok(CleanOutput {
        records,
        report,
        fields: Some(fields),
    })
}

/// Parse CSV bytes, clean and validate. Nothing is written.
pub fn clean_bytes(bytes: &[u8], aliases: &ColumnAliases) -> PipelineResult<(CsvInfo, CleanOutput)> {
    let parsed = parse_bytes_auto(bytes)?;
    let output = clean_parsed(&parsed, aliases)?;
    Ok((parsed.info(), output))
}

fn clean_parsed(parsed: &ParseResult, aliases: &ColumnAliases) -> PipelineResult<CleanOutput> {
    let info = parsed.info();
    log_success(format!("Detected encoding: {}", info.encoding));
    log_success(format!("Detected separator: '{}'", info.delimiter));
    log_success(format!("Read {} rows, {} columns", info.row_count, info.headers.len()));

    let output = clean_table_with(&parsed.table, aliases)?;

    log_info("Validating records...");
    validate_records(&output.records)?;
    log_success(format!("All {} records valid", output.records.len()));

    Ok(output)
}

/// Load, clean, validate and export according to `config`.
pub async fn run(config: &PipelineConfig) -> PipelineResult<RunSummary> {
    let loaded = load_table(config).await?;
    let output = clean_parsed(&loaded.parsed, &config.aliases)?;

    if output.records.is_empty() {
        log_warning("No site passed the filters, exporting an empty list");
    }

    log_info(format!("Writing {}...", config.output_path.display()));
    export_records(&output.records, &config.output_path)?;
    log_success(format!(
        "Exported {} records to {}",
        output.records.len(),
        config.output_path.display()
    ));

    Ok(RunSummary {
        origin: loaded.origin,
        csv_info: loaded.parsed.info(),
        report: output.report,
        exported: output.records.len(),
        output_path: config.output_path.clone(),
    })
}
