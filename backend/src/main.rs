//! Fuelmap CLI - Turn the COW fueling plan sheet into dashboard JSON
//!
//! # Main Commands
//!
//! ```bash
//! fuelmap run                       # Fetch the sheet (or cache) and write data.json
//! fuelmap serve                     # Start HTTP server (port 3000)
//! ```
//!
//! # Debug Commands
//!
//! ```bash
//! fuelmap parse sheet.csv           # Just parse CSV to JSON rows
//! fuelmap columns sheet.csv         # Show which column feeds which field
//! fuelmap date 45640 12-15-2025     # Show how values normalize to dates
//! fuelmap clean sheet.csv           # Clean a local CSV, no cache or network
//! ```

use clap::{Parser, Subcommand};
use fuelmap::{
    analyze_date, clean_bytes, export_records, parse_csv_file_auto, records_to_json,
    resolve_columns, run, CellValue, ColumnAliases, DateRule, PipelineConfig, SourceLocation,
};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Parser)]
#[command(name = "fuelmap")]
#[command(about = "Clean the COW fueling plan sheet into dashboard JSON", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Full pipeline: sheet (or cache) → filters → JSON file
    Run {
        /// Sheet URL or local CSV path (default: FUELMAP_SOURCE, then the published sheet)
        #[arg(short, long)]
        source: Option<String>,

        /// Snapshot cache path (default: FUELMAP_CACHE_PATH, then sheet_cache.csv)
        #[arg(short, long)]
        cache: Option<PathBuf>,

        /// Output JSON path (default: FUELMAP_OUTPUT, then data.json)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Live fetch timeout in seconds
        #[arg(short, long)]
        timeout: Option<u64>,
    },

    /// Parse a CSV file and output JSON rows
    Parse {
        /// Input CSV file
        input: PathBuf,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Show how CSV headers resolve to logical fields
    Columns {
        /// Input CSV file
        input: PathBuf,
    },

    /// Show how values normalize to dates
    Date {
        /// Raw cell values
        #[arg(required = true)]
        values: Vec<String>,
    },

    /// Clean a local CSV file (no cache, no network)
    Clean {
        /// Input CSV file
        input: PathBuf,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Start HTTP server
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value = "3000")]
        port: u16,
    },
}

#[tokio::main]
async fn main() {
    // Load .env file (if present)
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Run {
            source,
            cache,
            output,
            timeout,
        } => cmd_run(source, cache, output, timeout).await,

        Commands::Parse { input, output } => cmd_parse(&input, output.as_deref()),

        Commands::Columns { input } => cmd_columns(&input),

        Commands::Date { values } => cmd_date(&values),

        Commands::Clean { input, output } => cmd_clean(&input, output.as_deref()),

        Commands::Serve { port } => cmd_serve(port).await,
    };

    if let Err(e) = result {
        eprintln!("[ERROR] {}", e);
        std::process::exit(1);
    }
}

async fn cmd_run(
    source: Option<String>,
    cache: Option<PathBuf>,
    output: Option<PathBuf>,
    timeout: Option<u64>,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = PipelineConfig::from_env();
    if let Some(source) = source {
        config = config.with_source(SourceLocation::parse(&source));
    }
    if let Some(cache) = cache {
        config = config.with_cache_path(cache);
    }
    if let Some(output) = output {
        config = config.with_output_path(output);
    }
    if let Some(secs) = timeout {
        config = config.with_fetch_timeout(Duration::from_secs(secs));
    }

    let summary = run(&config).await?;

    eprintln!("\n{}", summary.report.summary());
    if summary.report.ambiguous_dates > 0 {
        eprintln!("   Ambiguous dates: {}", summary.report.ambiguous_dates);
    }
    if summary.report.rejected > 0 {
        eprintln!("   Rejected rows: {}", summary.report.rejected);
    }
    eprintln!(
        "Done: {} sites written to {}",
        summary.exported,
        summary.output_path.display()
    );
    Ok(())
}

fn cmd_parse(input: &Path, output: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    eprintln!("Parsing CSV: {}", input.display());

    let result = parse_csv_file_auto(input)?;
    let info = result.info();

    eprintln!("   Encoding: {}", info.encoding);
    eprintln!("   Delimiter: '{}' (auto-detected)", info.delimiter);
    eprintln!("   Columns: {}", info.headers.join(", "));
    eprintln!("Parsed {} rows", info.row_count);

    let json = serde_json::to_string_pretty(&result.table.to_json_rows())?;
    write_output(&json, output)?;

    Ok(())
}

fn cmd_columns(input: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let result = parse_csv_file_auto(input)?;
    let headers = result.table.headers();
    let fields = resolve_columns(headers)?;

    println!("{} columns, {} rows", headers.len(), result.table.len());
    for (field, idx) in fields.entries() {
        println!("  {:<18} ← [{:2}] {}", field.name(), idx + 1, headers[idx]);
    }
    Ok(())
}

fn cmd_date(values: &[String]) -> Result<(), Box<dyn std::error::Error>> {
    for value in values {
        let cell = CellValue::from_field(value);
        match analyze_date(&cell) {
            Some(m) => {
                let rule = match m.rule {
                    DateRule::Serial => "serial".to_string(),
                    DateRule::Pattern(label) => label.to_string(),
                    DateRule::Fallback => "fallback".to_string(),
                };
                let flag = if m.ambiguous { ", ambiguous" } else { "" };
                println!("{:<20} → {} ({}{})", value, m.date.format("%Y-%m-%d"), rule, flag);
            }
            None => println!("{:<20} → invalid", value),
        }
    }
    Ok(())
}

fn cmd_clean(input: &Path, output: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    eprintln!("Cleaning: {}", input.display());

    let bytes = fs::read(input)?;
    let (_, cleaned) = clean_bytes(&bytes, &ColumnAliases::default())?;
    eprintln!("{}", cleaned.report.summary());

    match output {
        Some(path) => {
            export_records(&cleaned.records, path)?;
            eprintln!("Output written to: {}", path.display());
        }
        None => println!("{}", records_to_json(&cleaned.records)?),
    }
    Ok(())
}

async fn cmd_serve(port: u16) -> Result<(), Box<dyn std::error::Error>> {
    fuelmap::server::start_server(port).await
}

fn write_output(content: &str, path: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    match path {
        Some(p) => {
            fs::write(p, content)?;
            eprintln!("Output written to: {}", p.display());
        }
        None => {
            println!("{}", content);
        }
    }
    Ok(())
}
