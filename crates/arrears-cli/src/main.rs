//! Arrears CLI - builds the processed report workbook from a debt export

use anyhow::{Context, Result};
use arrears_report::{run, BuildOutcome, ReportConfig, RunOptions};
use clap::Parser;
use std::io::{self, Write};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "arrears")]
#[command(
    author,
    version,
    about = "Clean a merged debt export and build the arrears report sheets"
)]
struct Cli {
    /// Source workbook (xlsx)
    #[arg(long)]
    input: PathBuf,

    /// Directory the processed workbook is written to
    #[arg(long)]
    output_dir: PathBuf,

    /// Source sheet name, matched case-insensitively (first sheet when absent)
    #[arg(long, default_value = "sheet1")]
    sheet_name: String,

    /// Column summed into the master trailer
    #[arg(long)]
    sum_header: Option<String>,

    /// Drop empty rows and rows with no identity value
    #[arg(long)]
    drop_empty: bool,

    /// Keep rows whose manager or region is "other"
    #[arg(long)]
    keep_other: bool,

    /// Keep the _temp working directory for inspection
    #[arg(long)]
    keep_temp: bool,

    /// One sheet per trade manager
    #[arg(long)]
    split_by_manager: bool,

    /// Private market sheet
    #[arg(long)]
    market_private: bool,

    /// Image market sheet
    #[arg(long, alias = "market-image")]
    market_tedmiti: bool,

    /// General region sheet
    #[arg(long)]
    region_general: bool,

    /// Agent pivot of the private market
    #[arg(long)]
    pivot_private: bool,

    /// Agent pivot of the image market
    #[arg(long, alias = "pivot-image")]
    pivot_tedmiti: bool,

    /// By-agent rollup sheet (reads the two pivot sheets)
    #[arg(long)]
    by_agent: bool,

    /// JSON file overriding the built-in report configuration
    #[arg(long)]
    config: Option<PathBuf>,
}

impl Cli {
    fn options(&self) -> RunOptions {
        let mut options = RunOptions::new(&self.input, &self.output_dir);
        options.sheet_hint = self.sheet_name.clone();
        options.sum_header = self.sum_header.clone();
        options.drop_empty = self.drop_empty;
        options.keep_other = self.keep_other;
        options.keep_temp = self.keep_temp;
        options.split_by_manager = self.split_by_manager;
        options.market_private = self.market_private;
        options.market_image = self.market_tedmiti;
        options.region_general = self.region_general;
        options.pivot_private = self.pivot_private;
        options.pivot_image = self.pivot_tedmiti;
        options.by_agent = self.by_agent;
        options
    }
}

fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(filter)
        .init();

    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => ReportConfig::from_json_file(path)
            .with_context(|| format!("Failed to load configuration: {}", path.display()))?,
        None => ReportConfig::default(),
    };
    info!(input = %cli.input.display(), output_dir = %cli.output_dir.display(), "starting run");

    let summary = run(&cli.options(), &config)
        .with_context(|| format!("Failed to process: {}", cli.input.display()))?;

    let stdout = io::stdout();
    let mut out = stdout.lock();
    writeln!(out, "Output:      {}", summary.output_path.display())?;
    writeln!(out, "Master rows: {}", summary.master_rows)?;
    writeln!(out, "Grand total: {:.2}", summary.grand_total)?;
    writeln!(out, "Rows removed by filters: {}", summary.counts.rows_removed())?;
    for (builder, outcome) in &summary.outcomes {
        match outcome {
            BuildOutcome::Built { sheet, rows } => {
                writeln!(out, "  [built]   {} -> {} ({} rows)", builder, sheet, rows)?
            }
            BuildOutcome::NotBuilt { reason } => {
                writeln!(out, "  [skipped] {}: {}", builder, reason)?
            }
        }
    }
    for warning in &summary.warnings {
        writeln!(out, "  [warning] {}", warning)?;
    }
    Ok(())
}
