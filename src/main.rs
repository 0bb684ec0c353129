use anyhow::{Context, Result};
use chrono::Local;
use clap::{Args, Parser, Subcommand};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use sales_insights::config::AppConfig;
use sales_insights::file_writer::{render_text_report, write_report, write_report_to_timestamped_dir};
use sales_insights::logging::{init_logging, OperationTimer};
use sales_insights::metrics::MetricsCollector;
use sales_insights::models::{DateRange, OutputFormat};
use sales_insights::report::DashboardReport;
use sales_insights::store::RecordStore;
use sales_insights::validation::InputValidator;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Configuration file (TOML, YAML or JSON)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct RangeArgs {
    /// Path to the order CSV (defaults to data.path from configuration)
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// First day of the range, inclusive (YYYY-MM-DD); defaults to the first purchase day
    #[arg(short, long)]
    start_date: Option<String>,

    /// Last day of the range, inclusive (YYYY-MM-DD); defaults to the last purchase day
    #[arg(short, long)]
    end_date: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the dashboard report for a date range
    Summary {
        #[command(flatten)]
        range: RangeArgs,
    },
    /// Export the dashboard report to files
    Export {
        #[command(flatten)]
        range: RangeArgs,

        /// Output format (txt, csv or json)
        #[arg(short, long)]
        format: Option<String>,

        /// Output directory
        #[arg(short, long)]
        output_dir: Option<PathBuf>,

        /// Write into a new timestamp-named subdirectory
        #[arg(long)]
        timestamped: bool,
    },
    /// Show the date bounds and size of the dataset
    Bounds {
        /// Path to the order CSV (defaults to data.path from configuration)
        #[arg(short, long)]
        input: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    // Parse command line arguments
    let cli = Cli::parse();

    // Load configuration
    let config = AppConfig::load(cli.config.as_deref())?;

    // Initialize logging
    let level = cli.log_level.clone().unwrap_or_else(|| config.get_log_level());
    let log_file = config.logging.file_path.as_deref().map(Path::new);
    let _log_guard = init_logging(Some(&level), &config.logging.format, log_file)?;

    info!("Starting sales-insights");

    match &cli.command {
        Commands::Summary { range } => summary(&config, range)?,
        Commands::Export {
            range,
            format,
            output_dir,
            timestamped,
        } => export(&config, range, format.as_deref(), output_dir.as_deref(), *timestamped)?,
        Commands::Bounds { input } => bounds(&config, input.as_deref())?,
    }

    Ok(())
}

/// Print the text report to stdout
fn summary(config: &AppConfig, args: &RangeArgs) -> Result<()> {
    let store = load_store(config, args.input.as_deref())?;
    let report = build_report(config, &store, args)?;

    let stdout = std::io::stdout();
    let mut handle = stdout.lock();
    render_text_report(&report, &mut handle)?;
    handle.flush()?;
    Ok(())
}

/// Write the report to files
fn export(
    config: &AppConfig, args: &RangeArgs, format: Option<&str>, output_dir: Option<&Path>, timestamped: bool,
) -> Result<()> {
    let timer = OperationTimer::new("export");

    let output_format: OutputFormat = match format {
        Some(value) => value.parse()?,
        None => config.default_format()?,
    };

    // Use configuration output directory if not provided
    let output_dir = output_dir.map_or_else(|| PathBuf::from(&config.export.output_directory), Path::to_path_buf);
    InputValidator::validate_output_dir(&output_dir)?;

    let store = load_store(config, args.input.as_deref())?;
    let report = build_report(config, &store, args)?;

    let files = if timestamped {
        let timestamp = Local::now().format("%Y-%m-%d_%H-%M-%S").to_string();
        write_report_to_timestamped_dir(&report, output_format, &output_dir, &timestamp)?
    } else {
        write_report(&report, output_format, &output_dir)?
    };

    MetricsCollector::default().record_export(output_format, files.len());
    for file in &files {
        debug!("Wrote {}", file.display());
    }
    info!(
        format = %output_format,
        files = files.len(),
        directory = %output_dir.display(),
        "Export complete"
    );
    timer.finish();

    Ok(())
}

/// Print the observed date bounds of the dataset
fn bounds(config: &AppConfig, input: Option<&Path>) -> Result<()> {
    let store = load_store(config, input)?;

    let stdout = std::io::stdout();
    let mut handle = stdout.lock();
    writeln!(handle, "Records: {}", store.len())?;
    match store.date_bounds() {
        Some(range) => {
            writeln!(handle, "First purchase day: {}", range.start)?;
            writeln!(handle, "Last purchase day: {}", range.end)?;
        }
        None => writeln!(handle, "Dataset is empty")?,
    }
    Ok(())
}

fn load_store(config: &AppConfig, input: Option<&Path>) -> Result<RecordStore> {
    let path = input.map_or_else(|| PathBuf::from(config.get_data_path()), Path::to_path_buf);
    InputValidator::validate_input_path(&path)?;

    RecordStore::from_csv_path(&path).with_context(|| format!("Failed to load orders from {}", path.display()))
}

fn build_report(config: &AppConfig, store: &RecordStore, args: &RangeArgs) -> Result<DashboardReport> {
    let start = args.start_date.as_deref().map(InputValidator::parse_date).transpose()?;
    let end = args.end_date.as_deref().map(InputValidator::parse_date).transpose()?;

    // An empty dataset has no bounds; fall back to whatever the user asked for.
    let default = match (store.date_bounds(), start, end) {
        (Some(bounds), _, _) => bounds,
        (None, Some(s), Some(e)) => DateRange::new(s, e)?,
        (None, Some(day), None) | (None, None, Some(day)) => DateRange::new(day, day)?,
        (None, None, None) => anyhow::bail!("Dataset is empty and no date range was given"),
    };

    let range = InputValidator::validate_date_range(start, end, default)?;
    info!(range = %range, "Building report");

    Ok(DashboardReport::build(store, range, &config.report))
}
