//! rates-export CLI - official NBU exchange rates to a spreadsheet
//!
//! ## Example Usage
//!
//! ```bash
//! # Today's USD rate
//! rates-export USD
//!
//! # Several currencies over January, as CSV
//! rates-export usd,eur,pln 2025-01-01 2025-01-31 --format csv
//! ```

use clap::Parser;
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use log::LevelFilter;
use rates_export::calendar::display_date;
use rates_export::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use std::process;

/// CLI-extractor for official FX rates of the National Bank of Ukraine
#[derive(Parser)]
#[command(name = "rates-export")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "CLI-extractor for official FX rates of the National Bank of Ukraine", long_about = None)]
struct Cli {
    /// Code(s) of currency - USD, EUR, ... (comma separated)
    #[arg(value_name = "CURRENCIES")]
    currencies: String,

    /// Start date in format YYYY-MM-DD (default: today)
    #[arg(value_name = "START_DATE")]
    start_date: Option<String>,

    /// End date in format YYYY-MM-DD (default: today)
    #[arg(value_name = "END_DATE")]
    end_date: Option<String>,

    /// Output format (xlsx, csv)
    #[arg(short, long, default_value = "xlsx", value_parser = parse_format)]
    format: ExportFormat,

    /// Directory for the output file
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Configuration file path
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Log file (appended to on every run)
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Hide the progress bar
    #[arg(short, long)]
    quiet: bool,
}

fn parse_format(raw: &str) -> std::result::Result<ExportFormat, String> {
    raw.parse().map_err(|e: RatesError| e.to_string())
}

/// Progress bar advanced once per fetched currency
struct CurrencyProgress(ProgressBar);

impl FetchProgress for CurrencyProgress {
    fn currency_started(&self, currency: &CurrencyCode, days: usize) {
        self.0.set_message(format!("{} ({} days)", currency, days));
    }

    fn currency_finished(&self, _currency: &CurrencyCode, _present: usize) {
        self.0.inc(1);
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let mut config = match Config::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{} {}", "Error:".red().bold(), e);
            process::exit(1);
        }
    };
    if let Some(dir) = &cli.output_dir {
        config.output_dir = dir.clone();
    }
    if let Some(log_file) = &cli.log_file {
        config.log_file = log_file.clone();
    }

    let level = if cli.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    if let Err(e) = rates_export::logging::init_file_logger(&config.log_file, level) {
        eprintln!("{} {}", "Warning:".yellow(), e);
    }

    if cli.verbose {
        println!(
            "{} v{}",
            "rates-export".cyan().bold(),
            env!("CARGO_PKG_VERSION")
        );
        println!("Output dir: {}", config.output_dir.display().to_string().dimmed());
        println!("Log file: {}", config.log_file.display().to_string().dimmed());
    }

    match run(&cli, &config).await {
        Ok(path) => println!("{}", saved_message(&path)),
        Err(e) => {
            log::error!("An error occurred: {}", e);
            eprintln!("{} {}", "Error:".red().bold(), e);
            process::exit(1);
        }
    }
}

type CliResult<T> = std::result::Result<T, Box<dyn std::error::Error>>;

fn saved_message(path: &Path) -> String {
    format!("{} saved OK!", path.display())
}

async fn run(cli: &Cli, config: &Config) -> CliResult<PathBuf> {
    let source = NbuRateSource::from_config(config)?;
    run_with(cli, config, &RateService::new(source)).await
}

/// Fetch, export and write the file; returns the path shown to the user
async fn run_with<S: RateSource>(
    cli: &Cli,
    config: &Config,
    service: &RateService<S>,
) -> CliResult<PathBuf> {
    let today = display_date(chrono::Local::now().date_naive());
    let request = RateRequest::parse(
        &cli.currencies,
        cli.start_date.as_deref().unwrap_or(&today),
        cli.end_date.as_deref().unwrap_or(&today),
    )?;
    config.ensure_output_dir()?;

    let exporter = cli.format.exporter(&config.output_dir);

    let pb = if cli.quiet {
        ProgressBar::hidden()
    } else {
        ProgressBar::new(request.currencies().len() as u64)
    };
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")?
            .progress_chars("█▓▒░ "),
    );
    let progress = CurrencyProgress(pb);

    let mut ctx = RequestContext::new();
    let generation = service
        .generate(&mut ctx, &request, exporter.as_ref(), &progress)
        .await?;
    progress.0.finish_and_clear();

    let path = match generation.artifact.path() {
        Some(path) => path.to_path_buf(),
        None => {
            let path = config
                .output_dir
                .join(format!("{}.{}", request.file_stem(), cli.format.extension()));
            if let Err(e) = fs::write(&path, generation.artifact.bytes()?) {
                ctx.fail(&e);
                return Err(e.into());
            }
            path
        }
    };
    ctx.delivered();

    Ok(path.strip_prefix(".").unwrap_or(&path).to_path_buf())
}
