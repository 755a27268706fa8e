//! rates-server - web front end for rates-export
//!
//! Serves the input form, generates spreadsheets on `POST /generate` and
//! hands them out on `GET /download`.

use anyhow::{Context, Result};
use clap::Parser;
use log::LevelFilter;
use rates_export::prelude::*;
use rates_export::server::{self, AppState};
use std::net::SocketAddr;
use std::path::PathBuf;

/// Web front end for official NBU exchange rates
#[derive(Parser)]
#[command(name = "rates-server")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Web front end for official NBU exchange rates", long_about = None)]
struct Cli {
    /// Configuration file path
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Address to listen on (overrides the configuration)
    #[arg(short, long)]
    bind: Option<SocketAddr>,

    /// Directory generated files are written to and served from
    #[arg(short, long)]
    output_dir: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    rates_export::logging::init_stderr_logger(LevelFilter::Info)?;

    let cli = Cli::parse();
    let mut config = Config::load(cli.config.as_deref()).context("loading configuration")?;
    if let Some(bind) = cli.bind {
        config.bind_address = bind;
    }
    if let Some(dir) = cli.output_dir {
        config.output_dir = dir;
    }
    config.ensure_output_dir()?;

    log::info!("Starting rates-server...");
    log::info!("  upstream: {} ({:?})", config.api_base_url, config.endpoint);
    log::info!("  output dir: {}", config.output_dir.display());

    let source = NbuRateSource::from_config(&config)?;
    let state = AppState::new(RateService::new(source), config.output_dir.clone());

    server::serve(config.bind_address, state).await?;
    Ok(())
}
