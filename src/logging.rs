//! Logger setup for the binaries
//!
//! The library only logs through the `log` facade. Each binary installs a
//! backend once at startup: the CLI appends to a log file, the server writes
//! to stderr. `RUST_LOG` overrides the level in both cases.

use crate::error::{RatesError, Result};
use log::LevelFilter;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::Path;

/// Open a log file for appending, creating it if needed
pub fn open_append(path: &Path) -> Result<File> {
    Ok(OpenOptions::new().create(true).append(true).open(path)?)
}

/// Append `<timestamp> <file>:<line> <message>` lines to `path`
pub fn init_file_logger(path: &Path, level: LevelFilter) -> Result<()> {
    let file = open_append(path)?;
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .target(env_logger::Target::Pipe(Box::new(file)))
        .format(|buf, record| {
            writeln!(
                buf,
                "{} {}:{} {}",
                buf.timestamp(),
                record.file().unwrap_or("?"),
                record.line().unwrap_or(0),
                record.args()
            )
        })
        .try_init()
        .map_err(|e| RatesError::Config(format!("Failed to install logger: {}", e)))
}

/// Default env_logger output on stderr
pub fn init_stderr_logger(level: LevelFilter) -> Result<()> {
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .try_init()
        .map_err(|e| RatesError::Config(format!("Failed to install logger: {}", e)))
}
