//! Application configuration
//!
//! Loaded from TOML. Every key is optional:
//!
//! ```toml
//! api_base_url = "https://bank.gov.ua/NBUStatService/v1/statdirectory"
//! user_agent = "Mozilla/5.0 (Windows NT 10.0; Win64; x64)"
//! endpoint = "daily"            # or "range"
//! request_timeout_secs = 10     # no timeout when absent
//! output_dir = "."
//! bind_address = "0.0.0.0:5555"
//! log_file = "rates-export.log"
//! ```

use crate::data::sources::nbu::{Endpoint, DEFAULT_USER_AGENT, NBU_BASE_URL};
use crate::error::{RatesError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Configuration shared by the CLI and the HTTP server
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    #[serde(default)]
    pub endpoint: Endpoint,
    #[serde(default)]
    pub request_timeout_secs: Option<u64>,
    /// Where spreadsheet artifacts are written and served from
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
    #[serde(default = "default_bind_address")]
    pub bind_address: SocketAddr,
    /// Append-only log of CLI runs
    #[serde(default = "default_log_file")]
    pub log_file: PathBuf,
}

fn default_api_base_url() -> String {
    NBU_BASE_URL.to_string()
}

fn default_user_agent() -> String {
    DEFAULT_USER_AGENT.to_string()
}

fn default_output_dir() -> PathBuf {
    PathBuf::from(".")
}

fn default_bind_address() -> SocketAddr {
    SocketAddr::from(([0, 0, 0, 0], 5555))
}

fn default_log_file() -> PathBuf {
    PathBuf::from("rates-export.log")
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: default_api_base_url(),
            user_agent: default_user_agent(),
            endpoint: Endpoint::default(),
            request_timeout_secs: None,
            output_dir: default_output_dir(),
            bind_address: default_bind_address(),
            log_file: default_log_file(),
        }
    }
}

impl Config {
    /// Load configuration.
    ///
    /// An explicit path must exist and parse. Without one, the default
    /// location is tried and silently skipped if absent.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => match Self::default_path() {
                Some(path) if path.exists() => Self::from_file(&path),
                _ => Ok(Self::default()),
            },
        }
    }

    /// `~/.rates-export/config.toml`
    pub fn default_path() -> Option<PathBuf> {
        dirs::home_dir().map(|home| home.join(".rates-export").join("config.toml"))
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path).map_err(|e| {
            RatesError::Config(format!("Failed to read {}: {}", path.display(), e))
        })?;
        Self::from_toml(&contents)
            .map_err(|e| RatesError::Config(format!("{}: {}", path.display(), e)))
    }

    pub fn from_toml(contents: &str) -> Result<Self> {
        toml::from_str(contents).map_err(|e| RatesError::Config(e.to_string()))
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }

    pub fn ensure_output_dir(&self) -> Result<()> {
        fs::create_dir_all(&self.output_dir)?;
        Ok(())
    }
}
