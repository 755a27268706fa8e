//! Table exporters
//!
//! Both encoders take the same `RateTable` and produce an `ExportArtifact`:
//! CSV stays in memory, XLSX is written to disk under a name derived from
//! the request.

pub mod csv_encoder;
pub mod xlsx_encoder;

pub use csv_encoder::CsvExporter;
pub use xlsx_encoder::XlsxExporter;

use crate::error::{RatesError, Result};
use crate::request::RateRequest;
use crate::table::RateTable;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Output format selectable by the user
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Csv,
    #[default]
    Xlsx,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Xlsx => "xlsx",
        }
    }

    /// Exporter for this format; `output_dir` is used by on-disk formats
    pub fn exporter(&self, output_dir: &Path) -> Box<dyn Exporter> {
        match self {
            ExportFormat::Csv => Box::new(CsvExporter::new()),
            ExportFormat::Xlsx => Box::new(XlsxExporter::new(output_dir)),
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for ExportFormat {
    type Err = RatesError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "csv" => Ok(ExportFormat::Csv),
            "xlsx" | "excel" => Ok(ExportFormat::Xlsx),
            other => Err(RatesError::Export(format!("Unknown export format: {}", other))),
        }
    }
}

/// Where the artifact's bytes live
#[derive(Debug, Clone, PartialEq)]
pub enum ArtifactLocation {
    InMemory(Vec<u8>),
    OnDisk(PathBuf),
}

/// An exported file, intended for a single download.
///
/// Nothing here deletes on-disk artifacts; cleanup belongs to the caller.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportArtifact {
    pub file_name: String,
    pub content_type: &'static str,
    pub location: ArtifactLocation,
}

impl ExportArtifact {
    pub fn in_memory(file_name: impl Into<String>, content_type: &'static str, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            content_type,
            location: ArtifactLocation::InMemory(bytes),
        }
    }

    pub fn on_disk(path: PathBuf, content_type: &'static str) -> Self {
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        Self {
            file_name,
            content_type,
            location: ArtifactLocation::OnDisk(path),
        }
    }

    pub fn path(&self) -> Option<&Path> {
        match &self.location {
            ArtifactLocation::OnDisk(path) => Some(path),
            ArtifactLocation::InMemory(_) => None,
        }
    }

    /// Artifact contents, read from disk if needed
    pub fn bytes(&self) -> Result<Vec<u8>> {
        match &self.location {
            ArtifactLocation::InMemory(bytes) => Ok(bytes.clone()),
            ArtifactLocation::OnDisk(path) => Ok(fs::read(path)?),
        }
    }

    /// `Content-Disposition` header value for serving as a download
    pub fn content_disposition(&self) -> String {
        attachment_disposition(&self.file_name)
    }
}

/// `attachment; filename="..."` with quotes and control characters removed
pub fn attachment_disposition(file_name: &str) -> String {
    let safe: String = file_name
        .chars()
        .filter(|c| *c != '"' && *c != '\\' && !c.is_control())
        .collect();
    format!("attachment; filename=\"{}\"", safe)
}

/// Trait for output encoders
pub trait Exporter: Send + Sync {
    /// Encode the table; the request supplies naming information
    fn export(&self, request: &RateRequest, table: &RateTable) -> Result<ExportArtifact>;

    fn format(&self) -> ExportFormat;
}
