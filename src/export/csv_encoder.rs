//! CSV encoder

use super::{ExportArtifact, ExportFormat, Exporter};
use crate::error::{RatesError, Result};
use crate::request::RateRequest;
use crate::table::RateTable;

/// Name the CSV stream is served under
pub const CSV_FILE_NAME: &str = "exchange_rates.csv";

pub const CSV_CONTENT_TYPE: &str = "text/csv; charset=utf-8";

/// In-memory CSV encoder
#[derive(Debug, Clone, Default)]
pub struct CsvExporter;

impl CsvExporter {
    pub fn new() -> Self {
        Self
    }

    /// Header row then one row per date; absent rates are empty fields
    pub fn encode(table: &RateTable) -> Result<Vec<u8>> {
        let mut writer = csv::Writer::from_writer(Vec::new());
        writer.write_record(table.headers())?;
        for row in table.string_rows() {
            writer.write_record(&row)?;
        }
        writer
            .into_inner()
            .map_err(|e| RatesError::Export(format!("Failed to flush CSV: {}", e)))
    }
}

impl Exporter for CsvExporter {
    fn export(&self, _request: &RateRequest, table: &RateTable) -> Result<ExportArtifact> {
        let bytes = Self::encode(table)?;
        log::info!("Encoded {} rows as CSV ({} bytes)", table.len(), bytes.len());
        Ok(ExportArtifact::in_memory(CSV_FILE_NAME, CSV_CONTENT_TYPE, bytes))
    }

    fn format(&self) -> ExportFormat {
        ExportFormat::Csv
    }
}
