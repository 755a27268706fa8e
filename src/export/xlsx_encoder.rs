//! Spreadsheet encoder

use super::{ExportArtifact, ExportFormat, Exporter};
use crate::calendar::display_date;
use crate::error::{RatesError, Result};
use crate::request::RateRequest;
use crate::table::RateTable;
use rust_xlsxwriter::{Format, Workbook};
use std::path::{Path, PathBuf};

pub const SHEET_NAME: &str = "Bank rates";

/// Width of the date column, in Excel character units
pub const DATE_COLUMN_WIDTH: f64 = 11.0;

pub const XLSX_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

/// Writes one workbook per request into `output_dir`
#[derive(Debug, Clone)]
pub struct XlsxExporter {
    output_dir: PathBuf,
}

impl XlsxExporter {
    pub fn new(output_dir: impl AsRef<Path>) -> Self {
        Self {
            output_dir: output_dir.as_ref().to_path_buf(),
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Path the workbook for `request` is saved to
    pub fn path_for(&self, request: &RateRequest) -> PathBuf {
        self.output_dir
            .join(format!("{}.{}", request.file_stem(), ExportFormat::Xlsx.extension()))
    }

    /// Single sheet: bold header, dates as text, rates as numbers, gaps left blank
    pub fn build_workbook(table: &RateTable) -> Result<Workbook> {
        let mut workbook = Workbook::new();
        let bold = Format::new().set_bold();

        let worksheet = workbook.add_worksheet();
        worksheet.set_name(SHEET_NAME)?;

        for (col, header) in table.headers().iter().enumerate() {
            worksheet.write_string_with_format(0, col as u16, header.as_str(), &bold)?;
        }

        for (idx, (date, cells)) in table.rows().enumerate() {
            let row = idx as u32 + 1;
            worksheet.write_string(row, 0, display_date(date))?;
            for (col, cell) in cells.iter().enumerate() {
                if let Some(rate) = cell {
                    worksheet.write_number(row, col as u16 + 1, *rate)?;
                }
            }
        }

        worksheet.set_column_width(0, DATE_COLUMN_WIDTH)?;
        Ok(workbook)
    }

    /// Workbook bytes without touching the filesystem
    pub fn encode(table: &RateTable) -> Result<Vec<u8>> {
        if table.is_empty() {
            return Err(RatesError::EmptyTable);
        }
        let mut workbook = Self::build_workbook(table)?;
        Ok(workbook.save_to_buffer()?)
    }
}

impl Exporter for XlsxExporter {
    fn export(&self, request: &RateRequest, table: &RateTable) -> Result<ExportArtifact> {
        if table.is_empty() {
            log::warn!("[Save error] No data available to save");
            return Err(RatesError::EmptyTable);
        }

        let path = self.path_for(request);
        let mut workbook = Self::build_workbook(table)?;
        if let Err(e) = workbook.save(&path) {
            log::warn!("Error saving file {}: {}", path.display(), e);
            return Err(e.into());
        }

        log::info!("File {} saved successfully.", path.display());
        Ok(ExportArtifact::on_disk(path, XLSX_CONTENT_TYPE))
    }

    fn format(&self) -> ExportFormat {
        ExportFormat::Xlsx
    }
}
