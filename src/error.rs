//! Error types for rates-export

use thiserror::Error;

/// Main error type for rates-export
#[derive(Error, Debug)]
pub enum RatesError {
    #[error("Invalid currency: {0}")]
    InvalidCurrency(String),

    #[error("Invalid date: {0}")]
    InvalidDate(String),

    #[error("No data available to save")]
    EmptyTable,

    #[error("Upstream error: {0}")]
    Upstream(String),

    #[error("Export error: {0}")]
    Export(String),

    #[error("File not found: {0}")]
    NotFound(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Spreadsheet error: {0}")]
    Xlsx(#[from] rust_xlsxwriter::XlsxError),
}

impl RatesError {
    /// True for errors caused by the caller's input rather than by the system
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            RatesError::InvalidCurrency(_) | RatesError::InvalidDate(_)
        )
    }
}

/// Result type alias for rates-export operations
pub type Result<T> = std::result::Result<T, RatesError>;
