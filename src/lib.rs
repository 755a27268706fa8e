//! # rates-export
//!
//! Official NBU exchange rates for a set of currencies over a date range,
//! aggregated into one table and exported as CSV or XLSX.
//!
//! The pipeline is the same for every front end (CLI, HTTP server):
//! a `RateRequest` is fetched one currency at a time through a `RateSource`,
//! merged into a `RateTable` and encoded by an `Exporter`.
//!
//! ## Example
//!
//! ```rust,no_run
//! use rates_export::prelude::*;
//!
//! # async fn run() -> rates_export::error::Result<()> {
//! let request = RateRequest::parse("usd, EUR", "2025-01-01", "2025-01-31")?;
//! let service = RateService::new(NbuRateSource::new()?);
//!
//! let mut ctx = RequestContext::new();
//! let generation = service
//!     .generate(&mut ctx, &request, &CsvExporter::new(), &())
//!     .await?;
//! ctx.delivered();
//! println!("{} rows", generation.table.len());
//! # Ok(())
//! # }
//! ```

pub mod calendar;
pub mod config;
pub mod currency;
pub mod data;
pub mod engine;
pub mod error;
pub mod export;
pub mod logging;
pub mod request;
#[cfg(feature = "server")]
pub mod server;
pub mod table;
pub mod types;

pub mod prelude {
    //! Commonly used types and traits
    pub use crate::calendar::DateRange;
    pub use crate::config::Config;
    pub use crate::currency::CurrencyCode;
    pub use crate::data::sources::{Endpoint, InMemoryRateSource, NbuRateSource, RateSource};
    pub use crate::engine::{FetchProgress, Generation, RateService, RequestContext, Stage};
    pub use crate::error::{RatesError, Result};
    pub use crate::export::{
        ArtifactLocation, CsvExporter, ExportArtifact, ExportFormat, Exporter, XlsxExporter,
    };
    pub use crate::request::RateRequest;
    pub use crate::table::RateTable;
    pub use crate::types::*;
}
