//! Exchange rate sources
//!
//! A source turns (currency, date range) into observations. Sources never
//! fail past this boundary: anything that goes wrong upstream becomes a
//! missing observation and a log line.
//!
//! - `nbu`: National Bank of Ukraine statistics API over HTTP
//! - `memory`: pre-loaded rates, for tests and offline runs

pub mod memory;
pub mod nbu;

pub use memory::InMemoryRateSource;
pub use nbu::{Endpoint, NbuRateSource};

use crate::calendar::DateRange;
use crate::currency::CurrencyCode;
use crate::types::RateObservation;
use std::future::Future;

/// Trait for exchange rate sources
pub trait RateSource: Send + Sync {
    /// Fetch every available observation for one currency over a date range.
    ///
    /// Order of the returned observations is unspecified.
    fn fetch_series(
        &self,
        currency: &CurrencyCode,
        range: DateRange,
    ) -> impl Future<Output = Vec<RateObservation>> + Send;

    /// Get the source name
    fn name(&self) -> &str;
}
