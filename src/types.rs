//! Core types and constants

use crate::currency::CurrencyCode;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Exchange rate: value of one currency unit in UAH
pub type Rate = f64;

/// Header of the date column in every exported table
pub const DATE_HEADER: &str = "Date";

/// A single (date, currency) quote as returned by a rate source
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RateObservation {
    pub date: NaiveDate,
    pub currency: CurrencyCode,
    /// `None` when the source has no quote for that day or the call failed
    pub rate: Option<Rate>,
}

impl RateObservation {
    pub fn new(date: NaiveDate, currency: CurrencyCode, rate: Option<Rate>) -> Self {
        Self {
            date,
            currency,
            rate,
        }
    }

    /// Observation for a cell the source could not fill
    pub fn missing(date: NaiveDate, currency: CurrencyCode) -> Self {
        Self::new(date, currency, None)
    }

    pub fn is_present(&self) -> bool {
        self.rate.is_some()
    }
}

/// Format a rate for text output; absent rates become an empty string
pub fn format_rate(rate: Option<Rate>) -> String {
    rate.map(|r| r.to_string()).unwrap_or_default()
}
