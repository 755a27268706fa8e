//! Validated rate requests

use crate::calendar::{display_date, parse_date, DateRange};
use crate::currency::{normalize_codes, parse_code_list, CurrencyCode};
use crate::error::{RatesError, Result};
use crate::types::DATE_HEADER;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Currencies and date range for one export.
///
/// Construction normalizes everything up front: codes are trimmed,
/// upper-cased and deduplicated, and a reversed range is swapped. Nothing
/// downstream re-validates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawRateRequest")]
pub struct RateRequest {
    currencies: Vec<CurrencyCode>,
    range: DateRange,
}

#[derive(Deserialize)]
struct RawRateRequest {
    currencies: Vec<CurrencyCode>,
    range: DateRange,
}

impl TryFrom<RawRateRequest> for RateRequest {
    type Error = RatesError;

    fn try_from(raw: RawRateRequest) -> Result<Self> {
        RateRequest::new(raw.currencies, raw.range.start(), raw.range.end())
    }
}

impl RateRequest {
    /// Build from already parsed parts
    pub fn new(currencies: Vec<CurrencyCode>, start: NaiveDate, end: NaiveDate) -> Result<Self> {
        let currencies = normalize_codes(currencies.iter().map(|c| c.as_str()))?;
        if start > end {
            log::info!("[Dates swapped] start date {} was after end date {}", start, end);
        }
        Ok(Self {
            currencies,
            range: DateRange::new(start, end),
        })
    }

    /// Build from raw user input: `"usd, EUR"` and `YYYY-MM-DD` dates
    pub fn parse(currencies: &str, start: &str, end: &str) -> Result<Self> {
        let codes = parse_code_list(currencies)?;
        let (start, end) = parse_dates(start, end)?;
        Self::new(codes, start, end)
    }

    /// Build from a list of raw codes and `YYYY-MM-DD` dates
    pub fn from_codes<I, S>(currencies: I, start: &str, end: &str) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let codes = normalize_codes(currencies)?;
        let (start, end) = parse_dates(start, end)?;
        Self::new(codes, start, end)
    }

    pub fn currencies(&self) -> &[CurrencyCode] {
        &self.currencies
    }

    pub fn range(&self) -> DateRange {
        self.range
    }

    pub fn start(&self) -> NaiveDate {
        self.range.start()
    }

    pub fn end(&self) -> NaiveDate {
        self.range.end()
    }

    /// Header row: `Date` followed by the codes in request order
    pub fn headers(&self) -> Vec<String> {
        std::iter::once(DATE_HEADER.to_string())
            .chain(self.currencies.iter().map(|c| c.to_string()))
            .collect()
    }

    /// Deterministic artifact name without extension,
    /// e.g. `rates_USD_EUR_2025-01-01_2025-01-31`
    pub fn file_stem(&self) -> String {
        let codes: Vec<&str> = self.currencies.iter().map(|c| c.as_str()).collect();
        format!(
            "rates_{}_{}_{}",
            codes.join("_"),
            display_date(self.start()),
            display_date(self.end())
        )
    }

    /// Number of upstream calls a per-day source will make
    pub fn call_count(&self) -> usize {
        self.currencies.len() * self.range.num_days()
    }
}

fn parse_dates(start: &str, end: &str) -> Result<(NaiveDate, NaiveDate)> {
    let start = parse_date(start).map_err(|e| {
        log::warn!("[Date parsing error] {}", e);
        e
    })?;
    let end = parse_date(end).map_err(|e| {
        log::warn!("[Date parsing error] {}", e);
        e
    })?;
    Ok((start, end))
}
