//! In-memory rate source
//!
//! Serves rates loaded ahead of time. Behaves like the per-day NBU endpoint:
//! one observation per day in the range, `None` where nothing was loaded.

use super::RateSource;
use crate::calendar::{parse_date, DateRange};
use crate::currency::CurrencyCode;
use crate::error::{RatesError, Result};
use crate::types::{Rate, RateObservation};
use chrono::NaiveDate;
use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicUsize, Ordering};

/// In-memory rate storage: currency -> (date -> rate)
#[derive(Debug, Default)]
pub struct InMemoryRateSource {
    rates: HashMap<CurrencyCode, BTreeMap<NaiveDate, Rate>>,
    calls: AtomicUsize,
}

impl InMemoryRateSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a single rate, replacing any previous value for that day
    pub fn add_rate(&mut self, currency: CurrencyCode, date: NaiveDate, rate: Rate) -> Result<()> {
        if !rate.is_finite() || rate <= 0.0 {
            return Err(RatesError::Upstream(format!(
                "rate must be positive, got: {}",
                rate
            )));
        }
        self.rates.entry(currency).or_default().insert(date, rate);
        Ok(())
    }

    /// Load rates from CSV text.
    ///
    /// Expected format: `date,currency,rate` with `YYYY-MM-DD` dates; blank
    /// lines and lines starting with `#` are skipped.
    pub fn load_from_csv(&mut self, csv_data: &str) -> Result<usize> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .comment(Some(b'#'))
            .trim(csv::Trim::All)
            .from_reader(csv_data.as_bytes());

        let mut count = 0;
        for (line, record) in reader.records().enumerate() {
            let record = record?;
            if record.len() != 3 {
                return Err(RatesError::Upstream(format!(
                    "invalid CSV record {}: expected 3 columns, got {}",
                    line + 1,
                    record.len()
                )));
            }
            let date = parse_date(&record[0])?;
            let currency = CurrencyCode::parse(&record[1])?;
            let rate: Rate = record[2].parse().map_err(|e| {
                RatesError::Upstream(format!("invalid rate in record {}: {}", line + 1, e))
            })?;
            self.add_rate(currency, date, rate)?;
            count += 1;
        }
        Ok(count)
    }

    /// Number of `fetch_series` calls served so far
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::Relaxed)
    }

    /// Total number of stored rates across all currencies
    pub fn num_entries(&self) -> usize {
        self.rates.values().map(|series| series.len()).sum()
    }
}

impl RateSource for InMemoryRateSource {
    async fn fetch_series(&self, currency: &CurrencyCode, range: DateRange) -> Vec<RateObservation> {
        self.calls.fetch_add(1, Ordering::Relaxed);
        let series = self.rates.get(currency);
        range
            .days()
            .map(|date| {
                let rate = series.and_then(|s| s.get(&date).copied());
                RateObservation::new(date, currency.clone(), rate)
            })
            .collect()
    }

    fn name(&self) -> &str {
        "memory"
    }
}
