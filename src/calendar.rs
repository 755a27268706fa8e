//! Calendar helpers: date formats used on each interface and day ranges

use crate::error::{RatesError, Result};
use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

/// User-facing date format (form fields, CLI arguments, file names, output rows)
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Date format of the `date`/`start`/`end` query parameters of the NBU API
pub const API_DATE_FORMAT: &str = "%Y%m%d";

/// Date format of `exchangedate` in NBU API responses
pub const WIRE_DATE_FORMAT: &str = "%d.%m.%Y";

/// Parse a user-supplied `YYYY-MM-DD` date
pub fn parse_date(raw: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), DATE_FORMAT)
        .map_err(|e| RatesError::InvalidDate(format!("'{}': {}", raw.trim(), e)))
}

/// Parse an `exchangedate` value (`DD.MM.YYYY`)
pub fn parse_wire_date(raw: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), WIRE_DATE_FORMAT)
        .map_err(|e| RatesError::InvalidDate(format!("'{}': {}", raw.trim(), e)))
}

/// Format a date for an API query parameter
pub fn api_date(date: NaiveDate) -> String {
    date.format(API_DATE_FORMAT).to_string()
}

/// Format a date for display and output
pub fn display_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// Inclusive range of calendar days, always ordered `start <= end`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RawDateRange")]
pub struct DateRange {
    start: NaiveDate,
    end: NaiveDate,
}

#[derive(Deserialize)]
struct RawDateRange {
    start: NaiveDate,
    end: NaiveDate,
}

impl From<RawDateRange> for DateRange {
    fn from(raw: RawDateRange) -> Self {
        DateRange::new(raw.start, raw.end)
    }
}

impl DateRange {
    /// Build a range, swapping the bounds if they are reversed
    pub fn new(a: NaiveDate, b: NaiveDate) -> Self {
        if a <= b {
            Self { start: a, end: b }
        } else {
            Self { start: b, end: a }
        }
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    /// Number of days in the range (inclusive)
    pub fn num_days(&self) -> usize {
        (self.end - self.start).num_days() as usize + 1
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    /// Iterate over every day from `start` to `end`
    pub fn days(&self) -> impl Iterator<Item = NaiveDate> {
        let end = self.end;
        std::iter::successors(Some(self.start), move |d| {
            let next = *d + Duration::days(1);
            (next <= end).then_some(next)
        })
    }
}
