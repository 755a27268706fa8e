//! Rate table aggregation
//!
//! Merges per-currency observation series into one dense date × currency
//! table. Rows are keyed by calendar date, so ordering never depends on how
//! the upstream formatted its dates.

use crate::calendar::display_date;
use crate::currency::CurrencyCode;
use crate::request::RateRequest;
use crate::types::{format_rate, Rate, RateObservation, DATE_HEADER};
use chrono::NaiveDate;
use hashbrown::HashMap;
use std::collections::BTreeMap;

/// Aggregated rates: ascending dates × requested currencies
#[derive(Debug, Clone, PartialEq)]
pub struct RateTable {
    currencies: Vec<CurrencyCode>,
    columns: HashMap<CurrencyCode, usize>,
    rows: BTreeMap<NaiveDate, Vec<Option<Rate>>>,
}

impl RateTable {
    /// Create an empty table; column order follows `currencies`
    pub fn new(currencies: Vec<CurrencyCode>) -> Self {
        let columns = currencies
            .iter()
            .enumerate()
            .map(|(idx, code)| (code.clone(), idx))
            .collect();
        Self {
            currencies,
            columns,
            rows: BTreeMap::new(),
        }
    }

    /// Empty table with the request's columns
    pub fn for_request(request: &RateRequest) -> Self {
        Self::new(request.currencies().to_vec())
    }

    /// Build a table from one observation list per currency
    pub fn aggregate<I>(currencies: Vec<CurrencyCode>, series: I) -> Self
    where
        I: IntoIterator<Item = Vec<RateObservation>>,
    {
        let mut table = Self::new(currencies);
        for observations in series {
            table.insert_series(observations);
        }
        table
    }

    /// Merge one observation.
    ///
    /// Every observed date gets a row, even when the rate is absent; an
    /// absent rate never clears a stored one. A later value for the same
    /// cell replaces an earlier one. Returns true if a rate was stored.
    pub fn insert(&mut self, observation: RateObservation) -> bool {
        let Some(&column) = self.columns.get(&observation.currency) else {
            log::debug!(
                "Ignoring {} observation: currency was not requested",
                observation.currency
            );
            return false;
        };

        let width = self.currencies.len();
        let row = self
            .rows
            .entry(observation.date)
            .or_insert_with(|| vec![None; width]);
        match observation.rate {
            Some(rate) => {
                row[column] = Some(rate);
                true
            }
            None => false,
        }
    }

    /// Merge a whole series; returns how many rates were stored
    pub fn insert_series<I>(&mut self, observations: I) -> usize
    where
        I: IntoIterator<Item = RateObservation>,
    {
        observations
            .into_iter()
            .map(|obs| self.insert(obs))
            .filter(|stored| *stored)
            .count()
    }

    pub fn currencies(&self) -> &[CurrencyCode] {
        &self.currencies
    }

    /// Header row: `Date` followed by the currency codes
    pub fn headers(&self) -> Vec<String> {
        std::iter::once(DATE_HEADER.to_string())
            .chain(self.currencies.iter().map(|c| c.to_string()))
            .collect()
    }

    /// Rows in ascending date order
    pub fn rows(&self) -> impl Iterator<Item = (NaiveDate, &[Option<Rate>])> + '_ {
        self.rows.iter().map(|(date, cells)| (*date, cells.as_slice()))
    }

    pub fn dates(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.rows.keys().copied()
    }

    /// Rate for one cell, if present
    pub fn get(&self, date: NaiveDate, currency: &CurrencyCode) -> Option<Rate> {
        let column = *self.columns.get(currency)?;
        self.rows.get(&date)?.get(column).copied().flatten()
    }

    /// Number of rows
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Rows rendered as text, the way every text encoder writes them
    pub fn string_rows(&self) -> Vec<Vec<String>> {
        self.rows()
            .map(|(date, cells)| {
                std::iter::once(display_date(date))
                    .chain(cells.iter().map(|cell| format_rate(*cell)))
                    .collect()
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn code(raw: &str) -> CurrencyCode {
        CurrencyCode::parse(raw).unwrap()
    }

    fn obs(date: NaiveDate, cur: &str, rate: Option<f64>) -> RateObservation {
        RateObservation::new(date, code(cur), rate)
    }

    #[test]
    fn test_missing_quote_gives_empty_cell_not_dropped_row() {
        let usd = vec![
            obs(d(2025, 1, 1), "USD", None),
            obs(d(2025, 1, 2), "USD", Some(42.1)),
            obs(d(2025, 1, 3), "USD", Some(42.2)),
        ];
        let eur = vec![
            obs(d(2025, 1, 1), "EUR", Some(1.234)),
            obs(d(2025, 1, 2), "EUR", Some(1.235)),
            obs(d(2025, 1, 3), "EUR", Some(1.236)),
        ];
        let table = RateTable::aggregate(vec![code("USD"), code("EUR")], vec![usd, eur]);

        assert_eq!(table.headers(), vec!["Date", "USD", "EUR"]);
        assert_eq!(table.len(), 3);
        assert_eq!(table.string_rows()[0], vec!["2025-01-01", "", "1.234"]);
        assert_eq!(table.get(d(2025, 1, 2), &code("USD")), Some(42.1));
        assert_eq!(table.get(d(2025, 1, 1), &code("USD")), None);
    }

    #[test]
    fn test_date_with_no_data_anywhere_keeps_blank_row() {
        let table = RateTable::aggregate(
            vec![code("USD"), code("EUR")],
            vec![
                vec![
                    obs(d(2025, 1, 1), "USD", None),
                    obs(d(2025, 1, 2), "USD", Some(42.0)),
                ],
                vec![obs(d(2025, 1, 1), "EUR", None)],
            ],
        );
        assert_eq!(table.dates().collect::<Vec<_>>(), vec![d(2025, 1, 1), d(2025, 1, 2)]);
        assert_eq!(table.string_rows()[0], vec!["2025-01-01", "", ""]);
        assert_eq!(table.string_rows()[1], vec!["2025-01-02", "42", ""]);
    }

    #[test]
    fn test_single_failed_cell_still_gives_a_row() {
        let mut table = RateTable::new(vec![code("USD")]);
        assert!(!table.insert(obs(d(2025, 1, 1), "USD", None)));
        assert!(!table.is_empty());
        assert_eq!(table.string_rows(), vec![vec!["2025-01-01", ""]]);
    }

    #[test]
    fn test_rows_sorted_by_calendar_not_string() {
        // "01.02.2025" < "31.01.2025" as strings, but not as dates
        let table = RateTable::aggregate(
            vec![code("USD")],
            vec![vec![
                obs(d(2025, 2, 1), "USD", Some(2.0)),
                obs(d(2025, 1, 31), "USD", Some(1.0)),
            ]],
        );
        let dates: Vec<NaiveDate> = table.dates().collect();
        assert_eq!(dates, vec![d(2025, 1, 31), d(2025, 2, 1)]);
    }

    #[test]
    fn test_unrequested_currency_ignored() {
        let mut table = RateTable::new(vec![code("USD")]);
        assert!(!table.insert(obs(d(2025, 1, 1), "EUR", Some(1.0))));
        assert!(table.is_empty());
    }

    #[test]
    fn test_later_value_replaces_earlier() {
        let mut table = RateTable::new(vec![code("USD")]);
        let stored = table.insert_series(vec![
            obs(d(2025, 1, 1), "USD", Some(41.0)),
            obs(d(2025, 1, 1), "USD", Some(42.0)),
            obs(d(2025, 1, 1), "USD", None),
        ]);
        assert_eq!(stored, 2);
        assert_eq!(table.get(d(2025, 1, 1), &code("USD")), Some(42.0));
    }

    proptest! {
        #[test]
        fn prop_rows_ascending_one_per_observed_date(
            entries in proptest::collection::vec((0u32..60, 0usize..3, proptest::option::of(1.0f64..100.0)), 0..120)
        ) {
            let currencies = vec![code("USD"), code("EUR"), code("PLN")];
            let base = d(2024, 12, 1);
            let mut table = RateTable::new(currencies.clone());
            for (offset, cur, rate) in &entries {
                let date = base + chrono::Duration::days(*offset as i64);
                table.insert(RateObservation::new(date, currencies[*cur].clone(), *rate));
            }

            let dates: Vec<NaiveDate> = table.dates().collect();
            prop_assert!(dates.windows(2).all(|w| w[0] < w[1]));
            for (_, cells) in table.rows() {
                prop_assert_eq!(cells.len(), 3);
            }
            prop_assert_eq!(table.headers(), vec!["Date", "USD", "EUR", "PLN"]);

            let expected_rows = entries
                .iter()
                .map(|(offset, _, _)| *offset)
                .collect::<std::collections::BTreeSet<_>>()
                .len();
            prop_assert_eq!(table.len(), expected_rows);
        }
    }
}
