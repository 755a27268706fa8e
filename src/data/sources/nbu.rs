//! National Bank of Ukraine data source integration
//!
//! Official UAH exchange rates from the NBU statistics API. No API key is
//! required. Two endpoint shapes are supported:
//!
//! - `exchange`: one currency, one day per call
//! - `exchange_site`: one currency, a whole date range per call
//!
//! Calls are made one at a time. A failed call is logged and yields no rate;
//! nothing is retried.

use super::RateSource;
use crate::calendar::{api_date, parse_wire_date, DateRange};
use crate::config::Config;
use crate::currency::CurrencyCode;
use crate::error::{RatesError, Result};
use crate::types::{Rate, RateObservation};
use chrono::NaiveDate;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Public NBU statistics directory
pub const NBU_BASE_URL: &str = "https://bank.gov.ua/NBUStatService/v1/statdirectory";

/// User agent sent with every request; the API rejects some bare clients
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64)";

/// Which NBU endpoint to query
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Endpoint {
    /// `exchange?valcode=..&date=..`: one call per currency per day
    #[default]
    Daily,
    /// `exchange_site?start=..&end=..&valcode=..`: one call per currency
    Range,
}

/// One element of the JSON array the API returns
#[derive(Debug, Deserialize)]
struct NbuRate {
    #[serde(default)]
    exchangedate: Option<String>,
    #[serde(default)]
    rate: Option<f64>,
}

/// NBU data source
#[derive(Debug, Clone)]
pub struct NbuRateSource {
    client: Client,
    base_url: String,
    endpoint: Endpoint,
}

impl NbuRateSource {
    /// Create a source for the public API with default settings
    pub fn new() -> Result<Self> {
        Self::with_options(NBU_BASE_URL, DEFAULT_USER_AGENT, Endpoint::default(), None)
    }

    /// Create a source from application configuration
    pub fn from_config(config: &Config) -> Result<Self> {
        Self::with_options(
            &config.api_base_url,
            &config.user_agent,
            config.endpoint,
            config.request_timeout(),
        )
    }

    /// Create a source against an arbitrary base URL
    pub fn with_options(
        base_url: &str,
        user_agent: &str,
        endpoint: Endpoint,
        timeout: Option<Duration>,
    ) -> Result<Self> {
        let mut builder = Client::builder().user_agent(user_agent);
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| RatesError::Upstream(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            endpoint,
        })
    }

    pub fn endpoint(&self) -> Endpoint {
        self.endpoint
    }

    /// URL of the per-day endpoint
    pub fn daily_url(&self, currency: &CurrencyCode, date: NaiveDate) -> String {
        format!(
            "{}/exchange?valcode={}&date={}&json",
            self.base_url,
            currency.api_code(),
            api_date(date)
        )
    }

    /// URL of the ranged endpoint
    pub fn range_url(&self, currency: &CurrencyCode, range: DateRange) -> String {
        format!(
            "{}/exchange_site?start={}&end={}&valcode={}&sort=exchangedate&order=desc&json",
            self.base_url,
            api_date(range.start()),
            api_date(range.end()),
            currency.api_code()
        )
    }

    /// Fetch the rate of one currency on one day.
    ///
    /// Returns `None` on any network, status or decoding problem, or when the
    /// API has no quote for that day.
    pub async fn fetch_rate(&self, currency: &CurrencyCode, date: NaiveDate) -> Option<Rate> {
        let url = self.daily_url(currency, date);
        match self.get_records(&url).await {
            Ok(records) => {
                let rate = records.first().and_then(|r| r.rate);
                if rate.is_none() {
                    log::debug!("Empty response for {} on {}", currency, api_date(date));
                }
                rate
            }
            Err(e) => {
                log::warn!("{} for {} on {}", e, currency, api_date(date));
                None
            }
        }
    }

    /// Fetch all quotes of one currency over a range with a single call
    pub async fn fetch_range(&self, currency: &CurrencyCode, range: DateRange) -> Vec<RateObservation> {
        let url = self.range_url(currency, range);
        let records = match self.get_records(&url).await {
            Ok(records) => records,
            Err(e) => {
                log::warn!(
                    "{} for {} from {} to {}",
                    e,
                    currency,
                    api_date(range.start()),
                    api_date(range.end())
                );
                return Vec::new();
            }
        };

        if records.is_empty() {
            log::debug!("Empty response for {} over {:?}", currency, range);
        }

        records_to_observations(currency, range, records)
    }

    async fn get_records(&self, url: &str) -> Result<Vec<NbuRate>> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| RatesError::Upstream(format!("Network error: {}", e)))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| RatesError::Upstream(format!("Failed to read response: {}", e)))?;

        if status != StatusCode::OK {
            return Err(RatesError::Upstream(format!("{}: {}", status, body.trim())));
        }

        parse_records(&body)
    }
}

impl RateSource for NbuRateSource {
    async fn fetch_series(&self, currency: &CurrencyCode, range: DateRange) -> Vec<RateObservation> {
        match self.endpoint {
            Endpoint::Daily => {
                let mut series = Vec::with_capacity(range.num_days());
                for date in range.days() {
                    let rate = self.fetch_rate(currency, date).await;
                    series.push(RateObservation::new(date, currency.clone(), rate));
                }
                series
            }
            Endpoint::Range => self.fetch_range(currency, range).await,
        }
    }

    fn name(&self) -> &str {
        "nbu"
    }
}

fn parse_records(body: &str) -> Result<Vec<NbuRate>> {
    serde_json::from_str(body)
        .map_err(|e| RatesError::Upstream(format!("JSON decode error: {}", e)))
}

/// Convert ranged-endpoint records, dropping the ones without a usable date
fn records_to_observations(
    currency: &CurrencyCode,
    range: DateRange,
    records: Vec<NbuRate>,
) -> Vec<RateObservation> {
    records
        .into_iter()
        .filter_map(|record| {
            let raw = record.exchangedate.as_deref()?;
            let date = match parse_wire_date(raw) {
                Ok(date) => date,
                Err(e) => {
                    log::warn!("Skipping {} record: {}", currency, e);
                    return None;
                }
            };
            range
                .contains(date)
                .then(|| RateObservation::new(date, currency.clone(), record.rate))
        })
        .collect()
}
