//! Currency codes

use crate::error::{RatesError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Normalized ISO 4217 currency code (three upper-case ASCII letters)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CurrencyCode(String);

impl CurrencyCode {
    /// Parse a code, trimming whitespace and upper-casing it
    pub fn parse(raw: &str) -> Result<Self> {
        let code = raw.trim().to_ascii_uppercase();
        if code.len() != 3 || !code.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(RatesError::InvalidCurrency(format!(
                "'{}' is not a three-letter currency code",
                raw.trim()
            )));
        }
        Ok(Self(code))
    }

    /// Upper-case code, as shown in headers and file names
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Lower-case code, as the NBU API expects in `valcode`
    pub fn api_code(&self) -> String {
        self.0.to_ascii_lowercase()
    }
}

impl fmt::Display for CurrencyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for CurrencyCode {
    type Err = RatesError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl TryFrom<String> for CurrencyCode {
    type Error = RatesError;

    fn try_from(value: String) -> Result<Self> {
        Self::parse(&value)
    }
}

impl From<CurrencyCode> for String {
    fn from(code: CurrencyCode) -> Self {
        code.0
    }
}

impl AsRef<str> for CurrencyCode {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Parse a list of raw codes into an ordered, deduplicated set.
///
/// Blank entries are skipped; the first occurrence of a code fixes its position.
pub fn normalize_codes<I, S>(raw: I) -> Result<Vec<CurrencyCode>>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut codes: Vec<CurrencyCode> = Vec::new();
    for item in raw {
        let item = item.as_ref();
        if item.trim().is_empty() {
            continue;
        }
        let code = CurrencyCode::parse(item)?;
        if !codes.contains(&code) {
            codes.push(code);
        }
    }

    if codes.is_empty() {
        return Err(RatesError::InvalidCurrency(
            "currency list is empty after processing".to_string(),
        ));
    }

    Ok(codes)
}

/// Split a comma separated list (`"usd, EUR"`) and normalize it
pub fn parse_code_list(raw: &str) -> Result<Vec<CurrencyCode>> {
    normalize_codes(raw.split(','))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_normalizes_case_and_whitespace() {
        let code = CurrencyCode::parse("  usd ").unwrap();
        assert_eq!(code.as_str(), "USD");
        assert_eq!(code.api_code(), "usd");
        assert_eq!(code.to_string(), "USD");
    }

    #[test]
    fn test_parse_rejects_malformed_codes() {
        assert!(CurrencyCode::parse("").is_err());
        assert!(CurrencyCode::parse("US").is_err());
        assert!(CurrencyCode::parse("USDT").is_err());
        assert!(CurrencyCode::parse("U$D").is_err());
    }

    #[test]
    fn test_code_list_dedup_keeps_first_position() {
        let codes = parse_code_list("eur, usd,EUR , ,gbp").unwrap();
        let names: Vec<&str> = codes.iter().map(|c| c.as_str()).collect();
        assert_eq!(names, vec!["EUR", "USD", "GBP"]);
    }

    #[test]
    fn test_empty_list_rejected() {
        let err = parse_code_list(" , ,").unwrap_err();
        assert!(matches!(err, RatesError::InvalidCurrency(_)));
        assert!(parse_code_list("").is_err());
    }

    #[test]
    fn test_serde_roundtrip_goes_through_validation() {
        let code: CurrencyCode = serde_json::from_str("\"chf\"").unwrap();
        assert_eq!(code.as_str(), "CHF");
        assert!(serde_json::from_str::<CurrencyCode>("\"franc\"").is_err());
    }
}
