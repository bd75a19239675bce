//! Conversion request and quote types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer};

/// Uppercases a ticker so lookups and outbound queries agree on one spelling.
pub fn normalize_symbol(symbol: &str) -> String {
    symbol.to_uppercase()
}

/// A single amount to convert from one symbol into another.
#[derive(Debug, Clone, PartialEq)]
pub struct ConversionRequest {
    pub amount: f64,
    pub from: String,
    pub to: String,
}

impl ConversionRequest {
    /// Builds a request with both symbols normalized to uppercase.
    /// The amount is passed through as given.
    pub fn new(amount: f64, from: &str, to: &str) -> Self {
        ConversionRequest {
            amount,
            from: normalize_symbol(from),
            to: normalize_symbol(to),
        }
    }

    /// Amount as sent to the provider, fixed at six decimal digits
    pub fn formatted_amount(&self) -> String {
        format!("{:.6}", self.amount)
    }
}

/// Reads an RFC 3339 timestamp, treating anything else as absent.
pub(crate) fn lenient_timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(value
        .as_ref()
        .and_then(serde_json::Value::as_str)
        .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
        .map(|dt| dt.with_timezone(&Utc)))
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PriceQuote {
    pub price: f64,
    #[serde(default, deserialize_with = "lenient_timestamp")]
    pub last_updated: Option<DateTime<Utc>>,
}
