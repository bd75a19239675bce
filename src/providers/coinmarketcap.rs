use chrono::{DateTime, Utc};
use reqwest::header::HeaderValue;
use reqwest::{Method, Request, StatusCode, Url};
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, instrument};

use super::transport::{HttpExecutor, ReqwestExecutor, TransportResponse};
use crate::core::conversion::lenient_timestamp;
use crate::core::error::Cancelled;
use crate::core::{ConversionError, ConversionRequest, PriceQuote};

const API_KEY_HEADER: &str = "x-cmc_pro_api_key";
const PRICE_CONVERSION_PATH: &str = "/v2/tools/price-conversion";

#[derive(Debug, Default, Deserialize)]
struct ResponseStatus {
    #[serde(default)]
    error_code: i64,
    #[serde(default)]
    error_message: Option<String>,
    #[serde(default, deserialize_with = "lenient_timestamp")]
    timestamp: Option<DateTime<Utc>>,
}

impl ResponseStatus {
    fn check(&self) -> Result<(), ConversionError> {
        if self.error_code > 0 {
            return Err(ConversionError::StatusError {
                code: self.error_code,
                message: self.error_message.clone().unwrap_or_default(),
            });
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
struct SymbolData {
    #[serde(default)]
    quote: HashMap<String, PriceQuote>,
}

#[derive(Debug, Deserialize)]
struct PriceConversionResponse {
    #[serde(default)]
    status: ResponseStatus,
    #[serde(default)]
    data: Option<HashMap<String, SymbolData>>,
}

impl PriceConversionResponse {
    /// Quote of `from` in `to` units. A provider error in the status
    /// envelope wins over whatever `data` holds.
    fn quote(mut self, from: &str, to: &str) -> Result<PriceQuote, ConversionError> {
        self.status.check()?;

        let mut symbol = self
            .data
            .as_mut()
            .and_then(|data| data.remove(from))
            .ok_or_else(|| ConversionError::SymbolNotFound(from.to_string()))?;

        symbol
            .quote
            .remove(to)
            .ok_or_else(|| ConversionError::SymbolNotFound(to.to_string()))
    }
}

/// Client for the CoinMarketCap price conversion endpoint.
///
/// Holds no per-call state, so one instance can serve concurrent callers.
pub struct CoinMarketCapClient {
    transport: Arc<dyn HttpExecutor>,
    base_url: String,
    api_key: String,
}

impl CoinMarketCapClient {
    pub fn new(base_url: &str, api_key: &str) -> Self {
        Self::with_transport(base_url, api_key, Arc::new(ReqwestExecutor::default()))
    }

    pub fn with_transport(base_url: &str, api_key: &str, transport: Arc<dyn HttpExecutor>) -> Self {
        CoinMarketCapClient {
            transport,
            base_url: base_url.to_string(),
            api_key: api_key.to_string(),
        }
    }

    /// Converts `amount` of `from` into `to`. Symbols are case-insensitive.
    pub async fn convert(&self, amount: f64, from: &str, to: &str) -> Result<f64, ConversionError> {
        self.convert_with_cancel(&CancellationToken::new(), amount, from, to)
            .await
    }

    pub async fn convert_with_cancel(
        &self,
        cancel: &CancellationToken,
        amount: f64,
        from: &str,
        to: &str,
    ) -> Result<f64, ConversionError> {
        let request = ConversionRequest::new(amount, from, to);
        self.fetch_quote(cancel, &request)
            .await
            .map(|quote| quote.price)
    }

    /// Single-shot lookup: one request, no retry.
    #[instrument(
        name = "CoinMarketCapConvert",
        skip(self, cancel, request),
        fields(from = %request.from, to = %request.to)
    )]
    pub async fn fetch_quote(
        &self,
        cancel: &CancellationToken,
        request: &ConversionRequest,
    ) -> Result<PriceQuote, ConversionError> {
        let http_request = self.build_request(cancel, request)?;
        debug!(url = %http_request.url(), "Requesting price conversion");

        let response = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(ConversionError::query(Cancelled)),
            result = self.transport.execute(http_request) => result.map_err(ConversionError::query)?,
        };

        // The body is owned here and dropped on every return below.
        let TransportResponse {
            status, mut body, ..
        } = response;
        if status != StatusCode::OK {
            return Err(ConversionError::QueryFailed {
                reason: status.to_string(),
                source: None,
            });
        }

        let bytes = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(ConversionError::query(Cancelled)),
            result = body.read_to_end() => result.map_err(ConversionError::query)?,
        };
        drop(body);

        let payload: PriceConversionResponse = serde_json::from_slice(&bytes)?;
        debug!(timestamp = ?payload.status.timestamp, "Decoded price conversion response");

        payload.quote(&request.from, &request.to)
    }

    fn build_request(
        &self,
        cancel: &CancellationToken,
        request: &ConversionRequest,
    ) -> Result<Request, ConversionError> {
        if cancel.is_cancelled() {
            return Err(ConversionError::construction(Cancelled));
        }

        let endpoint = format!(
            "{}{}",
            self.base_url.trim_end_matches('/'),
            PRICE_CONVERSION_PATH
        );
        let mut url = Url::parse(&endpoint).map_err(ConversionError::construction)?;
        url.query_pairs_mut()
            .append_pair("symbol", &request.from)
            .append_pair("convert", &request.to)
            .append_pair("amount", &request.formatted_amount());

        let mut key = HeaderValue::from_str(&self.api_key).map_err(ConversionError::construction)?;
        key.set_sensitive(true);

        let mut http_request = Request::new(Method::GET, url);
        http_request.headers_mut().insert(API_KEY_HEADER, key);
        Ok(http_request)
    }
}
