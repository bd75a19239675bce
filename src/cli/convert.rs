use crate::cli::ui::{StyleType, style_text};
use crate::core::config::AppConfig;
use crate::core::{ConversionError, ConversionRequest};
use crate::providers::{CoinMarketCapClient, ReqwestExecutor};
use anyhow::{Context, Result};
use std::sync::Arc;
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{debug, instrument};

pub const USAGE: &str = "Usage: coinconv amount from to\nFor example: coinconv 123.45 USD BTC";

#[derive(Error, Debug, PartialEq)]
pub enum ArgsError {
    #[error("{}", USAGE)]
    Usage,

    #[error("Amount is not a number: {0}")]
    InvalidAmount(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ConvertArgs {
    pub amount: f64,
    pub from: String,
    pub to: String,
}

/// Validates the positional `<amount> <from> <to>` arguments.
pub fn parse_args(args: &[String]) -> Result<ConvertArgs, ArgsError> {
    let [amount, from, to] = args else {
        return Err(ArgsError::Usage);
    };
    let amount = amount
        .parse::<f64>()
        .map_err(|_| ArgsError::InvalidAmount(amount.clone()))?;

    Ok(ConvertArgs {
        amount,
        from: from.clone(),
        to: to.clone(),
    })
}

pub fn format_result(ratio: f64) -> String {
    format!("OK: {}", format_ratio(ratio))
}

/// Shortest round-trip digits; exponent form below 1e-4 and from 1e21 up,
/// with at least two exponent digits (`1.9e-05`, `1e+21`).
fn format_ratio(ratio: f64) -> String {
    let magnitude = ratio.abs();
    if !ratio.is_finite() || ratio == 0.0 || (1e-4..1e21).contains(&magnitude) {
        return ratio.to_string();
    }

    let scientific = format!("{ratio:e}");
    match scientific.split_once('e') {
        Some((mantissa, exponent)) => match exponent.parse::<i32>() {
            Ok(exp) => {
                let sign = if exp < 0 { '-' } else { '+' };
                format!("{mantissa}e{sign}{:02}", exp.abs())
            }
            Err(_) => scientific,
        },
        None => scientific,
    }
}

/// Renders a failure for the terminal. Conversion errors already carry their cause.
pub fn format_error(err: &anyhow::Error) -> String {
    let text = match err.downcast_ref::<ConversionError>() {
        Some(conversion) => conversion.to_string(),
        None => format!("{err:#}"),
    };
    style_text(&text, StyleType::Error)
}

pub fn usage_text() -> String {
    let mut lines = USAGE.lines();
    let head = lines.next().unwrap_or_default();
    let hint = lines.collect::<Vec<_>>().join("\n");
    format!("{head}\n{}", style_text(&hint, StyleType::Subtle))
}

#[instrument(name = "Convert", skip(config, cancel), fields(base_url = %config.provider.base_url))]
pub async fn convert(
    args: &ConvertArgs,
    config: &AppConfig,
    cancel: &CancellationToken,
) -> Result<f64> {
    let transport = ReqwestExecutor::new(Some(config.timeout())).context("Failed to build HTTP client")?;
    let client = CoinMarketCapClient::with_transport(
        &config.provider.base_url,
        &config.provider.api_key,
        Arc::new(transport),
    );

    let request = ConversionRequest::new(args.amount, &args.from, &args.to);
    let quote = client.fetch_quote(cancel, &request).await?;
    debug!(price = quote.price, last_updated = ?quote.last_updated, "Conversion succeeded");

    Ok(quote.price)
}
