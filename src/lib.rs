pub mod cli;
pub mod core;
pub mod providers;

use crate::cli::convert::ConvertArgs;
use anyhow::Result;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

pub use crate::core::ConversionError;

/// Resolves configuration and performs one conversion.
pub async fn run_convert(
    args: &ConvertArgs,
    config_path: Option<&str>,
    cancel: &CancellationToken,
) -> Result<f64> {
    info!("coinconv starting...");

    let config = crate::core::config::AppConfig::resolve(config_path)?;
    debug!(
        base_url = %config.provider.base_url,
        timeout = ?config.timeout(),
        "Loaded config"
    );

    cli::convert::convert(args, &config, cancel).await
}
