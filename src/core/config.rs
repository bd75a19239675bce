use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use std::{fs, path::PathBuf};
use tracing::debug;

const SANDBOX_BASE_URL: &str = "https://sandbox-api.coinmarketcap.com";
// Public sandbox key, only valid against the sandbox endpoint.
const SANDBOX_API_KEY: &str = "b54bcf4d-1bca-4e8e-9a24-22ff2c3d462c";
const DEFAULT_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct ProviderConfig {
    pub base_url: String,
    pub api_key: String,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        ProviderConfig {
            base_url: SANDBOX_BASE_URL.to_string(),
            api_key: SANDBOX_API_KEY.to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub provider: ProviderConfig,
    pub timeout_secs: Option<u64>,
}

impl AppConfig {
    /// Loads from `path` when given, otherwise from the default location if a
    /// file exists there, otherwise falls back to sandbox defaults.
    pub fn resolve(path: Option<&str>) -> Result<Self> {
        if let Some(path) = path {
            return Self::load_from_path(path);
        }

        let default_path = Self::default_config_path()?;
        if default_path.exists() {
            return Self::load_from_path(&default_path);
        }

        debug!("No config file found, using sandbox provider");
        Ok(Self::default())
    }

    pub fn default_config_path() -> Result<PathBuf> {
        let proj_dirs = ProjectDirs::from("", "", "coinconv")
            .context("Could not determine project directories")?;
        Ok(proj_dirs.config_dir().join("config.yaml"))
    }

    pub fn load_from_path<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let config_str = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        let config: Self = serde_yaml::from_str(&config_str)
            .with_context(|| format!("Failed to parse config file: {}", path.as_ref().display()))?;
        debug!(base_url = %config.provider.base_url, "Successfully loaded config");
        Ok(config)
    }

    /// Request deadline; falls back to 10 seconds when unset.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_deserialization() {
        let yaml_str = r#"
provider:
  base_url: "https://pro-api.coinmarketcap.com"
  api_key: "123-abc"
timeout_secs: 5
"#;

        let config: AppConfig = serde_yaml::from_str(yaml_str).expect("Failed to deserialize");
        assert_eq!(config.provider.base_url, "https://pro-api.coinmarketcap.com");
        assert_eq!(config.provider.api_key, "123-abc");
        assert_eq!(config.timeout(), Duration::from_secs(5));
    }

    #[test]
    fn test_missing_provider_uses_sandbox() {
        let config: AppConfig = serde_yaml::from_str("timeout_secs: 3").unwrap();
        assert_eq!(config.provider, ProviderConfig::default());
        assert_eq!(config.provider.base_url, SANDBOX_BASE_URL);
    }

    #[test]
    fn test_default_config_has_deadline() {
        let config = AppConfig::default();
        assert!(config.timeout_secs.is_none());
        assert_eq!(config.timeout(), Duration::from_secs(10));
    }

    #[test]
    fn test_load_from_path() -> Result<()> {
        let file = tempfile::NamedTempFile::new()?;
        fs::write(
            file.path(),
            "provider:\n  base_url: http://localhost:1234\n  api_key: key\n",
        )?;

        let config = AppConfig::resolve(file.path().to_str())?;
        assert_eq!(config.provider.base_url, "http://localhost:1234");
        assert_eq!(config.timeout(), Duration::from_secs(DEFAULT_TIMEOUT_SECS));
        Ok(())
    }

    #[test]
    fn test_missing_explicit_path_fails() {
        let result = AppConfig::resolve(Some("/nonexistent/coinconv/config.yaml"));
        assert!(result.is_err());
        assert!(
            result
                .unwrap_err()
                .to_string()
                .contains("Failed to read config file")
        );
    }
}
