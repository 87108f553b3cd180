//! # Application Configuration
//!
//! Settings are read from a YAML file and then overridden by environment
//! variables. The file is optional; every field has a default.
//!
//! ```yaml
//! data_directory: "/home/me/Documents/Finance Tracker"
//! bind_address: "127.0.0.1:5000"
//! default_language: "id"
//! cors_origin: "http://localhost:8080"
//! payment:
//!   server_key: "Mid-server-..."
//!   client_key: "Mid-client-..."
//!   is_production: false
//!   timeout_seconds: 15
//!   pricing:
//!     weekly: 7000
//!     monthly: 15000
//!     premium_upgrade: 50000
//! ```

use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::domain::localization::DEFAULT_LANGUAGE;
use crate::domain::payment_service::Pricing;
use crate::storage::CsvConnection;

pub const CONFIG_FILE_NAME: &str = "finance_tracker.yaml";

pub const ENV_CONFIG_PATH: &str = "FINANCE_TRACKER_CONFIG";
pub const ENV_DATA_DIR: &str = "FINANCE_TRACKER_DATA_DIR";
pub const ENV_BIND: &str = "FINANCE_TRACKER_BIND";
pub const ENV_LANG: &str = "FINANCE_TRACKER_LANG";
pub const ENV_SERVER_KEY: &str = "MIDTRANS_SERVER_KEY";
pub const ENV_CLIENT_KEY: &str = "MIDTRANS_CLIENT_KEY";
pub const ENV_PRODUCTION: &str = "MIDTRANS_PRODUCTION";

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// `None` means `~/Documents/Finance Tracker`
    pub data_directory: Option<PathBuf>,
    pub bind_address: String,
    pub default_language: String,
    pub cors_origin: String,
    pub payment: PaymentConfig,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct PaymentConfig {
    pub server_key: String,
    pub client_key: String,
    pub is_production: bool,
    pub timeout_seconds: u64,
    /// Overrides the sandbox/production Snap URL
    pub base_url: Option<String>,
    pub pricing: Pricing,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_directory: None,
            bind_address: "127.0.0.1:5000".to_string(),
            default_language: DEFAULT_LANGUAGE.to_string(),
            cors_origin: "http://localhost:8080".to_string(),
            payment: PaymentConfig::default(),
        }
    }
}

impl Default for PaymentConfig {
    fn default() -> Self {
        Self {
            server_key: String::new(),
            client_key: String::new(),
            is_production: false,
            timeout_seconds: 15,
            base_url: None,
            pricing: Pricing::default(),
        }
    }
}

impl AppConfig {
    /// Load from the process environment: config file first, then env overrides
    pub fn load() -> Result<Self> {
        Self::load_with(|key| std::env::var(key).ok())
    }

    /// Load using `lookup` for environment variables
    pub fn load_with<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let path = match lookup(ENV_CONFIG_PATH) {
            Some(path) => PathBuf::from(path),
            None => {
                let data_directory = match lookup(ENV_DATA_DIR) {
                    Some(dir) => PathBuf::from(dir),
                    None => CsvConnection::default_directory()?,
                };
                data_directory.join(CONFIG_FILE_NAME)
            }
        };

        let mut config = Self::from_file(&path)?;
        config.apply_overrides(lookup);
        Ok(config)
    }

    /// Parse a YAML file; a missing file yields the defaults
    pub fn from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            info!("No config file at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;
        info!("Loaded config from {}", path.display());
        Ok(config)
    }

    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(dir) = lookup(ENV_DATA_DIR) {
            self.data_directory = Some(PathBuf::from(dir));
        }
        if let Some(bind) = lookup(ENV_BIND) {
            self.bind_address = bind;
        }
        if let Some(lang) = lookup(ENV_LANG) {
            self.default_language = lang;
        }
        if let Some(key) = lookup(ENV_SERVER_KEY) {
            self.payment.server_key = key;
        }
        if let Some(key) = lookup(ENV_CLIENT_KEY) {
            self.payment.client_key = key;
        }
        if let Some(flag) = lookup(ENV_PRODUCTION) {
            self.payment.is_production = matches!(
                flag.trim().to_ascii_lowercase().as_str(),
                "1" | "true" | "yes" | "on"
            );
        }
    }

    pub fn resolved_data_directory(&self) -> Result<PathBuf> {
        match &self.data_directory {
            Some(dir) => Ok(dir.clone()),
            None => CsvConnection::default_directory(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::TempDir;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.bind_address, "127.0.0.1:5000");
        assert_eq!(config.default_language, "id");
        assert_eq!(config.payment.pricing.weekly, 7000);
        assert_eq!(config.payment.pricing.monthly, 15000);
        assert_eq!(config.payment.pricing.premium_upgrade, 50000);
        assert!(!config.payment.is_production);
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let temp = TempDir::new().unwrap();
        let config = AppConfig::load_with(env(&[(
            ENV_DATA_DIR,
            temp.path().to_str().unwrap(),
        )]))
        .unwrap();
        assert_eq!(config.data_directory.as_deref(), Some(temp.path()));
        assert_eq!(config.bind_address, "127.0.0.1:5000");
    }

    #[test]
    fn test_partial_yaml_keeps_other_defaults() {
        let temp = TempDir::new().unwrap();
        fs::write(
            temp.path().join(CONFIG_FILE_NAME),
            "default_language: en\npayment:\n  pricing:\n    monthly: 20000\n",
        )
        .unwrap();

        let config = AppConfig::load_with(env(&[(
            ENV_DATA_DIR,
            temp.path().to_str().unwrap(),
        )]))
        .unwrap();
        assert_eq!(config.default_language, "en");
        assert_eq!(config.payment.pricing.monthly, 20000);
        assert_eq!(config.payment.pricing.weekly, 7000);
        assert_eq!(config.payment.timeout_seconds, 15);
    }

    #[test]
    fn test_explicit_config_path_and_env_overrides() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("custom.yaml");
        fs::write(
            &path,
            "bind_address: \"0.0.0.0:9000\"\npayment:\n  server_key: from-file\n",
        )
        .unwrap();

        let config = AppConfig::load_with(env(&[
            (ENV_CONFIG_PATH, path.to_str().unwrap()),
            (ENV_SERVER_KEY, "from-env"),
            (ENV_PRODUCTION, "true"),
        ]))
        .unwrap();
        assert_eq!(config.bind_address, "0.0.0.0:9000");
        assert_eq!(config.payment.server_key, "from-env");
        assert!(config.payment.is_production);
    }

    #[test]
    fn test_invalid_yaml_is_an_error() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join(CONFIG_FILE_NAME);
        fs::write(&path, "bind_address: [unclosed").unwrap();
        assert!(AppConfig::from_file(&path).is_err());
    }
}
