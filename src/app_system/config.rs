//! Runtime settings, read from a TOML file.
//!
//! ```toml
//! log_filter = "info,marketplace_fulfillment=debug"
//! actor_buffer_size = 64
//!
//! [fees]
//! transaction_rate = 0.02
//! service_fee = 0
//!
//! [payouts]
//! store_batch_size = 8
//! weekly_interval_secs = 604800
//! monthly_interval_secs = 2592000
//! enabled = true
//! ```

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::error::ErrorKind;
use crate::pricing::FeeSchedule;

/// Environment variable naming the config file.
pub const CONFIG_ENV: &str = "MARKETPLACE_CONFIG";

#[derive(Debug, Clone, Error, PartialEq)]
pub enum ConfigError {
    #[error("Could not read config file {path}: {message}")]
    Io { path: String, message: String },
    #[error("Malformed config: {0}")]
    Parse(String),
    #[error("Invalid config: {0}")]
    Invalid(String),
}

impl ConfigError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ConfigError::Io { .. } => ErrorKind::Internal,
            ConfigError::Parse(_) | ConfigError::Invalid(_) => ErrorKind::Validation,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PayoutConfig {
    /// Stores settled concurrently within one run.
    pub store_batch_size: usize,
    pub weekly_interval_secs: u64,
    pub monthly_interval_secs: u64,
    /// Whether the scheduler triggers runs. Runs can always be invoked directly.
    pub enabled: bool,
}

impl Default for PayoutConfig {
    fn default() -> Self {
        Self {
            store_batch_size: 8,
            weekly_interval_secs: 7 * 24 * 60 * 60,
            monthly_interval_secs: 30 * 24 * 60 * 60,
            enabled: true,
        }
    }
}

impl PayoutConfig {
    pub fn weekly_interval(&self) -> Duration {
        Duration::from_secs(self.weekly_interval_secs)
    }

    pub fn monthly_interval(&self) -> Duration {
        Duration::from_secs(self.monthly_interval_secs)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MarketplaceConfig {
    /// Default tracing filter; `RUST_LOG` takes precedence.
    pub log_filter: String,
    /// Mailbox size of every actor.
    pub actor_buffer_size: usize,
    pub fees: FeeSchedule,
    pub payouts: PayoutConfig,
}

impl Default for MarketplaceConfig {
    fn default() -> Self {
        Self {
            log_filter: "info".to_string(),
            actor_buffer_size: 32,
            fees: FeeSchedule::default(),
            payouts: PayoutConfig::default(),
        }
    }
}

impl MarketplaceConfig {
    /// Load from the file named by `MARKETPLACE_CONFIG`, or use defaults.
    pub fn load() -> Result<Self, ConfigError> {
        match std::env::var(CONFIG_ENV) {
            Ok(path) if !path.trim().is_empty() => Self::from_file(path),
            _ => Ok(Self::default()),
        }
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Io { path: path.display().to_string(), message: e.to_string() })?;
        Self::from_toml_str(&raw)
    }

    pub fn from_toml_str(raw: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(raw).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=1.0).contains(&self.fees.transaction_rate) {
            return Err(ConfigError::Invalid("fees.transaction_rate must be between 0 and 1".to_string()));
        }
        if self.fees.service_fee.is_negative() {
            return Err(ConfigError::Invalid("fees.service_fee must not be negative".to_string()));
        }
        if self.actor_buffer_size == 0 {
            return Err(ConfigError::Invalid("actor_buffer_size must be positive".to_string()));
        }
        if self.payouts.store_batch_size == 0 {
            return Err(ConfigError::Invalid("payouts.store_batch_size must be positive".to_string()));
        }
        if self.payouts.weekly_interval_secs == 0 || self.payouts.monthly_interval_secs == 0 {
            return Err(ConfigError::Invalid("payout intervals must be positive".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Money;

    #[test]
    fn test_defaults_are_valid() {
        let config = MarketplaceConfig::default();
        config.validate().unwrap();
        assert_eq!(config.fees.transaction_rate, 0.02);
        assert_eq!(config.payouts.weekly_interval(), Duration::from_secs(604_800));
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let config = MarketplaceConfig::from_toml_str(
            r#"
            actor_buffer_size = 128

            [fees]
            service_fee = 5

            [payouts]
            store_batch_size = 2
            "#,
        )
        .unwrap();
        assert_eq!(config.actor_buffer_size, 128);
        assert_eq!(config.fees.service_fee, Money::new(5));
        assert_eq!(config.fees.transaction_rate, 0.02);
        assert_eq!(config.payouts.store_batch_size, 2);
        assert!(config.payouts.enabled);
        assert_eq!(config.log_filter, "info");
    }

    #[test]
    fn test_rejects_bad_values() {
        let err = MarketplaceConfig::from_toml_str("[fees]\ntransaction_rate = 1.5\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));

        let err = MarketplaceConfig::from_toml_str("[payouts]\nstore_batch_size = 0\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));

        let err = MarketplaceConfig::from_toml_str("actor_buffer_size = \"big\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));

        let err = MarketplaceConfig::from_toml_str("retries = 3\n").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
    }

    #[test]
    fn test_missing_file() {
        let err = MarketplaceConfig::from_file("/definitely/not/here.toml").unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
