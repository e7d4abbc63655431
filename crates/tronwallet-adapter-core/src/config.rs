use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

pub const CHECK_TIMEOUT_ENV: &str = "TRONWALLET_CHECK_TIMEOUT_MS";
pub const OPEN_URL_ENV: &str = "TRONWALLET_OPEN_URL_WHEN_NOT_FOUND";
pub const OPEN_APP_ENV: &str = "TRONWALLET_OPEN_APP_WITH_DEEPLINK";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config.checkTimeout should be a non-negative integer, got {0}")]
    CheckTimeout(String),
    #[error("{name} should be a boolean, got {value:?}")]
    Flag { name: &'static str, value: String },
    #[error("malformed adapter config: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// Construction-time adapter settings. Immutable once an adapter holds it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdapterConfig {
    #[serde(rename = "checkTimeout")]
    pub check_timeout_ms: u64,
    pub open_url_when_wallet_not_found: bool,
    pub open_app_with_deeplink: bool,
}

impl Default for AdapterConfig {
    fn default() -> Self {
        Self {
            check_timeout_ms: 2_000,
            open_url_when_wallet_not_found: true,
            open_app_with_deeplink: true,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawConfig {
    check_timeout: Option<Value>,
    open_url_when_wallet_not_found: Option<bool>,
    open_app_with_deeplink: Option<bool>,
}

impl AdapterConfig {
    pub fn check_timeout(&self) -> Duration {
        Duration::from_millis(self.check_timeout_ms)
    }

    pub fn with_check_timeout_ms(mut self, ms: u64) -> Self {
        self.check_timeout_ms = ms;
        self
    }

    pub fn with_open_url_when_wallet_not_found(mut self, enabled: bool) -> Self {
        self.open_url_when_wallet_not_found = enabled;
        self
    }

    pub fn with_open_app_with_deeplink(mut self, enabled: bool) -> Self {
        self.open_app_with_deeplink = enabled;
        self
    }

    /// Parse the camelCase construction record. Missing keys take defaults.
    pub fn from_value(value: Value) -> Result<Self, ConfigError> {
        let raw: RawConfig = match value {
            Value::Null => RawConfig::default(),
            other => serde_json::from_value(other)?,
        };
        let defaults = Self::default();
        let check_timeout_ms = match raw.check_timeout {
            None | Some(Value::Null) => defaults.check_timeout_ms,
            Some(v) => v
                .as_u64()
                .ok_or_else(|| ConfigError::CheckTimeout(v.to_string()))?,
        };
        Ok(Self {
            check_timeout_ms,
            open_url_when_wallet_not_found: raw
                .open_url_when_wallet_not_found
                .unwrap_or(defaults.open_url_when_wallet_not_found),
            open_app_with_deeplink: raw
                .open_app_with_deeplink
                .unwrap_or(defaults.open_app_with_deeplink),
        })
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Like [`AdapterConfig::from_env`] with an explicit variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        if let Some(raw) = lookup(CHECK_TIMEOUT_ENV) {
            config.check_timeout_ms = raw
                .trim()
                .parse()
                .map_err(|_| ConfigError::CheckTimeout(raw.clone()))?;
        }
        if let Some(raw) = lookup(OPEN_URL_ENV) {
            config.open_url_when_wallet_not_found = parse_flag(OPEN_URL_ENV, &raw)?;
        }
        if let Some(raw) = lookup(OPEN_APP_ENV) {
            config.open_app_with_deeplink = parse_flag(OPEN_APP_ENV, &raw)?;
        }
        Ok(config)
    }
}

fn parse_flag(name: &'static str, raw: &str) -> Result<bool, ConfigError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::Flag {
            name,
            value: raw.to_owned(),
        }),
    }
}
