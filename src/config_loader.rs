use anyhow::{anyhow, Result};
use log::{debug, info};
use serde::Deserialize;
use std::fs;
use std::path::Path;

use crate::domain::constants::*;

/// Top-level configuration structure containing all config sections
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub api: ApiConfig,
    #[serde(default)]
    pub trading: TradingConfig,
    #[serde(default)]
    pub app: AppInfo,
}

/// Trading backend connection configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    pub base_url: String,

    /// Base URL used from inside the docker network
    #[serde(default)]
    pub base_url_internal: Option<String>,

    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

fn default_timeout_ms() -> u64 {
    10_000
}

/// Quote workflow timing and limits
#[derive(Debug, Clone, Deserialize)]
pub struct TradingConfig {
    #[serde(default = "default_quote_window_secs")]
    pub quote_window_secs: u32,

    #[serde(default = "default_daily_limit_ngn")]
    pub daily_limit_ngn: f64,

    #[serde(default = "default_notice_display_secs")]
    pub notice_display_secs: u64,

    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,
}

fn default_quote_window_secs() -> u32 {
    QUOTE_WINDOW_SECS
}

fn default_daily_limit_ngn() -> f64 {
    DAILY_LIMIT_NGN
}

fn default_notice_display_secs() -> u64 {
    NOTICE_DISPLAY_SECS
}

fn default_poll_interval_secs() -> u64 {
    POLL_INTERVAL_SECS
}

impl Default for TradingConfig {
    fn default() -> Self {
        Self {
            quote_window_secs: QUOTE_WINDOW_SECS,
            daily_limit_ngn: DAILY_LIMIT_NGN,
            notice_display_secs: NOTICE_DISPLAY_SECS,
            poll_interval_secs: POLL_INTERVAL_SECS,
        }
    }
}

/// Application information
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppInfo {
    #[serde(default)]
    pub rust_running_in_docker: bool,
}

impl AppConfig {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        let config_str = fs::read_to_string(path)
            .map_err(|e| anyhow!("Failed to read config file '{}': {}", path.display(), e))?;

        let config = Self::from_toml_str(&config_str)
            .map_err(|e| anyhow!("Failed to parse config file '{}': {}", path.display(), e))?;

        info!("Loaded configuration from {}", path.display());
        debug!("Running in Docker: {}", config.app.rust_running_in_docker);

        Ok(config)
    }

    /// Parse configuration from TOML text and check the values make sense
    pub fn from_toml_str(config_str: &str) -> Result<Self> {
        let config: AppConfig = toml::from_str(config_str)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.trading.quote_window_secs == 0 {
            return Err(anyhow!("trading.quote_window_secs must be at least 1"));
        }
        if !(self.trading.daily_limit_ngn.is_finite() && self.trading.daily_limit_ngn > 0.0) {
            return Err(anyhow!("trading.daily_limit_ngn must be a positive number"));
        }
        if self.trading.poll_interval_secs == 0 {
            return Err(anyhow!("trading.poll_interval_secs must be at least 1"));
        }
        Ok(())
    }

    /// Helper to get the appropriate API base URL based on Docker status
    pub fn api_base_url(&self) -> &str {
        match (&self.api.base_url_internal, self.app.rust_running_in_docker) {
            (Some(internal), true) => internal,
            _ => &self.api.base_url,
        }
    }
}
