use crate::error::ConfigError;
use clap::ValueEnum;
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://api.pinnacle.com/";
pub const SOCCER_SPORT_ID: i64 = 29;
pub const DEFAULT_TIMEOUT_SECS: u64 = 5;
pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 5;

/// Price format requested from the odds endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OddsFormat {
    #[default]
    Decimal,
    American,
    HongKong,
    Indonesian,
    Malay,
}

impl OddsFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            OddsFormat::Decimal => "Decimal",
            OddsFormat::American => "American",
            OddsFormat::HongKong => "HongKong",
            OddsFormat::Indonesian => "Indonesian",
            OddsFormat::Malay => "Malay",
        }
    }
}

/// Transport settings for the provider client
#[derive(Debug, Clone)]
pub struct ProviderConfig {
    pub base_url: String,
    pub username: String,
    pub password: String,
    pub proxy: Option<String>,
    pub timeout: Duration,
}

impl ProviderConfig {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            username: username.into(),
            password: password.into(),
            proxy: None,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.username.is_empty() || self.password.is_empty() {
            return Err(ConfigError::MissingCredentials);
        }
        if !(self.base_url.starts_with("http://") || self.base_url.starts_with("https://")) {
            return Err(ConfigError::InvalidBaseUrl(self.base_url.clone()));
        }
        if self.timeout.is_zero() {
            return Err(ConfigError::ZeroDuration("Request timeout"));
        }
        Ok(())
    }
}

/// What to poll and how often
#[derive(Debug, Clone)]
pub struct PollerConfig {
    pub sport_id: i64,
    pub live_only: bool,
    pub odds_format: OddsFormat,
    /// Passed through as the provider's `since` cursor when set
    pub since: Option<i64>,
    pub interval: Duration,
}

impl Default for PollerConfig {
    fn default() -> Self {
        Self {
            sport_id: SOCCER_SPORT_ID,
            live_only: true,
            odds_format: OddsFormat::Decimal,
            since: None,
            interval: Duration::from_secs(DEFAULT_POLL_INTERVAL_SECS),
        }
    }
}

impl PollerConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.interval.is_zero() {
            return Err(ConfigError::ZeroDuration("Poll interval"));
        }
        Ok(())
    }
}
