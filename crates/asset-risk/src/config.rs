//! Run configuration
//!
//! The API key is the only required setting. It comes from an explicit value
//! (CLI flag or constructor) or the `TOMORROW_IO_API_KEY` environment
//! variable; a missing or blank key is fatal before any request is made.

use crate::{Portfolio, Result, RiskError, API_KEY_ENV};
use fire_weather::tomorrow::TOMORROW_IO_BASE_URL;
use fire_weather::TomorrowIoConfig;
use std::path::PathBuf;

/// Default location of the current-risk document served to the map client
pub const DEFAULT_OUTPUT: &str = "client/public/risk_data.geojson";

/// Default location of the forecast animation document
pub const DEFAULT_FORECAST_OUTPUT: &str = "client/public/risk_forecast.geojson";

/// Settings for one assessment run
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub api_key: String,
    pub base_url: String,
    /// Realtime request timeout in seconds
    pub timeout_sec: u64,
    /// Forecast request timeout in seconds
    pub forecast_timeout_sec: u64,
    pub output: PathBuf,
    /// Write the forecast animation here when set
    pub forecast_output: Option<PathBuf>,
    /// JSON asset list; the sample portfolio is used when unset
    pub portfolio_path: Option<PathBuf>,
}

impl RunConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        let weather = TomorrowIoConfig::new(api_key);
        Self {
            api_key: weather.api_key,
            base_url: weather.base_url,
            timeout_sec: weather.timeout_sec,
            forecast_timeout_sec: weather.forecast_timeout_sec,
            output: PathBuf::from(DEFAULT_OUTPUT),
            forecast_output: None,
            portfolio_path: None,
        }
    }

    /// Build from an optional explicit key, falling back to the environment
    pub fn from_env(api_key: Option<String>) -> Result<Self> {
        let key = resolve_api_key(api_key, std::env::var(API_KEY_ENV).ok())?;
        Ok(Self::new(key))
    }

    pub fn with_output(mut self, path: impl Into<PathBuf>) -> Self {
        self.output = path.into();
        self
    }

    pub fn with_forecast_output(mut self, path: impl Into<PathBuf>) -> Self {
        self.forecast_output = Some(path.into());
        self
    }

    pub fn with_portfolio_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.portfolio_path = Some(path.into());
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Weather client settings derived from this run
    pub fn weather_config(&self) -> TomorrowIoConfig {
        TomorrowIoConfig {
            api_key: self.api_key.clone(),
            base_url: self.base_url.clone(),
            timeout_sec: self.timeout_sec,
            forecast_timeout_sec: self.forecast_timeout_sec,
        }
    }

    /// Portfolio named by the config, or the sample portfolio
    pub fn portfolio(&self) -> Result<Portfolio> {
        match &self.portfolio_path {
            Some(path) => Portfolio::load(path),
            None => Ok(Portfolio::sample()),
        }
    }

    pub fn uses_default_endpoint(&self) -> bool {
        self.base_url == TOMORROW_IO_BASE_URL
    }
}

/// Pick the explicit key, else the environment value; blank counts as missing
pub fn resolve_api_key(explicit: Option<String>, env_value: Option<String>) -> Result<String> {
    explicit
        .into_iter()
        .chain(env_value)
        .map(|key| key.trim().to_string())
        .find(|key| !key.is_empty())
        .ok_or(RiskError::MissingApiKey)
}
