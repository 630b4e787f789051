//! Fire-Weather Readings
//!
//! Supplies the five weather metrics that drive asset fire risk:
//! - Fire index (ignition / spread hazard)
//! - Wind speed (spread driver)
//! - Temperature
//! - Relative humidity (0-100)
//! - Precipitation intensity
//!
//! Readings come from the Tomorrow.io v4 API through [`TomorrowIoClient`]. A
//! [`WeatherProvider`] never fails: when a fetch cannot complete, the caller
//! receives [`WeatherReading::fallback`] (or the sample forecast for hourly
//! data) so a batch of assets always produces a full result set.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub mod sample;
pub mod tomorrow;

pub use sample::{sample_forecast, SampleWeatherProvider};
pub use tomorrow::{TomorrowIoClient, TomorrowIoConfig};

/// Fallback fire index used when the API is unreachable
pub const FALLBACK_FIRE_INDEX: f64 = 1.0;
/// Fallback wind speed
pub const FALLBACK_WIND_SPEED: f64 = 5.0;
/// Fallback temperature
pub const FALLBACK_TEMPERATURE: f64 = 20.0;
/// Fallback relative humidity
pub const FALLBACK_HUMIDITY: f64 = 50.0;
/// Fallback precipitation intensity
pub const FALLBACK_PRECIPITATION: f64 = 0.0;

#[derive(Error, Debug)]
pub enum WeatherError {
    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("API returned status {0}")]
    Status(reqwest::StatusCode),
    #[error("Parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, WeatherError>;

/// Current weather conditions at one coordinate
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WeatherReading {
    pub fire_index: f64,
    pub wind_speed: f64,
    pub temperature: f64,
    /// Relative humidity (0-100)
    pub humidity: f64,
    /// Precipitation intensity
    pub precipitation: f64,
}

impl WeatherReading {
    /// Reading substituted for any failed fetch.
    ///
    /// These are fixed constants, not calibrated against a sensor network.
    pub const fn fallback() -> Self {
        Self {
            fire_index: FALLBACK_FIRE_INDEX,
            wind_speed: FALLBACK_WIND_SPEED,
            temperature: FALLBACK_TEMPERATURE,
            humidity: FALLBACK_HUMIDITY,
            precipitation: FALLBACK_PRECIPITATION,
        }
    }
}

impl Default for WeatherReading {
    fn default() -> Self {
        Self::fallback()
    }
}

/// One hourly point of a forecast timeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastPoint {
    pub timestamp: DateTime<Utc>,
    pub weather: WeatherReading,
}

/// Weather data provider interface
///
/// Implementations absorb their own failures: `current` and `forecast` always
/// return usable data.
pub trait WeatherProvider: Send + Sync {
    /// Current conditions at a location
    fn current(&self, lat: f64, lon: f64) -> WeatherReading;

    /// Hourly forecast for the next `hours` hours
    fn forecast(&self, lat: f64, lon: f64, hours: u32) -> Vec<ForecastPoint>;
}
