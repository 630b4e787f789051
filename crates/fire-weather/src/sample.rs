//! Synthetic forecast data for development and offline runs
//!
//! The generator mimics a daily fire-weather cycle: fire index and
//! temperature follow the hour of day, wind follows a 12-hour cycle, humidity
//! dries out steadily and a light shower lands every 8 hours.

use crate::{ForecastPoint, WeatherProvider, WeatherReading};
use chrono::{DateTime, Duration, Utc};

/// Generate `hours` hourly forecast points starting at `start`
pub fn sample_forecast(start: DateTime<Utc>, hours: u32) -> Vec<ForecastPoint> {
    (0..hours)
        .map(|hour| ForecastPoint {
            timestamp: start + Duration::hours(i64::from(hour)),
            weather: sample_reading(hour),
        })
        .collect()
}

/// Synthetic conditions `hour` hours into the cycle
fn sample_reading(hour: u32) -> WeatherReading {
    let hour_of_day = f64::from(hour % 24);
    let half_day = f64::from(hour % 12);

    WeatherReading {
        fire_index: (1.0 + hour_of_day * 0.1).min(5.0),
        wind_speed: (5.0 + half_day * 2.0).min(25.0),
        temperature: 20.0 + 10.0 * ((hour_of_day - 12.0) / 12.0).abs(),
        humidity: (80.0 - f64::from(hour) * 0.5).max(30.0),
        precipitation: if hour % 8 == 0 { 0.1 } else { 0.0 },
    }
}

/// Provider that never touches the network
///
/// Returns a fixed current reading everywhere and the sample forecast anchored
/// at `start`.
#[derive(Debug, Clone)]
pub struct SampleWeatherProvider {
    pub start: DateTime<Utc>,
    pub reading: WeatherReading,
}

impl SampleWeatherProvider {
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            start,
            reading: WeatherReading::fallback(),
        }
    }

    /// Use `reading` as the current conditions for every location
    pub fn with_reading(mut self, reading: WeatherReading) -> Self {
        self.reading = reading;
        self
    }
}

impl Default for SampleWeatherProvider {
    fn default() -> Self {
        Self::new(Utc::now())
    }
}

impl WeatherProvider for SampleWeatherProvider {
    fn current(&self, _lat: f64, _lon: f64) -> WeatherReading {
        self.reading
    }

    fn forecast(&self, _lat: f64, _lon: f64, hours: u32) -> Vec<ForecastPoint> {
        sample_forecast(self.start, hours)
    }
}
