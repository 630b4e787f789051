//! Fire-weather risk scoring
//!
//! Implements the multiplicative scoring model:
//! Risk = clamp(F·(V/10) · T · H · P · A, 0, 100)
//!
//! The amplifiers T and H never drop below 1.0 and the damping factor P never
//! drops below 0.1, so mild weather leaves the base hazard untouched and heavy
//! rain cannot zero it.

use crate::{Asset, RiskLevel};
use fire_weather::WeatherReading;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Upper bound of the risk scale
pub const MAX_RISK_SCORE: f64 = 100.0;

/// Temperature at which heat starts amplifying risk
const TEMP_REFERENCE: f64 = 25.0;

/// Precipitation intensity that would fully damp risk before the floor applies
const PRECIP_SATURATION: f64 = 5.0;

/// Minimum precipitation damping factor
const PRECIP_FLOOR: f64 = 0.1;

/// Intermediate factors of one score computation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    pub fire_wind: f64,
    pub temp_factor: f64,
    pub humidity_factor: f64,
    pub precip_factor: f64,
    pub asset_factor: f64,
    /// Unclamped product of all factors
    pub raw: f64,
}

impl ScoreBreakdown {
    pub fn compute(weather: &WeatherReading, asset: &Asset) -> Self {
        let fire_wind = weather.fire_index * (weather.wind_speed / 10.0);
        let temp_factor = (weather.temperature / TEMP_REFERENCE).max(1.0);
        let humidity_factor = ((100.0 - weather.humidity) / 50.0).max(1.0);
        let precip_factor = (1.0 - weather.precipitation / PRECIP_SATURATION).max(PRECIP_FLOOR);
        let asset_factor = asset.category.risk_multiplier();

        let raw = fire_wind * temp_factor * humidity_factor * precip_factor * asset_factor;

        Self {
            fire_wind,
            temp_factor,
            humidity_factor,
            precip_factor,
            asset_factor,
            raw,
        }
    }

    /// Final score on the 0-100 scale
    pub fn score(&self) -> f64 {
        if self.raw.is_nan() {
            return 0.0;
        }
        self.raw.clamp(0.0, MAX_RISK_SCORE)
    }
}

/// Risk score (0-100) for `asset` under `weather`
pub fn score(weather: &WeatherReading, asset: &Asset) -> f64 {
    let breakdown = ScoreBreakdown::compute(weather, asset);

    debug!(
        "Scored {}: {:.2} (fire_wind={:.2}, temp={:.2}, humidity={:.2}, precip={:.2}, asset={:.2})",
        asset.name,
        breakdown.score(),
        breakdown.fire_wind,
        breakdown.temp_factor,
        breakdown.humidity_factor,
        breakdown.precip_factor,
        breakdown.asset_factor
    );

    breakdown.score()
}

/// Risk level for a score
pub fn classify(score: f64) -> RiskLevel {
    RiskLevel::from_score(score)
}
