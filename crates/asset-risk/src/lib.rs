//! Insured Asset Fire-Weather Risk
//!
//! Scores a portfolio of insured assets against live fire weather and exports
//! the result as a GeoJSON FeatureCollection for the map client.
//!
//! # Scoring Model (multiplicative, clamped)
//!
//! ```text
//! Risk = clamp(F·(V/10) · T · H · P · A, 0, 100)
//! ```
//!
//! | Factor | Formula | Description |
//! |--------|---------|-------------|
//! | F·V/10 | fire_index · wind_speed / 10 | Ignition hazard × spread driver |
//! | T      | max(1, temperature / 25) | Heat amplifier above 25° |
//! | H      | max(1, (100 - humidity) / 50) | Dryness amplifier below 50% RH |
//! | P      | max(0.1, 1 - precipitation / 5) | Rain damping, floored at 0.1 |
//! | A      | category table | Asset category multiplier |
//!
//! # Risk Levels
//!
//! | Score | Level |
//! |-------|-------|
//! | < 25  | low |
//! | 25 to < 60 | medium |
//! | ≥ 60  | high |

use fire_weather::WeatherReading;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

pub mod animation;
pub mod assessor;
pub mod config;
pub mod export;
pub mod portfolio;
pub mod scorer;

pub use assessor::{summary_lines, Assessor};
pub use config::RunConfig;
pub use portfolio::Portfolio;
pub use scorer::{classify, score, ScoreBreakdown};

/// Environment variable holding the Tomorrow.io API key
pub const API_KEY_ENV: &str = "TOMORROW_IO_API_KEY";

/// Label written into the metadata of current-conditions output
pub const REALTIME_DATA_SOURCE: &str = "Tomorrow.io Weather API";

/// Label written into the metadata of forecast animation output
pub const FORECAST_DATA_SOURCE: &str = "Tomorrow.io Forecast API";

#[derive(Error, Debug)]
pub enum RiskError {
    #[error("Tomorrow.io API key is required. Set TOMORROW_IO_API_KEY environment variable.")]
    MissingApiKey,
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Weather client error: {0}")]
    Weather(#[from] fire_weather::WeatherError),
    #[error("Portfolio has no assets")]
    EmptyPortfolio,
    #[error("Invalid asset #{index} ({name}): {reason}")]
    InvalidAsset {
        index: usize,
        name: String,
        reason: String,
    },
    #[error("Output path {0:?} has no file name")]
    InvalidOutputPath(PathBuf),
}

pub type Result<T> = std::result::Result<T, RiskError>;

/// Asset category driving the risk multiplier
///
/// Unrecognized labels are kept verbatim so they round-trip into the output.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum AssetCategory {
    Commercial,
    CriticalInfrastructure,
    Hospitality,
    Industrial,
    Logistics,
    Other(String),
}

impl AssetCategory {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Commercial => "commercial",
            Self::CriticalInfrastructure => "critical_infrastructure",
            Self::Hospitality => "hospitality",
            Self::Industrial => "industrial",
            Self::Logistics => "logistics",
            Self::Other(label) => label,
        }
    }

    /// Fixed risk multiplier for the category
    pub fn risk_multiplier(&self) -> f64 {
        match self {
            Self::Commercial => 1.0,
            Self::CriticalInfrastructure => 1.5,
            Self::Hospitality => 1.2,
            Self::Industrial => 1.3,
            Self::Logistics => 0.9,
            Self::Other(_) => 1.0,
        }
    }
}

impl From<&str> for AssetCategory {
    fn from(label: &str) -> Self {
        match label {
            "commercial" => Self::Commercial,
            "critical_infrastructure" => Self::CriticalInfrastructure,
            "hospitality" => Self::Hospitality,
            "industrial" => Self::Industrial,
            "logistics" => Self::Logistics,
            other => Self::Other(other.to_string()),
        }
    }
}

impl From<String> for AssetCategory {
    fn from(label: String) -> Self {
        Self::from(label.as_str())
    }
}

impl From<AssetCategory> for String {
    fn from(category: AssetCategory) -> Self {
        match category {
            AssetCategory::Other(label) => label,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for AssetCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn default_category() -> AssetCategory {
    AssetCategory::Other("property".to_string())
}

fn default_insured_value() -> f64 {
    1_000_000.0
}

/// An insured asset
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Asset {
    pub name: String,
    pub lat: f64,
    pub lon: f64,
    #[serde(rename = "asset_type", default = "default_category")]
    pub category: AssetCategory,
    /// Informational only; never used in scoring
    #[serde(default = "default_insured_value")]
    pub insured_value: f64,
}

impl Asset {
    pub fn new(
        name: impl Into<String>,
        lat: f64,
        lon: f64,
        category: impl Into<AssetCategory>,
        insured_value: f64,
    ) -> Self {
        Self {
            name: name.into(),
            lat,
            lon,
            category: category.into(),
            insured_value,
        }
    }
}

/// Categorical risk bucket
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl RiskLevel {
    /// Bucket a score: < 25 low, < 60 medium, otherwise high
    pub fn from_score(score: f64) -> Self {
        if score < 25.0 {
            RiskLevel::Low
        } else if score < 60.0 {
            RiskLevel::Medium
        } else {
            RiskLevel::High
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Low => "low",
            RiskLevel::Medium => "medium",
            RiskLevel::High => "high",
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Scored result for one asset
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskAssessment {
    pub asset: Asset,
    pub weather: WeatherReading,
    /// Risk score (0-100)
    pub risk_score: f64,
    pub risk_level: RiskLevel,
}

impl RiskAssessment {
    /// Score `asset` under `weather`
    pub fn evaluate(asset: Asset, weather: WeatherReading) -> Self {
        let risk_score = score(&weather, &asset);
        Self {
            asset,
            weather,
            risk_score,
            risk_level: classify(risk_score),
        }
    }
}

/// Round to 2 decimal places for display output, ties to even
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round_ties_even() / 100.0
}
