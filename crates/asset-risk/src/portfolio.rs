//! Insured asset portfolio loading

use crate::{Asset, AssetCategory, Result, RiskError};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use tracing::info;

/// Validate latitude is in valid range
fn is_valid_latitude(lat: f64) -> bool {
    (-90.0..=90.0).contains(&lat) && lat.is_finite()
}

/// Validate longitude is in valid range
fn is_valid_longitude(lon: f64) -> bool {
    (-180.0..=180.0).contains(&lon) && lon.is_finite()
}

/// Ordered set of assets to assess
#[derive(Debug, Clone, PartialEq)]
pub struct Portfolio {
    assets: Vec<Asset>,
}

impl Portfolio {
    /// Build a portfolio, rejecting empty lists and bad coordinates
    pub fn new(assets: Vec<Asset>) -> Result<Self> {
        if assets.is_empty() {
            return Err(RiskError::EmptyPortfolio);
        }

        for (index, asset) in assets.iter().enumerate() {
            let reason = if !is_valid_latitude(asset.lat) {
                Some(format!("latitude {} out of range", asset.lat))
            } else if !is_valid_longitude(asset.lon) {
                Some(format!("longitude {} out of range", asset.lon))
            } else if asset.name.trim().is_empty() {
                Some("name is empty".to_string())
            } else {
                None
            };

            if let Some(reason) = reason {
                return Err(RiskError::InvalidAsset {
                    index,
                    name: asset.name.clone(),
                    reason,
                });
            }
        }

        Ok(Self { assets })
    }

    /// Sample portfolio of five West Coast properties
    pub fn sample() -> Self {
        Self {
            assets: vec![
                Asset::new(
                    "Los Angeles Office Complex",
                    34.0522,
                    -118.2437,
                    AssetCategory::Commercial,
                    5_000_000.0,
                ),
                Asset::new(
                    "San Francisco Data Center",
                    37.7749,
                    -122.4194,
                    AssetCategory::CriticalInfrastructure,
                    10_000_000.0,
                ),
                Asset::new(
                    "Las Vegas Casino Resort",
                    36.1699,
                    -115.1398,
                    AssetCategory::Hospitality,
                    15_000_000.0,
                ),
                Asset::new(
                    "Phoenix Manufacturing Plant",
                    33.4484,
                    -112.0740,
                    AssetCategory::Industrial,
                    8_000_000.0,
                ),
                Asset::new(
                    "Sacramento Distribution Center",
                    38.5816,
                    -121.4944,
                    AssetCategory::Logistics,
                    3_000_000.0,
                ),
            ],
        }
    }

    /// Load a portfolio from a JSON array of assets
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        info!("Loading portfolio from {:?}", path);

        let file = File::open(path)?;
        let reader = BufReader::new(file);
        let assets: Vec<Asset> = serde_json::from_reader(reader)?;

        let portfolio = Self::new(assets)?;
        info!("Loaded {} assets", portfolio.len());

        Ok(portfolio)
    }

    pub fn assets(&self) -> &[Asset] {
        &self.assets
    }

    pub fn len(&self) -> usize {
        self.assets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assets.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Asset> {
        self.assets.iter()
    }
}

impl Default for Portfolio {
    fn default() -> Self {
        Self::sample()
    }
}

impl<'a> IntoIterator for &'a Portfolio {
    type Item = &'a Asset;
    type IntoIter = std::slice::Iter<'a, Asset>;

    fn into_iter(self) -> Self::IntoIter {
        self.assets.iter()
    }
}
