//! Forecast risk animation
//!
//! Scores each asset's hourly forecast and samples it every 3 hours into
//! frames the map client plays back as a trend animation. Frame timestamps
//! come from the first asset's timeline.

use crate::export::{asset_properties, format_timestamp, metadata, point_feature};
use crate::{Portfolio, RiskAssessment, FORECAST_DATA_SOURCE};
use chrono::{DateTime, Utc};
use fire_weather::{ForecastPoint, WeatherProvider};
use geojson::{Feature, FeatureCollection, JsonObject};
use serde_json::json;
use tracing::info;

/// Forecast horizon in hours
pub const FORECAST_HOURS: u32 = 72;

/// Hours between animation frames
pub const FRAME_INTERVAL_HOURS: usize = 3;

/// One asset scored at one frame
#[derive(Debug, Clone, PartialEq)]
pub struct AnimationFeature {
    pub frame_index: usize,
    pub timestamp: DateTime<Utc>,
    pub assessment: RiskAssessment,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ForecastAnimation {
    pub timestamps: Vec<DateTime<Utc>>,
    /// Frame-major: all assets of frame 0, then frame 1, ...
    pub features: Vec<AnimationFeature>,
    pub total_assets: usize,
}

impl ForecastAnimation {
    /// Fetch and score forecasts for every asset in the portfolio
    pub fn build<P: WeatherProvider>(provider: &P, portfolio: &Portfolio) -> Self {
        let forecasts: Vec<Vec<ForecastPoint>> = portfolio
            .iter()
            .map(|asset| {
                info!("Fetching forecast for {}...", asset.name);
                provider.forecast(asset.lat, asset.lon, FORECAST_HOURS)
            })
            .collect();

        let timestamps: Vec<DateTime<Utc>> = forecasts
            .first()
            .map(|first| {
                first
                    .iter()
                    .step_by(FRAME_INTERVAL_HOURS)
                    .map(|p| p.timestamp)
                    .collect()
            })
            .unwrap_or_default();

        let mut features = Vec::with_capacity(timestamps.len() * portfolio.len());
        for (frame_index, timestamp) in timestamps.iter().enumerate() {
            let hour = frame_index * FRAME_INTERVAL_HOURS;

            for (asset, forecast) in portfolio.iter().zip(&forecasts) {
                // Shorter timelines drop out of the later frames
                let Some(point) = forecast.get(hour) else {
                    continue;
                };

                features.push(AnimationFeature {
                    frame_index,
                    timestamp: *timestamp,
                    assessment: RiskAssessment::evaluate(asset.clone(), point.weather),
                });
            }
        }

        Self {
            timestamps,
            features,
            total_assets: portfolio.len(),
        }
    }

    pub fn frame_count(&self) -> usize {
        self.timestamps.len()
    }

    /// Features with unrounded values plus `animation` and `metadata` members
    pub fn to_feature_collection(&self, generated_at: DateTime<Utc>) -> FeatureCollection {
        let features: Vec<Feature> = self.features.iter().map(animation_feature).collect();

        let timestamps: Vec<String> = self.timestamps.iter().copied().map(format_timestamp).collect();

        let mut foreign_members = JsonObject::new();
        foreign_members.insert(
            "animation".to_string(),
            json!({
                "timestamps": timestamps,
                "duration_hours": FORECAST_HOURS,
                "interval_hours": FRAME_INTERVAL_HOURS,
            }),
        );
        foreign_members.insert(
            "metadata".to_string(),
            metadata(generated_at, self.total_assets, FORECAST_DATA_SOURCE),
        );

        FeatureCollection {
            bbox: None,
            features,
            foreign_members: Some(foreign_members),
        }
    }
}

fn animation_feature(feature: &AnimationFeature) -> Feature {
    let assessment = &feature.assessment;
    let wx = &assessment.weather;

    let mut properties = asset_properties(&assessment.asset);
    properties.insert("timestamp".to_string(), json!(format_timestamp(feature.timestamp)));
    properties.insert("fire_index".to_string(), json!(wx.fire_index));
    properties.insert("wind_speed".to_string(), json!(wx.wind_speed));
    properties.insert("temperature".to_string(), json!(wx.temperature));
    properties.insert("humidity".to_string(), json!(wx.humidity));
    properties.insert("precipitation".to_string(), json!(wx.precipitation));
    properties.insert("risk_score".to_string(), json!(assessment.risk_score));
    properties.insert("risk_level".to_string(), json!(assessment.risk_level.as_str()));
    properties.insert("frame_index".to_string(), json!(feature.frame_index));

    point_feature(&assessment.asset, properties)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::write_collection;
    use crate::Asset;
    use chrono::{Duration, TimeZone};
    use fire_weather::{sample_forecast, SampleWeatherProvider, WeatherReading};
    use geojson::GeoJson;
    use tempfile::TempDir;

    fn start() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 1, 31, 21, 0, 0).unwrap()
    }

    /// Serves sample forecasts truncated per latitude
    struct TruncatingProvider {
        short_lat: f64,
        short_hours: u32,
    }

    impl WeatherProvider for TruncatingProvider {
        fn current(&self, _lat: f64, _lon: f64) -> WeatherReading {
            WeatherReading::fallback()
        }

        fn forecast(&self, lat: f64, _lon: f64, hours: u32) -> Vec<ForecastPoint> {
            let hours = if lat == self.short_lat { self.short_hours } else { hours };
            sample_forecast(start(), hours)
        }
    }

    #[test]
    fn test_sample_forecast_frames() {
        let provider = SampleWeatherProvider::new(start());
        let animation = ForecastAnimation::build(&provider, &Portfolio::sample());

        assert_eq!(animation.frame_count(), 24);
        assert_eq!(animation.features.len(), 24 * 5);
        assert_eq!(animation.timestamps[1], start() + Duration::hours(3));
        assert_eq!(animation.timestamps[23], start() + Duration::hours(69));

        // Frame-major ordering, portfolio order within a frame
        assert_eq!(animation.features[0].frame_index, 0);
        assert_eq!(animation.features[4].frame_index, 0);
        assert_eq!(animation.features[5].frame_index, 1);
        assert_eq!(animation.features[5].assessment.asset.name, "Los Angeles Office Complex");
    }

    #[test]
    fn test_frame_uses_every_third_hour() {
        let provider = SampleWeatherProvider::new(start());
        let animation = ForecastAnimation::build(&provider, &Portfolio::sample());
        let expected = sample_forecast(start(), 72);

        let frame_2 = &animation.features[2 * 5];
        assert_eq!(frame_2.frame_index, 2);
        assert_eq!(frame_2.assessment.weather, expected[6].weather);
        assert_eq!(frame_2.timestamp, expected[6].timestamp);
    }

    #[test]
    fn test_short_forecast_skips_late_frames() {
        let portfolio = Portfolio::sample();
        let vegas_lat = portfolio.assets()[2].lat;
        let provider = TruncatingProvider {
            short_lat: vegas_lat,
            short_hours: 10,
        };

        let animation = ForecastAnimation::build(&provider, &portfolio);
        assert_eq!(animation.frame_count(), 24);

        // Vegas only covers hours 0, 3, 6, 9
        let vegas_frames = animation
            .features
            .iter()
            .filter(|f| f.assessment.asset.lat == vegas_lat)
            .count();
        assert_eq!(vegas_frames, 4);
        assert_eq!(animation.features.len(), 24 * 4 + 4);
    }

    #[test]
    fn test_empty_first_forecast_has_no_frames() {
        let portfolio = Portfolio::sample();
        let provider = TruncatingProvider {
            short_lat: portfolio.assets()[0].lat,
            short_hours: 0,
        };

        let animation = ForecastAnimation::build(&provider, &portfolio);
        assert_eq!(animation.frame_count(), 0);
        assert!(animation.features.is_empty());
        assert_eq!(animation.total_assets, 5);
    }

    #[test]
    fn test_animation_document() {
        let portfolio = Portfolio::new(vec![Asset::new("Solo", 35.0, -110.0, "industrial", 2.0)]).unwrap();
        let animation = ForecastAnimation::build(&SampleWeatherProvider::new(start()), &portfolio);
        let collection = animation.to_feature_collection(start());

        assert_eq!(collection.features.len(), 24);
        let members = collection.foreign_members.as_ref().unwrap();
        assert_eq!(members["animation"]["duration_hours"], 72);
        assert_eq!(members["animation"]["interval_hours"], 3);
        assert_eq!(members["animation"]["timestamps"][0], "2025-01-31T21:00:00Z");
        assert_eq!(members["animation"]["timestamps"].as_array().unwrap().len(), 24);
        assert_eq!(members["metadata"]["data_source"], "Tomorrow.io Forecast API");
        assert_eq!(members["metadata"]["total_assets"], 1);

        let props = collection.features[1].properties.as_ref().unwrap();
        assert_eq!(props["frame_index"], 1);
        assert_eq!(props["timestamp"], "2025-02-01T00:00:00Z");
        assert_eq!(props["asset_type"], "industrial");
        // Hour 3 of the sample cycle: 1.0 + 0.3, unrounded
        assert_eq!(props["fire_index"], 1.0 + 3.0 * 0.1);
    }

    #[test]
    fn test_write_animation() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested/risk_forecast.geojson");
        let animation = ForecastAnimation::build(&SampleWeatherProvider::new(start()), &Portfolio::sample());

        write_collection(&path, &animation.to_feature_collection(start())).unwrap();

        let parsed: GeoJson = std::fs::read_to_string(&path).unwrap().parse().unwrap();
        match parsed {
            GeoJson::FeatureCollection(fc) => assert_eq!(fc.features.len(), 120),
            other => panic!("expected FeatureCollection, got {:?}", other),
        }
    }
}
