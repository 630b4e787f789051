//! Tomorrow.io v4 weather client
//!
//! Realtime conditions come from `/weather/realtime`, hourly timelines from
//! `/weather/forecast`. Both request the same five fire-weather fields.
//!
//! # Usage
//!
//! ```rust,ignore
//! let client = TomorrowIoClient::new(TomorrowIoConfig::new(api_key))?;
//! let reading = client.current(34.0522, -118.2437);
//! ```

use crate::sample::sample_forecast;
use crate::{ForecastPoint, Result, WeatherError, WeatherProvider, WeatherReading};
use chrono::{DateTime, Utc};
use reqwest::blocking::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, warn};

pub const TOMORROW_IO_BASE_URL: &str = "https://api.tomorrow.io/v4";

/// Fields requested from every endpoint
const FIELDS: [&str; 5] = [
    "fireIndex",
    "windSpeed",
    "temperature",
    "humidity",
    "precipitationIntensity",
];

/// Client configuration
#[derive(Debug, Clone)]
pub struct TomorrowIoConfig {
    pub api_key: String,
    /// API root, without trailing slash
    pub base_url: String,
    /// Realtime request timeout in seconds (default: 10)
    pub timeout_sec: u64,
    /// Forecast request timeout in seconds (default: 15)
    pub forecast_timeout_sec: u64,
}

impl TomorrowIoConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: TOMORROW_IO_BASE_URL.to_string(),
            timeout_sec: 10,
            forecast_timeout_sec: 15,
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

#[derive(Debug, Deserialize)]
struct RealtimeResponse {
    data: RealtimeData,
}

#[derive(Debug, Deserialize)]
struct RealtimeData {
    values: TomorrowValues,
}

#[derive(Debug, Deserialize)]
struct ForecastResponse {
    #[serde(default)]
    timelines: Timelines,
}

#[derive(Debug, Default, Deserialize)]
struct Timelines {
    #[serde(default)]
    hourly: Vec<ForecastInterval>,
}

#[derive(Debug, Deserialize)]
struct ForecastInterval {
    time: DateTime<Utc>,
    values: TomorrowValues,
}

/// Field values as returned by the API; any of them may be absent or null
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TomorrowValues {
    fire_index: Option<f64>,
    wind_speed: Option<f64>,
    temperature: Option<f64>,
    humidity: Option<f64>,
    precipitation_intensity: Option<f64>,
}

impl TomorrowValues {
    /// Fill missing fields from `defaults`
    fn into_reading(self, defaults: WeatherReading) -> WeatherReading {
        WeatherReading {
            fire_index: self.fire_index.unwrap_or(defaults.fire_index),
            wind_speed: self.wind_speed.unwrap_or(defaults.wind_speed),
            temperature: self.temperature.unwrap_or(defaults.temperature),
            humidity: self.humidity.unwrap_or(defaults.humidity),
            precipitation: self.precipitation_intensity.unwrap_or(defaults.precipitation),
        }
    }
}

/// Realtime fields missing from a successful response read as zero
const REALTIME_MISSING: WeatherReading = WeatherReading {
    fire_index: 0.0,
    wind_speed: 0.0,
    temperature: 0.0,
    humidity: 0.0,
    precipitation: 0.0,
};

/// Forecast fields missing from a successful response read as the fallback values
const FORECAST_MISSING: WeatherReading = WeatherReading::fallback();

/// Blocking Tomorrow.io client
pub struct TomorrowIoClient {
    config: TomorrowIoConfig,
    client: Client,
}

impl TomorrowIoClient {
    pub fn new(config: TomorrowIoConfig) -> Result<Self> {
        let client = Client::builder().build()?;
        Ok(Self::with_client(config, client))
    }

    /// Use a preconfigured HTTP client
    pub fn with_client(config: TomorrowIoConfig, client: Client) -> Self {
        Self { config, client }
    }

    pub fn config(&self) -> &TomorrowIoConfig {
        &self.config
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.config.base_url.trim_end_matches('/'), path)
    }

    /// Location, key and field selection shared by both endpoints
    fn base_query(&self, lat: f64, lon: f64) -> Vec<(&'static str, String)> {
        let mut query = vec![
            ("location", format!("{},{}", lat, lon)),
            ("apikey", self.config.api_key.clone()),
        ];
        query.extend(FIELDS.iter().map(|f| ("fields", (*f).to_string())));
        query
    }

    fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&'static str, String)],
        timeout_sec: u64,
    ) -> Result<T> {
        let response = self
            .client
            .get(self.endpoint(path))
            .query(query)
            .timeout(Duration::from_secs(timeout_sec))
            .send()?;

        let status = response.status();
        if !status.is_success() {
            return Err(WeatherError::Status(status));
        }

        let body = response.text()?;
        Ok(serde_json::from_str(&body)?)
    }

    /// Fetch realtime conditions, surfacing any failure
    pub fn fetch_realtime(&self, lat: f64, lon: f64) -> Result<WeatherReading> {
        let query = self.base_query(lat, lon);
        let response: RealtimeResponse =
            self.get_json("weather/realtime", &query, self.config.timeout_sec)?;

        Ok(response.data.values.into_reading(REALTIME_MISSING))
    }

    /// Fetch an hourly forecast, surfacing any failure
    pub fn fetch_forecast(&self, lat: f64, lon: f64, hours: u32) -> Result<Vec<ForecastPoint>> {
        let mut query = self.base_query(lat, lon);
        query.push(("timesteps", "1h".to_string()));
        query.push(("endTime", format!("nowPlus{}h", hours)));

        let response: ForecastResponse =
            self.get_json("weather/forecast", &query, self.config.forecast_timeout_sec)?;

        Ok(response
            .timelines
            .hourly
            .into_iter()
            .map(|interval| ForecastPoint {
                timestamp: interval.time,
                weather: interval.values.into_reading(FORECAST_MISSING),
            })
            .collect())
    }
}

impl WeatherProvider for TomorrowIoClient {
    fn current(&self, lat: f64, lon: f64) -> WeatherReading {
        match self.fetch_realtime(lat, lon) {
            Ok(reading) => {
                debug!("Realtime weather for {},{}: {:?}", lat, lon, reading);
                reading
            }
            Err(e) => {
                warn!("Error fetching weather data for {},{}: {}", lat, lon, e);
                WeatherReading::fallback()
            }
        }
    }

    fn forecast(&self, lat: f64, lon: f64, hours: u32) -> Vec<ForecastPoint> {
        match self.fetch_forecast(lat, lon, hours) {
            Ok(points) => points,
            Err(e) => {
                warn!("Error fetching forecast data for {},{}: {}", lat, lon, e);
                sample_forecast(Utc::now(), hours)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Read, Write};
    use std::net::TcpListener;
    use std::thread::{self, JoinHandle};

    /// Serve exactly one HTTP response on a loopback port, returning the raw request
    fn serve_once(status_line: &'static str, body: &str) -> (String, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        let body = body.to_string();

        let handle = thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            let mut buf = [0u8; 8192];
            let n = stream.read(&mut buf).unwrap();
            let request = String::from_utf8_lossy(&buf[..n]).to_string();

            let response = format!(
                "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                status_line,
                body.len(),
                body
            );
            stream.write_all(response.as_bytes()).unwrap();
            request
        });

        (format!("http://{}", addr), handle)
    }

    /// Base URL of a port nothing listens on
    fn closed_port_url() -> String {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        format!("http://{}", addr)
    }

    fn client_for(base_url: String) -> TomorrowIoClient {
        let http = Client::builder().no_proxy().build().unwrap();
        TomorrowIoClient::with_client(TomorrowIoConfig::new("test-key").with_base_url(base_url), http)
    }

    #[test]
    fn test_config_defaults() {
        let config = TomorrowIoConfig::new("abc");
        assert_eq!(config.base_url, "https://api.tomorrow.io/v4");
        assert_eq!(config.timeout_sec, 10);
        assert_eq!(config.forecast_timeout_sec, 15);
    }

    #[test]
    fn test_realtime_parses_values() {
        let body = r#"{"data": {"time": "2025-01-31T20:00:00Z", "values": {
            "fireIndex": 3.5, "windSpeed": 12.25, "temperature": 31.0,
            "humidity": 18.0, "precipitationIntensity": 0.2
        }}}"#;
        let (url, server) = serve_once("200 OK", body);
        let client = client_for(url);

        let reading = client.fetch_realtime(34.0522, -118.2437).unwrap();
        assert_eq!(reading.fire_index, 3.5);
        assert_eq!(reading.wind_speed, 12.25);
        assert_eq!(reading.temperature, 31.0);
        assert_eq!(reading.humidity, 18.0);
        assert_eq!(reading.precipitation, 0.2);

        let request = server.join().unwrap();
        assert!(request.starts_with("GET /weather/realtime?"), "{}", request);
        assert!(request.contains("apikey=test-key"));
        assert!(request.contains("fields=fireIndex"));
        assert!(request.contains("fields=precipitationIntensity"));
        assert!(request.contains("location=34.0522%2C-118.2437"));
    }

    #[test]
    fn test_realtime_missing_fields_read_as_zero() {
        let (url, server) = serve_once("200 OK", r#"{"data": {"values": {"fireIndex": 2.0}}}"#);
        let client = client_for(url);

        let reading = client.current(10.0, 20.0);
        assert_eq!(reading.fire_index, 2.0);
        assert_eq!(reading.wind_speed, 0.0);
        assert_eq!(reading.humidity, 0.0);
        server.join().unwrap();
    }

    #[test]
    fn test_error_status_falls_back() {
        let (url, server) = serve_once("500 Internal Server Error", r#"{"message": "boom"}"#);
        let client = client_for(url);

        assert!(matches!(
            client.fetch_realtime(1.0, 2.0),
            Err(WeatherError::Status(s)) if s.as_u16() == 500
        ));
        server.join().unwrap();
    }

    #[test]
    fn test_unauthorized_returns_fallback_reading() {
        let (url, server) = serve_once("401 Unauthorized", "{}");
        let client = client_for(url);

        assert_eq!(client.current(1.0, 2.0), WeatherReading::fallback());
        server.join().unwrap();
    }

    #[test]
    fn test_malformed_body_returns_fallback_reading() {
        let (url, server) = serve_once("200 OK", "not json");
        let client = client_for(url);

        assert_eq!(client.current(1.0, 2.0), WeatherReading::fallback());
        server.join().unwrap();
    }

    #[test]
    fn test_connection_refused_returns_fallback_reading() {
        let client = client_for(closed_port_url());

        assert!(matches!(client.fetch_realtime(1.0, 2.0), Err(WeatherError::Request(_))));
        assert_eq!(client.current(1.0, 2.0), WeatherReading::fallback());
    }

    #[test]
    fn test_forecast_parses_hourly_timeline() {
        let body = r#"{"timelines": {"hourly": [
            {"time": "2025-01-31T21:00:00Z", "values": {"fireIndex": 2.0, "windSpeed": 8.0,
             "temperature": 27.0, "humidity": 35.0, "precipitationIntensity": 0.0}},
            {"time": "2025-01-31T22:00:00Z", "values": {"windSpeed": 9.5}}
        ]}}"#;
        let (url, server) = serve_once("200 OK", body);
        let client = client_for(url);

        let points = client.fetch_forecast(36.1699, -115.1398, 72).unwrap();
        assert_eq!(points.len(), 2);
        assert_eq!(points[0].weather.fire_index, 2.0);
        assert_eq!(points[0].timestamp.to_rfc3339(), "2025-01-31T21:00:00+00:00");

        // Missing forecast fields take the fallback values
        assert_eq!(points[1].weather.wind_speed, 9.5);
        assert_eq!(points[1].weather.fire_index, 1.0);
        assert_eq!(points[1].weather.temperature, 20.0);
        assert_eq!(points[1].weather.humidity, 50.0);

        let request = server.join().unwrap();
        assert!(request.starts_with("GET /weather/forecast?"), "{}", request);
        assert!(request.contains("timesteps=1h"));
        assert!(request.contains("endTime=nowPlus72h"));
    }

    #[test]
    fn test_forecast_without_timelines_is_empty() {
        let (url, server) = serve_once("200 OK", "{}");
        let client = client_for(url);

        assert!(client.fetch_forecast(1.0, 2.0, 72).unwrap().is_empty());
        server.join().unwrap();
    }

    #[test]
    fn test_forecast_failure_uses_sample_forecast() {
        let client = client_for(closed_port_url());

        let points = client.forecast(1.0, 2.0, 12);
        assert_eq!(points.len(), 12);
        assert_eq!(points[0].weather.humidity, 80.0);
        assert_eq!(points[0].weather.precipitation, 0.1);
    }
}
