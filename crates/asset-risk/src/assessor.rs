//! Portfolio assessment
//!
//! Walks the portfolio in order, one blocking weather fetch per asset. The
//! provider absorbs fetch failures, so every asset always yields an
//! assessment.

use crate::animation::ForecastAnimation;
use crate::config::RunConfig;
use crate::export;
use crate::{Asset, Portfolio, Result, RiskAssessment};
use chrono::Utc;
use fire_weather::{TomorrowIoClient, WeatherProvider};
use std::path::PathBuf;
use tracing::info;

/// Scores every asset of a portfolio against one weather provider
pub struct Assessor<P: WeatherProvider> {
    provider: P,
    portfolio: Portfolio,
}

impl<P: WeatherProvider> Assessor<P> {
    pub fn new(provider: P, portfolio: Portfolio) -> Self {
        Self {
            provider,
            portfolio,
        }
    }

    /// Fetch current weather for one asset and score it
    pub fn assess_asset(&self, asset: &Asset) -> RiskAssessment {
        info!("Assessing risk for {}...", asset.name);

        let weather = self.provider.current(asset.lat, asset.lon);
        RiskAssessment::evaluate(asset.clone(), weather)
    }

    /// Assess all assets in portfolio order
    pub fn assess_all(&self) -> Vec<RiskAssessment> {
        self.portfolio
            .iter()
            .map(|asset| self.assess_asset(asset))
            .collect()
    }

    /// Score the 72-hour forecast of every asset into animation frames
    pub fn forecast_animation(&self) -> ForecastAnimation {
        ForecastAnimation::build(&self.provider, &self.portfolio)
    }
}

/// Files and results produced by one run
#[derive(Debug)]
pub struct RunOutcome {
    pub assessments: Vec<RiskAssessment>,
    pub output: PathBuf,
    pub forecast_output: Option<PathBuf>,
}

/// Assess the configured portfolio against Tomorrow.io and write the outputs
pub fn run(config: &RunConfig) -> Result<RunOutcome> {
    let portfolio = config.portfolio()?;
    let client = TomorrowIoClient::new(config.weather_config())?;

    run_with(client, portfolio, config)
}

/// Assess `portfolio` with any provider and write the configured outputs
///
/// Nothing is written unless every configured document can be written.
pub fn run_with<P: WeatherProvider>(
    provider: P,
    portfolio: Portfolio,
    config: &RunConfig,
) -> Result<RunOutcome> {
    info!("Starting weather risk assessment...");
    let assessor = Assessor::new(provider, portfolio);

    let assessments = assessor.assess_all();
    info!("Assessed {} assets", assessments.len());

    let generated_at = Utc::now();
    let current = export::to_feature_collection(&assessments, generated_at);

    let forecast = config.forecast_output.as_deref().map(|path| {
        let animation = assessor.forecast_animation();
        info!("Built forecast animation ({} frames)", animation.frame_count());
        (path, animation.to_feature_collection(generated_at))
    });

    let mut outputs = vec![(config.output.as_path(), &current)];
    if let Some((path, collection)) = &forecast {
        outputs.push((*path, collection));
    }
    export::write_all(&outputs)?;

    info!("Risk data saved to {:?}", config.output);
    if let Some((path, _)) = &forecast {
        info!("Forecast animation saved to {:?}", path);
    }

    Ok(RunOutcome {
        assessments,
        output: config.output.clone(),
        forecast_output: forecast.map(|(path, _)| path.to_path_buf()),
    })
}

/// One console line per assessment: `name: Risk Score 11.5 (low)`
pub fn summary_lines(assessments: &[RiskAssessment]) -> Vec<String> {
    assessments
        .iter()
        .map(|a| {
            format!(
                "{}: Risk Score {:.1} ({})",
                a.asset.name, a.risk_score, a.risk_level
            )
        })
        .collect()
}
