//! Asset Fire-Weather Risk CLI
//!
//! Scores the asset portfolio against Tomorrow.io weather and writes the
//! GeoJSON layer for the map client.
//!
//! Usage:
//!   TOMORROW_IO_API_KEY=... assess-risk --output client/public/risk_data.geojson \
//!                                       --forecast

use anyhow::Result;
use asset_risk::assessor;
use asset_risk::config::{resolve_api_key, DEFAULT_FORECAST_OUTPUT, DEFAULT_OUTPUT};
use asset_risk::{summary_lines, RunConfig, API_KEY_ENV};
use clap::Parser;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[derive(Parser, Debug)]
#[command(
    name = "assess-risk",
    about = "Assess fire-weather risk for insured assets and export GeoJSON"
)]
struct Args {
    /// Tomorrow.io API key
    #[arg(long, env = API_KEY_ENV, hide_env_values = true)]
    api_key: Option<String>,

    /// Output GeoJSON file
    #[arg(short, long, default_value = DEFAULT_OUTPUT)]
    output: PathBuf,

    /// JSON asset list (defaults to the built-in sample portfolio)
    #[arg(short, long)]
    portfolio: Option<PathBuf>,

    /// Also write the 72-hour forecast animation
    #[arg(long)]
    forecast: bool,

    /// Forecast animation output file
    #[arg(long, default_value = DEFAULT_FORECAST_OUTPUT)]
    forecast_output: PathBuf,

    /// Override the Tomorrow.io API base URL
    #[arg(long)]
    base_url: Option<String>,

    /// Realtime request timeout in seconds
    #[arg(long)]
    timeout_secs: Option<u64>,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging; RUST_LOG wins over --verbose
    let level = if args.verbose { "debug" } else { "info" };
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)))
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    // clap has already folded the environment variable into --api-key
    let api_key = resolve_api_key(args.api_key, None)?;
    let mut config = RunConfig::new(api_key).with_output(args.output);
    if args.forecast {
        config = config.with_forecast_output(args.forecast_output);
    }
    if let Some(path) = args.portfolio {
        config = config.with_portfolio_path(path);
    }
    if let Some(base_url) = args.base_url {
        config = config.with_base_url(base_url);
    }
    if let Some(timeout) = args.timeout_secs {
        config.timeout_sec = timeout;
    }

    if !config.uses_default_endpoint() {
        info!("Using weather endpoint {}", config.base_url);
    }

    let outcome = assessor::run(&config)?;

    println!("\nRisk assessment complete:");
    for line in summary_lines(&outcome.assessments) {
        println!("  {}", line);
    }
    println!("\nRisk data saved to {}", outcome.output.display());
    if let Some(path) = &outcome.forecast_output {
        println!("Forecast animation saved to {}", path.display());
    }

    Ok(())
}
