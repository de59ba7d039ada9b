use std::fs;
use std::path::Path;

use anyhow::{anyhow, Context};
use clap::{Parser, ValueEnum};
use log::{debug, info};
use snowday_core::{find_config_file, load_config, ConfigSource, CONFIG_ENV_VAR, CONFIG_FILENAME};
use snowday_engine::{
    parse_nws_alerts, parse_nws_forecast, parse_open_meteo_history, ForecastRequest,
    GeographyContext,
};

#[derive(Parser, Clone, Debug, serde::Deserialize, Default)]
#[command(
    author,
    version,
    about = "Snowday - school closure and delay chances from a winter forecast"
)]
pub struct Cli {
    /// Path to config file (TOML format)
    /// Searched in order: this flag, $SNOWDAY_CONFIG, ./snowday.toml,
    /// $XDG_CONFIG_HOME/snowday/snowday.toml, /etc/snowday/snowday.toml
    #[arg(short, long)]
    #[serde(skip)]
    pub config: Option<String>,

    /// Log level: trace, debug, info, warn, error
    #[arg(short, long, env = "SNOWDAY_LEVEL")]
    pub level: Option<String>,

    /// Engine bundle (geography, periods, history, alerts) as JSON
    #[arg(short, long, env = "SNOWDAY_BUNDLE")]
    pub bundle: Option<String>,

    /// NWS gridpoint forecast JSON
    #[arg(short, long, env = "SNOWDAY_FORECAST")]
    pub forecast: Option<String>,

    /// NWS active alerts JSON
    #[arg(short, long, env = "SNOWDAY_ALERTS")]
    pub alerts: Option<String>,

    /// Open-Meteo daily archive JSON for the last few days
    #[arg(long, env = "SNOWDAY_HISTORY")]
    pub history: Option<String>,

    /// Two-letter state shown alongside each day
    #[arg(long, env = "SNOWDAY_STATE")]
    pub state: Option<String>,

    #[arg(long, env = "SNOWDAY_LATITUDE", allow_negative_numbers = true)]
    pub latitude: Option<f64>,

    #[arg(long, env = "SNOWDAY_LONGITUDE", allow_negative_numbers = true)]
    pub longitude: Option<f64>,

    /// Average annual snowfall in inches; estimated from latitude when absent
    #[arg(long, env = "SNOWDAY_AVG_SNOWFALL")]
    pub avg_snowfall: Option<f64>,

    /// Output format
    #[arg(long, value_enum, env = "SNOWDAY_FORMAT")]
    pub format: Option<OutputFormat>,
}

#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Json,
    #[default]
    Table,
}

impl Cli {
    pub fn format(&self) -> OutputFormat {
        self.format.unwrap_or_default()
    }

    pub fn state(&self) -> String {
        self.state.clone().unwrap_or_default()
    }

    /// Geography from the location flags
    pub fn geography(&self) -> Result<GeographyContext, anyhow::Error> {
        let (latitude, longitude) = match (self.latitude, self.longitude) {
            (Some(lat), Some(lon)) => (lat, lon),
            _ => return Err(anyhow!("--latitude and --longitude are required without --bundle")),
        };
        let geography = match self.avg_snowfall {
            Some(snowfall) => GeographyContext::new(self.state(), latitude, longitude, snowfall),
            None => {
                let estimated = GeographyContext::from_latitude(self.state(), latitude, longitude);
                info!(
                    "no average snowfall given, estimated {:.1}in from latitude {}",
                    estimated.avg_annual_snowfall, latitude
                );
                estimated
            }
        };
        Ok(geography)
    }
}

/// Load configuration from CLI args, config file, and environment
pub fn get_config_info() -> Result<Cli, anyhow::Error> {
    merge_config(Cli::parse())
}

fn merge_config(cli_args: Cli) -> Result<Cli, anyhow::Error> {
    let source = if let Some(ref path) = cli_args.config {
        ConfigSource::Explicit(path.into())
    } else {
        find_config_file(CONFIG_ENV_VAR, CONFIG_FILENAME)
    };

    let file_config: Cli = load_config(&source)?;

    // CLI args override file config (env vars are handled by clap)
    Ok(Cli {
        config: cli_args.config,
        level: cli_args.level.or(file_config.level),
        bundle: cli_args.bundle.or(file_config.bundle),
        forecast: cli_args.forecast.or(file_config.forecast),
        alerts: cli_args.alerts.or(file_config.alerts),
        history: cli_args.history.or(file_config.history),
        state: cli_args.state.or(file_config.state),
        latitude: cli_args.latitude.or(file_config.latitude),
        longitude: cli_args.longitude.or(file_config.longitude),
        avg_snowfall: cli_args.avg_snowfall.or(file_config.avg_snowfall),
        format: cli_args.format.or(file_config.format),
    })
}

fn read_file(kind: &str, path: &str) -> Result<String, anyhow::Error> {
    debug!("reading {} from {}", kind, path);
    fs::read_to_string(Path::new(path)).with_context(|| format!("error reading {} file {}", kind, path))
}

/// Assemble the engine input from either a bundle or separate documents.
pub fn load_request(cli: &Cli) -> Result<ForecastRequest, anyhow::Error> {
    if let Some(bundle) = cli.bundle.as_ref() {
        let raw = read_file("bundle", bundle)?;
        let mut request: ForecastRequest =
            serde_json::from_str(&raw).with_context(|| format!("error parsing bundle {}", bundle))?;
        if let Some(state) = cli.state.as_ref() {
            request.geography.state = state.clone();
        }
        return Ok(request);
    }

    let forecast = cli
        .forecast
        .as_ref()
        .ok_or_else(|| anyhow!("either --bundle or --forecast must be given"))?;
    let geography = cli.geography()?;
    let periods = parse_nws_forecast(&read_file("forecast", forecast)?)
        .with_context(|| format!("error decoding forecast {}", forecast))?;

    let alerts = match cli.alerts.as_ref() {
        Some(path) => parse_nws_alerts(&read_file("alerts", path)?)
            .with_context(|| format!("error decoding alerts {}", path))?,
        None => Vec::new(),
    };
    let history = match cli.history.as_ref() {
        Some(path) => parse_open_meteo_history(&read_file("history", path)?)
            .with_context(|| format!("error decoding history {}", path))?,
        None => Vec::new(),
    };

    Ok(ForecastRequest {
        geography,
        periods,
        history,
        alerts,
    })
}
