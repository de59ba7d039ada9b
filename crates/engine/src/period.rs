use serde::{Deserialize, Serialize};
use time::{Date, OffsetDateTime};

/// One named forecast period ("Tonight", "Monday", ...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastPeriod {
    pub name: String,
    #[serde(with = "time::serde::rfc3339")]
    pub start_time: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub end_time: OffsetDateTime,
    pub is_daytime: bool,
    pub temperature_f: i32,
    #[serde(default)]
    pub precip_probability_pct: Option<u8>,
    #[serde(default)]
    pub short_forecast: String,
    #[serde(default)]
    pub detailed_forecast: String,
    /// Snowfall published by the forecast source, already in inches
    #[serde(default)]
    pub snowfall_inches: Option<f64>,
    /// Ice accretion published by the forecast source, already in inches
    #[serde(default)]
    pub ice_inches: Option<f64>,
}

impl ForecastPeriod {
    pub fn date(&self) -> Date {
        self.start_time.date()
    }

    /// Detailed and short text, lowercased, for keyword matching
    pub fn text_lower(&self) -> String {
        format!("{} {}", self.detailed_forecast, self.short_forecast).to_lowercase()
    }

    /// Probability of precipitation as a 0..1 fraction; a missing value means
    /// no chance.
    pub fn precip_fraction(&self) -> f64 {
        f64::from(self.precip_probability_pct.unwrap_or(0).min(100)) / 100.0
    }
}

/// Observed weather for one past calendar day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoricalWeatherDay {
    #[serde(with = "crate::iso_date")]
    pub date: Date,
    pub snowfall_inches: f64,
    pub temp_max: f64,
    pub temp_min: f64,
    /// Liquid-equivalent precipitation in inches
    pub precipitation: f64,
}

/// A school-morning unit of the forecast: a period plus the night that
/// leads into it.
///
/// Night periods that are not followed by a daytime period stand alone and
/// are dated by the morning they end on.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ForecastDay<'a> {
    pub date: Date,
    pub period: &'a ForecastPeriod,
    pub night_before: Option<&'a ForecastPeriod>,
}

impl<'a> ForecastDay<'a> {
    fn daytime(period: &'a ForecastPeriod, night_before: Option<&'a ForecastPeriod>) -> Self {
        Self {
            date: period.date(),
            period,
            night_before,
        }
    }

    fn overnight(period: &'a ForecastPeriod) -> Self {
        Self {
            date: period.end_time.date(),
            period,
            night_before: None,
        }
    }

    /// Whether this unit produces an output record
    pub fn is_daytime(&self) -> bool {
        self.period.is_daytime
    }

    /// The paired periods in chronological order
    pub fn periods(&self) -> impl Iterator<Item = &'a ForecastPeriod> {
        self.night_before.into_iter().chain(std::iter::once(self.period))
    }

    /// Highest precipitation probability across the pair, if any was given
    pub fn precip_pct(&self) -> Option<u8> {
        self.periods()
            .filter_map(|p| p.precip_probability_pct)
            .max()
    }
}

/// Group an ordered period list into [`ForecastDay`]s, keeping every period.
pub fn pair_periods(periods: &[ForecastPeriod]) -> Vec<ForecastDay<'_>> {
    let mut days = Vec::with_capacity(periods.len() / 2 + 1);
    let mut pending_night: Option<&ForecastPeriod> = None;

    for period in periods {
        if period.is_daytime {
            days.push(ForecastDay::daytime(period, pending_night.take()));
        } else if let Some(unpaired) = pending_night.replace(period) {
            days.push(ForecastDay::overnight(unpaired));
        }
    }
    if let Some(unpaired) = pending_night {
        days.push(ForecastDay::overnight(unpaired));
    }
    days
}
