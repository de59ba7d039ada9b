use std::fmt;

use log::{debug, info};
use serde::{Deserialize, Serialize};
use time::Date;

use crate::{
    aftermath_for, build_ledger, describe_text_amount, extract_amounts, pair_periods,
    score_direct, Aftermath, ClosureOdds, DayConditions, Error, ForecastPeriod, GeographyContext,
    HistoricalWeatherDay, PeriodAmounts, WeatherAlert,
};

/// Most output records a run produces
pub const MAX_OUTPUT_DAYS: usize = 7;

/// Coarse wording for a percentage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ChanceLevel {
    VeryLow,
    Low,
    Moderate,
    High,
}

impl ChanceLevel {
    pub fn for_closure(pct: u8) -> Self {
        Self::banded(pct, [70, 40, 15])
    }

    pub fn for_delay(pct: u8) -> Self {
        Self::banded(pct, [60, 35, 15])
    }

    fn banded(pct: u8, [high, moderate, low]: [u8; 3]) -> Self {
        if pct >= high {
            ChanceLevel::High
        } else if pct >= moderate {
            ChanceLevel::Moderate
        } else if pct >= low {
            ChanceLevel::Low
        } else {
            ChanceLevel::VeryLow
        }
    }
}

impl fmt::Display for ChanceLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ChanceLevel::VeryLow => "Very Low",
            ChanceLevel::Low => "Low",
            ChanceLevel::Moderate => "Moderate",
            ChanceLevel::High => "High",
        };
        f.write_str(label)
    }
}

/// One output day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnowDayForecast {
    pub day_name: String,
    #[serde(with = "crate::iso_date")]
    pub date: Date,
    pub closure_pct: u8,
    pub delay_pct: u8,
    pub temperature: i32,
    pub forecast_text: String,
    pub precip_pct: Option<u8>,
    pub snowfall_display: Option<String>,
    pub is_aftermath_day: bool,
    pub days_since_event: Option<u32>,
    pub state: String,
}

impl SnowDayForecast {
    pub fn closure_level(&self) -> ChanceLevel {
        ChanceLevel::for_closure(self.closure_pct)
    }

    pub fn delay_level(&self) -> ChanceLevel {
        ChanceLevel::for_delay(self.delay_pct)
    }
}

/// Which score a day's output came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Side {
    Direct,
    Aftermath,
}

/// Pick the higher closure chance, carrying that side's delay. Ties go to
/// the direct forecast.
pub fn combine(direct: ClosureOdds, aftermath: Option<ClosureOdds>) -> (ClosureOdds, Side) {
    match aftermath {
        Some(carried) if carried.closure_pct > direct.closure_pct => (carried, Side::Aftermath),
        _ => (direct, Side::Direct),
    }
}

/// Label for the amount shown next to a day.
pub fn snowfall_display(amounts: &PeriodAmounts, detailed_forecast: &str) -> Option<String> {
    if amounts.snow.inches >= 0.1 {
        Some(format!("{:.1}\"", amounts.snow.inches))
    } else if amounts.ice.inches >= 0.01 {
        Some(format!("{:.2}\" ice", amounts.ice.inches))
    } else {
        describe_text_amount(detailed_forecast)
    }
}

/// Everything one engine run needs, as a single document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastRequest {
    pub geography: GeographyContext,
    pub periods: Vec<ForecastPeriod>,
    #[serde(default)]
    pub history: Vec<HistoricalWeatherDay>,
    #[serde(default)]
    pub alerts: Vec<WeatherAlert>,
}

impl ForecastRequest {
    pub fn run(&self) -> Result<Vec<SnowDayForecast>, Error> {
        forecast_snow_days(&self.periods, &self.geography, &self.history, &self.alerts)
    }
}

/// Closure and delay chances for up to [`MAX_OUTPUT_DAYS`] school days.
///
/// The ledger covers every period, nights and weekends included, and is
/// complete before any day looks back into it.
pub fn forecast_snow_days(
    periods: &[ForecastPeriod],
    geography: &GeographyContext,
    history: &[HistoricalWeatherDay],
    alerts: &[WeatherAlert],
) -> Result<Vec<SnowDayForecast>, Error> {
    if periods.is_empty() {
        return Err(Error::NoForecastPeriods);
    }
    geography.validate()?;

    let days = pair_periods(periods);
    let ledger = build_ledger(&days, history);
    info!(
        "scoring {} periods for {} ({} ledger events, {} alerts)",
        periods.len(),
        geography.state,
        ledger.len(),
        alerts.len()
    );

    let forecasts = days
        .iter()
        .filter(|day| day.is_daytime())
        .take(MAX_OUTPUT_DAYS)
        .map(|day| {
            let amounts = extract_amounts(day);
            let conditions = DayConditions::from_day(day, amounts);
            let direct = score_direct(&conditions, geography, conditions.alert_on(alerts, day.date));
            let aftermath = aftermath_for(day.date, &ledger, geography, alerts);
            let (odds, side) = combine(direct, aftermath.map(|a| a.odds));

            debug!(
                "{} {}: direct {}%/{}%, aftermath {:?} -> {:?}",
                day.period.name, day.date, direct.closure_pct, direct.delay_pct, aftermath, side
            );

            let days_since_event = match (side, aftermath) {
                (Side::Aftermath, Some(Aftermath { days_since, .. })) => Some(days_since),
                _ => None,
            };
            SnowDayForecast {
                day_name: day.period.name.clone(),
                date: day.date,
                closure_pct: odds.closure_pct,
                delay_pct: odds.delay_pct,
                temperature: day.period.temperature_f,
                forecast_text: day.period.short_forecast.clone(),
                precip_pct: day.precip_pct(),
                snowfall_display: snowfall_display(&amounts, &day.period.detailed_forecast),
                is_aftermath_day: side == Side::Aftermath,
                days_since_event,
                state: geography.state.clone(),
            }
        })
        .collect();

    Ok(forecasts)
}
