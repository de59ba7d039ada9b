//! Decoding of already-fetched weather documents into engine inputs.
//!
//! Supported shapes: the NWS gridpoint forecast, NWS active alerts and the
//! Open-Meteo daily archive. Nothing here performs I/O.

use log::{debug, warn};
use serde::Deserialize;
use time::{format_description::well_known::Rfc3339, macros::format_description, Date, OffsetDateTime};

use crate::{AlertSeverity, Error, ForecastPeriod, HistoricalWeatherDay, WeatherAlert};

const MM_PER_INCH: f64 = 25.4;

/// Length units used by NWS quantitative values
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WmoUnit {
    Millimeters,
    Centimeters,
    Meters,
    Inches,
}

impl WmoUnit {
    /// Parse a `wmoUnit:*` code; unknown codes yield `None`.
    pub fn from_code(code: &str) -> Option<Self> {
        match code.trim_start_matches("wmoUnit:") {
            "mm" => Some(WmoUnit::Millimeters),
            "cm" => Some(WmoUnit::Centimeters),
            "m" => Some(WmoUnit::Meters),
            "in" => Some(WmoUnit::Inches),
            _ => None,
        }
    }

    pub fn to_inches(self, value: f64) -> f64 {
        match self {
            WmoUnit::Millimeters => value / MM_PER_INCH,
            WmoUnit::Centimeters => value * 10.0 / MM_PER_INCH,
            WmoUnit::Meters => value * 1000.0 / MM_PER_INCH,
            WmoUnit::Inches => value,
        }
    }
}

pub fn celsius_to_fahrenheit(celsius: f64) -> f64 {
    celsius * 9.0 / 5.0 + 32.0
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuantitativeValue {
    #[serde(default)]
    pub unit_code: String,
    #[serde(default)]
    pub value: Option<f64>,
}

impl QuantitativeValue {
    /// The value in inches, if both the value and its unit are known
    pub fn inches(&self) -> Option<f64> {
        let value = self.value.filter(|v| v.is_finite())?;
        let unit = WmoUnit::from_code(&self.unit_code)?;
        Some(unit.to_inches(value).max(0.0))
    }
}

/// NWS publishes temperature either as a bare number with a separate unit
/// field, or as a quantitative value.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum NwsTemperature {
    Plain(f64),
    Quantity(QuantitativeValue),
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NwsPeriod {
    #[serde(default)]
    pub name: String,
    pub start_time: String,
    pub end_time: String,
    pub is_daytime: bool,
    pub temperature: Option<NwsTemperature>,
    #[serde(default)]
    pub temperature_unit: Option<String>,
    #[serde(default)]
    pub probability_of_precipitation: Option<QuantitativeValue>,
    #[serde(default)]
    pub short_forecast: String,
    #[serde(default)]
    pub detailed_forecast: String,
    #[serde(default)]
    pub snowfall_amount: Option<QuantitativeValue>,
    #[serde(default)]
    pub ice_accumulation: Option<QuantitativeValue>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NwsForecastProperties {
    #[serde(default)]
    pub periods: Vec<NwsPeriod>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NwsForecast {
    pub properties: NwsForecastProperties,
}

fn parse_timestamp(field: &str, raw: &str) -> Result<OffsetDateTime, Error> {
    OffsetDateTime::parse(raw, &Rfc3339)
        .map_err(|e| Error::Payload(format!("error parsing {}: {} {:?}", field, e, raw)))
}

impl NwsPeriod {
    fn temperature_f(&self) -> Option<f64> {
        let (value, unit) = match self.temperature.as_ref()? {
            NwsTemperature::Plain(value) => (*value, self.temperature_unit.clone().unwrap_or_default()),
            NwsTemperature::Quantity(quantity) => (quantity.value?, quantity.unit_code.clone()),
        };
        let celsius = matches!(unit.as_str(), "C" | "wmoUnit:degC");
        Some(if celsius { celsius_to_fahrenheit(value) } else { value })
    }
}

impl TryFrom<NwsPeriod> for ForecastPeriod {
    type Error = Error;
    fn try_from(val: NwsPeriod) -> Result<Self, Self::Error> {
        let temperature_f = val
            .temperature_f()
            .filter(|t| t.is_finite())
            .ok_or_else(|| Error::Payload(format!("period {:?} has no temperature", val.name)))?;
        let precip_probability_pct = val
            .probability_of_precipitation
            .as_ref()
            .and_then(|p| p.value)
            .filter(|v| v.is_finite())
            .map(|v| v.clamp(0.0, 100.0).round() as u8);

        Ok(ForecastPeriod {
            start_time: parse_timestamp("startTime", &val.start_time)?,
            end_time: parse_timestamp("endTime", &val.end_time)?,
            is_daytime: val.is_daytime,
            temperature_f: temperature_f.round() as i32,
            precip_probability_pct,
            snowfall_inches: val.snowfall_amount.as_ref().and_then(QuantitativeValue::inches),
            ice_inches: val.ice_accumulation.as_ref().and_then(QuantitativeValue::inches),
            short_forecast: val.short_forecast,
            detailed_forecast: val.detailed_forecast,
            name: val.name,
        })
    }
}

/// Periods from an NWS forecast document, in order.
pub fn parse_nws_forecast(json: &str) -> Result<Vec<ForecastPeriod>, Error> {
    let forecast: NwsForecast = serde_json::from_str(json)?;
    let periods = forecast
        .properties
        .periods
        .into_iter()
        .map(ForecastPeriod::try_from)
        .collect::<Result<Vec<_>, _>>()?;
    debug!("decoded {} forecast periods", periods.len());
    Ok(periods)
}

#[derive(Debug, Clone, Deserialize)]
pub struct NwsAlertProperties {
    #[serde(default)]
    pub event: String,
    #[serde(default)]
    pub headline: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub onset: Option<String>,
    #[serde(default)]
    pub expires: Option<String>,
    #[serde(default)]
    pub ends: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NwsAlertFeature {
    pub properties: NwsAlertProperties,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NwsAlerts {
    #[serde(default)]
    pub features: Vec<NwsAlertFeature>,
}

/// Unreadable alert times are dropped rather than rejecting the alert.
fn optional_timestamp(field: &str, raw: Option<&str>) -> Option<OffsetDateTime> {
    let raw = raw?;
    match OffsetDateTime::parse(raw, &Rfc3339) {
        Ok(parsed) => Some(parsed),
        Err(e) => {
            warn!("ignoring alert {}: {} {:?}", field, e, raw);
            None
        }
    }
}

impl From<NwsAlertProperties> for WeatherAlert {
    fn from(val: NwsAlertProperties) -> Self {
        WeatherAlert {
            severity: AlertSeverity::classify(&val.event),
            onset: optional_timestamp("onset", val.onset.as_deref()),
            expires: optional_timestamp("expires", val.expires.as_deref()),
            ends: optional_timestamp("ends", val.ends.as_deref()),
            headline: val.headline.unwrap_or_default(),
            description: val.description.unwrap_or_default(),
            event_type: val.event,
        }
    }
}

/// Winter-related alerts from an NWS alerts document.
pub fn parse_nws_alerts(json: &str) -> Result<Vec<WeatherAlert>, Error> {
    let document: NwsAlerts = serde_json::from_str(json)?;
    let alerts: Vec<WeatherAlert> = document
        .features
        .into_iter()
        .map(|feature| WeatherAlert::from(feature.properties))
        .filter(WeatherAlert::is_winter_related)
        .collect();
    for alert in &alerts {
        debug!("alert {} ({})", alert.event_type, alert.severity);
    }
    Ok(alerts)
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct OpenMeteoDailyUnits {
    #[serde(default)]
    pub snowfall_sum: Option<String>,
    #[serde(default)]
    pub temperature_2m_max: Option<String>,
    #[serde(default)]
    pub precipitation_sum: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OpenMeteoDaily {
    pub time: Vec<String>,
    #[serde(default)]
    pub snowfall_sum: Vec<Option<f64>>,
    #[serde(default)]
    pub temperature_2m_max: Vec<Option<f64>>,
    #[serde(default)]
    pub temperature_2m_min: Vec<Option<f64>>,
    #[serde(default)]
    pub precipitation_sum: Vec<Option<f64>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OpenMeteoArchive {
    pub daily: OpenMeteoDaily,
    #[serde(default)]
    pub daily_units: OpenMeteoDailyUnits,
}

/// Conversion to inches for an Open-Meteo length unit. The archive is
/// normally requested in inches, which is also assumed when no unit is given.
fn open_meteo_length(unit: Option<&str>) -> fn(f64) -> f64 {
    match unit {
        Some("cm") => |v| v * 10.0 / MM_PER_INCH,
        Some("mm") => |v| v / MM_PER_INCH,
        _ => |v| v,
    }
}

fn open_meteo_temperature(unit: Option<&str>) -> fn(f64) -> f64 {
    match unit {
        Some("°C") => celsius_to_fahrenheit,
        _ => |v| v,
    }
}

impl TryFrom<OpenMeteoArchive> for Vec<HistoricalWeatherDay> {
    type Error = Error;
    fn try_from(val: OpenMeteoArchive) -> Result<Self, Self::Error> {
        let daily = val.daily;
        let days = daily.time.len();
        let columns = [
            ("snowfall_sum", daily.snowfall_sum.len()),
            ("temperature_2m_max", daily.temperature_2m_max.len()),
            ("temperature_2m_min", daily.temperature_2m_min.len()),
            ("precipitation_sum", daily.precipitation_sum.len()),
        ];
        if let Some((name, len)) = columns.iter().find(|(_, len)| *len != days) {
            return Err(Error::Payload(format!(
                "daily.{} has {} entries but daily.time has {}",
                name, len, days
            )));
        }

        let snow = open_meteo_length(val.daily_units.snowfall_sum.as_deref());
        let precip = open_meteo_length(val.daily_units.precipitation_sum.as_deref());
        let temp = open_meteo_temperature(val.daily_units.temperature_2m_max.as_deref());
        let date_format = format_description!("[year]-[month]-[day]");
        let value = |column: &[Option<f64>], i: usize| -> f64 {
            column.get(i).copied().flatten().filter(|v| v.is_finite()).unwrap_or(0.0)
        };

        daily
            .time
            .iter()
            .enumerate()
            .map(|(i, raw)| -> Result<HistoricalWeatherDay, Error> {
                let date = Date::parse(raw, &date_format)
                    .map_err(|e| Error::Payload(format!("error parsing daily.time: {} {:?}", e, raw)))?;
                Ok(HistoricalWeatherDay {
                    date,
                    snowfall_inches: snow(value(&daily.snowfall_sum, i)),
                    temp_max: temp(value(&daily.temperature_2m_max, i)),
                    temp_min: temp(value(&daily.temperature_2m_min, i)),
                    precipitation: precip(value(&daily.precipitation_sum, i)),
                })
            })
            .collect()
    }
}

/// Observed days from an Open-Meteo archive document.
pub fn parse_open_meteo_history(json: &str) -> Result<Vec<HistoricalWeatherDay>, Error> {
    let archive: OpenMeteoArchive = serde_json::from_str(json)?;
    let history = Vec::<HistoricalWeatherDay>::try_from(archive)?;
    debug!("decoded {} historical days", history.len());
    Ok(history)
}
