use std::collections::BTreeMap;

use log::debug;
use serde::Serialize;
use time::Date;

use crate::{
    effective_snow, extract_amounts, keyword_amounts, mentions_ice, AmountSource, ForecastDay,
    HistoricalWeatherDay, PeriodAmounts,
};

/// Minimum snowfall that makes a day a winter event
pub const SNOW_EVENT_INCHES: f64 = 1.0;
/// Minimum ice accretion that makes a day a (sticky) ice event
pub const ICE_EVENT_INCHES: f64 = 0.05;
/// Effective amount a keyword-only estimate must reach to be recorded
pub const KEYWORD_EVENT_INCHES: f64 = 0.5;
/// Liquid precipitation on a sub-freezing, snowless day treated as glaze
pub const GLAZE_PRECIP_INCHES: f64 = 0.05;

const FREEZING_F: f64 = 32.0;
const COLD_PERSISTENCE_SHARE: f64 = 0.70;

const STICKY_WORDS: [&str; 4] = ["freezing rain", "sleet", "wintry mix", "refreez"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum EventOrigin {
    Forecast,
    History,
}

/// A significant snow or ice day, keyed by calendar date.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WinterEvent {
    #[serde(with = "crate::iso_date")]
    pub date: Date,
    pub snow_inches: f64,
    pub ice_inches: f64,
    pub effective_amount_inches: f64,
    pub is_ice_event: bool,
    /// Ice or refreezing wording, which keeps roads bad for longer
    pub is_sticky: bool,
    /// Recorded from the low-confidence keyword estimate
    pub keyword_only: bool,
    pub origin: EventOrigin,
}

impl WinterEvent {
    fn new(date: Date, snow: f64, ice: f64, origin: EventOrigin) -> Self {
        let snow_inches = snow.max(0.0);
        let ice_inches = ice.max(0.0);
        let is_ice_event = ice_inches >= ICE_EVENT_INCHES;
        Self {
            date,
            snow_inches,
            ice_inches,
            effective_amount_inches: effective_snow(snow_inches, ice_inches),
            is_ice_event,
            is_sticky: is_ice_event,
            keyword_only: false,
            origin,
        }
    }

    fn sticky(mut self, sticky: bool) -> Self {
        self.is_sticky |= sticky;
        self
    }

    fn keyword_only(mut self) -> Self {
        self.keyword_only = true;
        self
    }
}

/// Winter events and daily high temperatures for one engine run.
///
/// Built in full before any aftermath lookup and never shared between runs.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WinterLedger {
    events: BTreeMap<Date, WinterEvent>,
    highs: BTreeMap<Date, f64>,
}

impl WinterLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `event`, replacing any event already on its date
    pub fn record(&mut self, event: WinterEvent) {
        debug!(
            "ledger {}: {:.2}in effective ({:?}{}{})",
            event.date,
            event.effective_amount_inches,
            event.origin,
            if event.is_ice_event { ", ice" } else { "" },
            if event.keyword_only { ", keyword" } else { "" },
        );
        self.events.insert(event.date, event);
    }

    pub fn get(&self, date: Date) -> Option<&WinterEvent> {
        self.events.get(&date)
    }

    /// Events strictly before `date`, most recent first
    pub fn events_before(&self, date: Date) -> impl Iterator<Item = &WinterEvent> {
        self.events.range(..date).rev().map(|(_, event)| event)
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn set_high(&mut self, date: Date, temperature_f: f64) {
        if temperature_f.is_finite() {
            self.highs.insert(date, temperature_f);
        }
    }

    pub fn high_on(&self, date: Date) -> Option<f64> {
        self.highs.get(&date).copied()
    }

    /// Whether at least 70% of the known highs from `from` through `to`
    /// stayed at or below freezing. No data means no.
    pub fn cold_persists(&self, from: Date, to: Date) -> bool {
        if from > to {
            return false;
        }
        let (known, cold) = self
            .highs
            .range(from..=to)
            .fold((0u32, 0u32), |(known, cold), (_, high)| {
                (known + 1, cold + u32::from(*high <= FREEZING_F))
            });
        known > 0 && f64::from(cold) / f64::from(known) >= COLD_PERSISTENCE_SHARE
    }
}

/// Freezing-rain, sleet or refreeze wording
pub fn looks_sticky(text_lower: &str) -> bool {
    STICKY_WORDS.iter().any(|w| text_lower.contains(w)) || mentions_ice(text_lower)
}

/// Build the ledger for a run.
///
/// History is written first so that a forecast for the same date replaces
/// it. Every forecast unit counts, including nights and weekends.
pub fn build_ledger(days: &[ForecastDay<'_>], history: &[HistoricalWeatherDay]) -> WinterLedger {
    let mut ledger = WinterLedger::new();

    for day in history {
        ledger.set_high(day.date, day.temp_max);
        if let Some(event) = history_event(day) {
            ledger.record(event);
        }
    }

    for day in days.iter().filter(|d| d.is_daytime()) {
        ledger.set_high(day.date, f64::from(day.period.temperature_f));
    }
    let daytime_dates: Vec<Date> = days.iter().filter(|d| d.is_daytime()).map(|d| d.date).collect();
    for day in days.iter().filter(|d| !d.is_daytime()) {
        if !daytime_dates.contains(&day.date) {
            ledger.set_high(day.date, f64::from(day.period.temperature_f));
        }
    }

    for day in days {
        if let Some(event) = forecast_event(day) {
            ledger.record(event);
        }
    }

    ledger
}

fn qualifies(amounts: &PeriodAmounts) -> bool {
    amounts.snow.inches >= SNOW_EVENT_INCHES || amounts.ice.inches >= ICE_EVENT_INCHES
}

fn forecast_event(day: &ForecastDay<'_>) -> Option<WinterEvent> {
    let text: String = day
        .periods()
        .map(|p| p.text_lower())
        .collect::<Vec<_>>()
        .join(" ");

    let amounts = extract_amounts(day);
    if qualifies(&amounts) {
        let event = WinterEvent::new(day.date, amounts.snow.inches, amounts.ice.inches, EventOrigin::Forecast);
        return Some(event.sticky(looks_sticky(&text)));
    }

    // A published zero is a statement that nothing will fall
    if amounts.snow.source == AmountSource::Structured {
        return None;
    }

    let estimate = keyword_amounts(day);
    (estimate.effective_inches() >= KEYWORD_EVENT_INCHES).then(|| {
        WinterEvent::new(day.date, estimate.snow.inches, estimate.ice.inches, EventOrigin::Forecast)
            .sticky(looks_sticky(&text))
            .keyword_only()
    })
}

fn history_event(day: &HistoricalWeatherDay) -> Option<WinterEvent> {
    let snow = if day.snowfall_inches.is_finite() { day.snowfall_inches.max(0.0) } else { 0.0 };
    let precip = if day.precipitation.is_finite() { day.precipitation.max(0.0) } else { 0.0 };
    let glaze = snow <= 0.0 && precip >= GLAZE_PRECIP_INCHES && day.temp_max <= FREEZING_F;
    let ice = if glaze { precip } else { 0.0 };

    (snow >= SNOW_EVENT_INCHES || ice >= ICE_EVENT_INCHES)
        .then(|| WinterEvent::new(day.date, snow, ice, EventOrigin::History))
}
