use log::debug;
use serde::Serialize;

use crate::{
    effective_snow, mentions_ice, strongest_alert_on, AlertSeverity, ForecastDay, GeographyContext,
    PeriodAmounts, WeatherAlert, MAX_PERCENT,
};

const LADDER_HEAVY: f64 = 70.0;
const LADDER_PLAIN: f64 = 25.0;
const LADDER_CHANCE: f64 = 15.0;
const LADDER_SLIGHT_CHANCE: f64 = 5.0;
const LADDER_SHOWERS: f64 = 10.0;

const LADDER_MAX_DELAY: f64 = 85.0;

const WINTER_WORDS: [&str; 5] = ["snow", "blizzard", "freezing rain", "sleet", "wintry mix"];

/// Closure and delay chances for one day, already rounded and bounded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ClosureOdds {
    pub closure_pct: u8,
    pub delay_pct: u8,
}

impl ClosureOdds {
    pub const ZERO: ClosureOdds = ClosureOdds {
        closure_pct: 0,
        delay_pct: 0,
    };

    /// Rounds and bounds `closure`, then derives the delay from the rounded
    /// value so both numbers agree with what is displayed.
    pub fn from_closure(closure: f64, delay_for: impl Fn(f64) -> f64) -> Self {
        let closure_pct = bounded_percent(closure);
        let delay_pct = bounded_percent(delay_for(f64::from(closure_pct)));
        Self {
            closure_pct,
            delay_pct,
        }
    }
}

/// Round to a whole percentage inside `[0, MAX_PERCENT]`; NaN reads as 0.
pub fn bounded_percent(value: f64) -> u8 {
    if value.is_nan() {
        return 0;
    }
    value.clamp(0.0, MAX_PERCENT).round() as u8
}

/// Delay chance implied by a closure chance.
///
/// A near-certain closure leaves little room for a delay, a borderline one
/// makes a delay the likely hedge, and a weak signal scales up into a delay.
pub fn closure_to_delay(closure: f64) -> f64 {
    if closure >= 80.0 {
        (20.0 - (closure - 80.0)).max(5.0)
    } else if closure >= 40.0 {
        50.0 - (closure - 40.0) / 2.0
    } else {
        (closure * 2.0).min(75.0)
    }
}

/// Extra closure weight for cold mornings.
pub fn temp_factor(temperature_f: i32) -> f64 {
    if temperature_f < 20 {
        1.3
    } else if temperature_f < 25 {
        1.15
    } else {
        1.0
    }
}

/// Everything the direct scorer reads about one forecast day.
#[derive(Debug, Clone, PartialEq)]
pub struct DayConditions {
    pub amounts: PeriodAmounts,
    pub temperature_f: i32,
    pub precip_pct: Option<u8>,
    /// Lowercased detailed and short text of the day's own period
    pub text: String,
}

impl DayConditions {
    pub fn from_day(day: &ForecastDay<'_>, amounts: PeriodAmounts) -> Self {
        Self {
            amounts,
            temperature_f: day.period.temperature_f,
            precip_pct: day.precip_pct(),
            text: day.period.text_lower(),
        }
    }

    /// Whether the day shows any sign of winter weather at all
    pub fn has_winter_evidence(&self) -> bool {
        self.amounts.has_signal()
            || WINTER_WORDS.iter().any(|w| self.text.contains(w))
            || mentions_ice(&self.text)
    }

    /// Strongest alert covering `date`, counted only on wintry days
    pub fn alert_on(&self, alerts: &[WeatherAlert], date: time::Date) -> AlertSeverity {
        if self.has_winter_evidence() {
            strongest_alert_on(alerts, date)
        } else {
            AlertSeverity::None
        }
    }
}

/// Score the conditions forecast for the day itself.
///
/// Written or published amounts drive a threshold ratio discounted by the
/// precipitation chance. Days without them fall back to a keyword ladder
/// for snow and to the keyword ice estimate, whichever is stronger.
pub fn score_direct(
    conditions: &DayConditions,
    geography: &GeographyContext,
    alert: AlertSeverity,
) -> ClosureOdds {
    let threshold = geography.closure_threshold_inches();
    let bonus = alert.closure_bonus();

    let amount_closure = explicit_closure(conditions, threshold).max(keyword_ice_closure(conditions, threshold));
    let ladder = if conditions.amounts.snow.is_explicit() {
        0.0
    } else {
        ladder_closure(conditions, geography.preparedness_index())
    };

    let odds = if amount_closure > 0.0 && amount_closure >= ladder {
        ClosureOdds::from_closure(amount_closure + bonus, closure_to_delay)
    } else {
        ClosureOdds::from_closure(ladder + bonus, |closure| {
            (closure * 2.5).min(LADDER_MAX_DELAY)
        })
    };

    debug!(
        "direct: amount {:.1}%, ladder {:.1}%, alert {} -> closure {}%, delay {}%",
        amount_closure, ladder, alert, odds.closure_pct, odds.delay_pct
    );
    odds
}

fn ratio_closure(effective: f64, temperature_f: i32, threshold: f64) -> f64 {
    if effective <= 0.0 || threshold <= 0.0 {
        return 0.0;
    }
    let ratio = effective * temp_factor(temperature_f) / threshold;
    (ratio * 100.0).min(100.0)
}

fn explicit_closure(conditions: &DayConditions, threshold: f64) -> f64 {
    let amounts = &conditions.amounts;
    let snow = if amounts.snow.is_explicit() { amounts.snow.inches } else { 0.0 };
    let ice = if amounts.ice.is_explicit() { amounts.ice.inches } else { 0.0 };
    // An absent probability does not discount a stated amount
    let confidence = conditions
        .precip_pct
        .map_or(1.0, |pct| f64::from(pct.min(100)) / 100.0);

    ratio_closure(effective_snow(snow, ice), conditions.temperature_f, threshold) * confidence
}

/// Keyword ice estimates are already scaled by precipitation chance.
fn keyword_ice_closure(conditions: &DayConditions, threshold: f64) -> f64 {
    let ice = &conditions.amounts.ice;
    if ice.is_explicit() {
        return 0.0;
    }
    ratio_closure(effective_snow(0.0, ice.inches), conditions.temperature_f, threshold)
}

fn ladder_closure(conditions: &DayConditions, preparedness: f64) -> f64 {
    let base = keyword_ladder(&conditions.text);
    let confidence = f64::from(conditions.precip_pct.unwrap_or(0).min(100)) / 100.0;
    base / (1.0 + preparedness * 5.0) * confidence
}

/// Base closure chance for snow wording with no amount attached.
pub fn keyword_ladder(text_lower: &str) -> f64 {
    if text_lower.contains("heavy snow") || text_lower.contains("blizzard") {
        LADDER_HEAVY
    } else if !text_lower.contains("snow") {
        0.0
    } else if text_lower.contains("slight chance") {
        LADDER_SLIGHT_CHANCE
    } else if text_lower.contains("snow showers") {
        LADDER_SHOWERS
    } else if text_lower.contains("chance") {
        LADDER_CHANCE
    } else {
        LADDER_PLAIN
    }
}
