//! Carry-over impact of earlier winter events.
//!
//! Schools often stay closed or open late for days after a storm while
//! roads are cleared. For a target date every earlier ledger event inside
//! its horizon is turned into a decayed closure chance, and only the
//! strongest one is kept.

use log::{debug, trace};
use serde::Serialize;
use time::Date;

use crate::{
    bounded_percent, closure_to_delay, melt_factor, strongest_alert_on, AlertSeverity,
    ClosureOdds, GeographyContext, WeatherAlert, WinterEvent, WinterLedger, MAX_PERCENT,
};

const ICE_COLD_DECAY: f64 = 0.85;
const ICE_THAW_DECAY: f64 = 0.50;
const SNOW_DAY_MULTIPLIERS: [f64; 3] = [0.95, 0.90, 0.70];
const MINOR_EVENT_INCHES: f64 = 1.0;
const MAJOR_EVENT_INCHES: f64 = 6.0;
const ICE_MELT_COEFFICIENT: f64 = 0.7;
const SNOW_MELT_COEFFICIENT: f64 = 0.5;
const LATE_SNOW_DELAY_CAP: f64 = 50.0;

const MIN_HORIZON_DAYS: u32 = 2;
const MAX_HORIZON_DAYS: u32 = 5;

/// Carry-over from one event onto one target day, before alert bonuses.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct EventImpact {
    #[serde(with = "crate::iso_date")]
    pub event_date: Date,
    pub days_since: u32,
    pub closure: f64,
    pub is_ice: bool,
    /// More than six inches effective
    pub major: bool,
}

impl EventImpact {
    /// Delay chance implied by `closure` for this kind of event.
    pub fn delay_for(&self, closure: f64) -> f64 {
        if self.is_ice {
            return closure_to_delay(closure);
        }
        let multiplier = match self.days_since {
            0 | 1 => 0.90,
            2 | 3 => 0.85,
            _ => 3.0,
        };
        let mut delay = closure * multiplier;
        if self.major {
            delay *= 1.2;
        }
        if self.days_since >= 4 {
            delay = delay.min(LATE_SNOW_DELAY_CAP);
        }
        delay
    }
}

/// The aftermath result chosen for a target day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Aftermath {
    pub odds: ClosureOdds,
    #[serde(with = "crate::iso_date")]
    pub event_date: Date,
    pub days_since: u32,
}

/// Base closure chance from how far an event overshot the closure
/// threshold.
pub fn step_probability(ratio: f64) -> f64 {
    match ratio {
        r if r >= 2.5 => 98.0,
        r if r >= 2.0 => 95.0,
        r if r >= 1.5 => 85.0,
        r if r >= 1.0 => 70.0,
        r if r >= 0.75 => 50.0,
        _ => 30.0,
    }
}

/// Scalar 0..1 describing how disruptive an event was.
pub fn event_severity(event: &WinterEvent, geography: &GeographyContext, alerts: &[WeatherAlert]) -> f64 {
    let ratio = event.effective_amount_inches / geography.closure_threshold_inches();
    let mut severity = 0.55 * (event.effective_amount_inches / 12.0).clamp(0.0, 1.0)
        + 0.40 * (ratio / 2.5).clamp(0.0, 1.0);
    if event.is_sticky {
        severity += 0.20;
    }
    let alerted = alerts
        .iter()
        .any(|a| a.severity >= AlertSeverity::Watch && a.covers(event.date));
    if alerted {
        severity += 0.08;
    }
    severity.clamp(0.0, 1.0)
}

/// Horizon stretched by event severity, weak preparedness and lingering
/// cold or ice.
pub fn adjusted_horizon(preparedness: f64, severity: f64, cold_persists: bool, sticky: bool) -> u32 {
    let unprepared = (1.0 - preparedness).clamp(0.0, 1.0);
    let mut days = 2.0 + 2.2 * unprepared + 1.8 * severity;
    if cold_persists {
        days += 0.8;
    }
    if sticky {
        days += 0.9;
    }
    if unprepared >= 0.6 && severity >= 0.55 && (cold_persists || sticky) {
        days = days.max(3.4);
    }
    (days.round() as u32).clamp(MIN_HORIZON_DAYS, MAX_HORIZON_DAYS)
}

/// How many days after `event` the target may still feel it.
pub fn aftermath_horizon(
    event: &WinterEvent,
    target: Date,
    ledger: &WinterLedger,
    geography: &GeographyContext,
    alerts: &[WeatherAlert],
) -> u32 {
    let typical = geography.typical_closure_days();
    let cold = ledger.cold_persists(event.date, target);
    if !cold && !event.is_sticky {
        return typical;
    }
    let severity = event_severity(event, geography, alerts);
    typical.max(adjusted_horizon(
        geography.preparedness_index(),
        severity,
        cold,
        event.is_sticky,
    ))
}

/// Decayed closure chance `event` still carries on `target`, if it is
/// inside the horizon.
pub fn event_impact(
    event: &WinterEvent,
    target: Date,
    ledger: &WinterLedger,
    geography: &GeographyContext,
    alerts: &[WeatherAlert],
) -> Option<EventImpact> {
    let days_since = u32::try_from((target - event.date).whole_days()).ok()?;
    if days_since == 0 || days_since > aftermath_horizon(event, target, ledger, geography, alerts) {
        return None;
    }

    let preparedness = geography.preparedness_index();
    let ratio = event.effective_amount_inches / geography.closure_threshold_inches();
    let base = (step_probability(ratio) * (1.5 - preparedness)).min(100.0);
    let target_high = ledger.high_on(target);

    let (decayed, melt_coefficient) = if event.is_ice_event {
        let mut closure = (base * (1.5 + (1.0 - preparedness))).min(100.0);
        for offset in 1..=days_since {
            let high = event
                .date
                .checked_add(time::Duration::days(i64::from(offset)))
                .and_then(|day| if day == target { target_high } else { ledger.high_on(day) })
                .or(target_high);
            closure *= match high {
                Some(high) if high > 32.0 => ICE_THAW_DECAY,
                _ => ICE_COLD_DECAY,
            };
        }
        (closure, ICE_MELT_COEFFICIENT)
    } else {
        let multiplier = if event.effective_amount_inches < MINOR_EVENT_INCHES {
            if days_since == 1 {
                0.80
            } else {
                0.10
            }
        } else if days_since <= 3 {
            SNOW_DAY_MULTIPLIERS[days_since as usize - 1]
        } else {
            let tail = (1.0 - geography.aftermath_decay_rate()).powi(days_since as i32 - 3);
            SNOW_DAY_MULTIPLIERS[2] * tail
        };
        (base * multiplier, SNOW_MELT_COEFFICIENT)
    };

    let melt = target_high.map_or(0.0, melt_factor);
    let closure = decayed * (1.0 - melt_coefficient * melt);

    trace!(
        "event {} -> {}: day {}, base {:.1}, decayed {:.1}, melt {:.2}, closure {:.1}",
        event.date,
        target,
        days_since,
        base,
        decayed,
        melt,
        closure
    );

    Some(EventImpact {
        event_date: event.date,
        days_since,
        closure,
        is_ice: event.is_ice_event,
        major: event.effective_amount_inches > MAJOR_EVENT_INCHES,
    })
}

/// The single strongest impact; events never stack. Ties go to the more
/// recent event.
pub fn strongest_impact(impacts: impl IntoIterator<Item = EventImpact>) -> Option<EventImpact> {
    impacts.into_iter().fold(None, |best, next| match best {
        None => Some(next),
        Some(current) => {
            let stronger = next.closure > current.closure
                || (next.closure == current.closure && next.days_since < current.days_since);
            Some(if stronger { next } else { current })
        }
    })
}

/// Aftermath odds for `target`, or `None` when no earlier event reaches it.
///
/// Alerts only add to the result when their window covers `target` itself.
pub fn aftermath_for(
    target: Date,
    ledger: &WinterLedger,
    geography: &GeographyContext,
    alerts: &[WeatherAlert],
) -> Option<Aftermath> {
    let impacts = ledger
        .events_before(target)
        .filter_map(|event| event_impact(event, target, ledger, geography, alerts));
    let impact = strongest_impact(impacts)?;

    let bonus = strongest_alert_on(alerts, target).closure_bonus();
    let closure = (impact.closure + bonus).min(MAX_PERCENT);
    let closure_pct = bounded_percent(closure);
    let odds = ClosureOdds {
        closure_pct,
        delay_pct: bounded_percent(impact.delay_for(f64::from(closure_pct))),
    };

    debug!(
        "aftermath {}: event {} ({} days ago) -> closure {}%, delay {}%",
        target, impact.event_date, impact.days_since, odds.closure_pct, odds.delay_pct
    );
    Some(Aftermath {
        odds,
        event_date: impact.event_date,
        days_since: impact.days_since,
    })
}
