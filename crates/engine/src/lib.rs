//! Snowday probability engine
//!
//! Turns an already-fetched forecast (day/night periods), a regional
//! geography profile, recent observed weather and active winter alerts into
//! per-day school closure and delay percentages.
//!
//! The engine is a pure function of its inputs: [`forecast_snow_days`] builds
//! a fresh winter-event ledger on every call and never touches the network or
//! the filesystem.

mod aftermath;
mod alerts;
mod amounts;
mod direct;
mod error;
mod forecast;
mod geography;
mod ledger;
mod payload;
mod period;

use time::Date;

pub use aftermath::*;
pub use alerts::*;
pub use amounts::*;
pub use direct::*;
pub use error::*;
pub use forecast::*;
pub use geography::*;
pub use ledger::*;
pub use payload::*;
pub use period::*;

// Calendar dates travel as `YYYY-MM-DD`
time::serde::format_description!(iso_date, Date, "[year]-[month]-[day]");

/// Upper bound for every closure and delay percentage the engine emits
pub const MAX_PERCENT: f64 = 95.0;

/// Weight applied to ice accumulation when combining it with snow
pub const ICE_WEIGHT: f64 = 3.0;

/// Snow plus weighted ice, the hazard measure used throughout the engine
pub fn effective_snow(snow_inches: f64, ice_inches: f64) -> f64 {
    snow_inches.max(0.0) + ice_inches.max(0.0) * ICE_WEIGHT
}
