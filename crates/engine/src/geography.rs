use serde::{Deserialize, Serialize};

use crate::Error;

/// Snowfall (inches/year) where preparedness crosses 0.5
const PREPAREDNESS_MIDPOINT_SNOWFALL: f64 = 30.0;
const PREPAREDNESS_SPAN_SNOWFALL: f64 = 10.0;

/// Latitude where the preparedness sigmoid is centred, and its span
const PREPAREDNESS_MIDPOINT_LATITUDE: f64 = 40.5;
const PREPAREDNESS_SPAN_LATITUDE: f64 = 6.0;
const LATITUDE_STEEPNESS: f64 = 2.2;

/// Regional profile for one request.
///
/// Built once from the caller's climatology and read-only afterwards; every
/// derived parameter is a total function of `avg_annual_snowfall`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeographyContext {
    #[serde(default)]
    pub state: String,
    pub latitude: f64,
    pub longitude: f64,
    /// Average annual snowfall in inches
    pub avg_annual_snowfall: f64,
}

impl GeographyContext {
    pub fn new(
        state: impl Into<String>,
        latitude: f64,
        longitude: f64,
        avg_annual_snowfall: f64,
    ) -> Self {
        Self {
            state: state.into(),
            latitude,
            longitude,
            avg_annual_snowfall,
        }
    }

    /// Profile for a location without snowfall climatology, estimated from
    /// latitude alone.
    pub fn from_latitude(state: impl Into<String>, latitude: f64, longitude: f64) -> Self {
        Self::new(
            state,
            latitude,
            longitude,
            estimate_snowfall_from_latitude(latitude),
        )
    }

    /// Rejects profiles the engine cannot reason about.
    ///
    /// A (0, 0) coordinate is treated as never having been populated.
    pub fn validate(&self) -> Result<(), Error> {
        if !self.latitude.is_finite() || !(-90.0..=90.0).contains(&self.latitude) {
            return Err(Error::InvalidGeography(format!(
                "latitude out of range: {}",
                self.latitude
            )));
        }
        if !self.longitude.is_finite() || !(-180.0..=180.0).contains(&self.longitude) {
            return Err(Error::InvalidGeography(format!(
                "longitude out of range: {}",
                self.longitude
            )));
        }
        if self.latitude == 0.0 && self.longitude == 0.0 {
            return Err(Error::InvalidGeography(String::from(
                "coordinates were never populated",
            )));
        }
        if !self.avg_annual_snowfall.is_finite() || self.avg_annual_snowfall < 0.0 {
            return Err(Error::InvalidGeography(format!(
                "average annual snowfall must be a non-negative number, got {}",
                self.avg_annual_snowfall
            )));
        }
        Ok(())
    }

    pub fn preparedness_index(&self) -> f64 {
        preparedness_index(self.avg_annual_snowfall)
    }

    pub fn closure_threshold_inches(&self) -> f64 {
        closure_threshold_inches(self.avg_annual_snowfall)
    }

    pub fn typical_closure_days(&self) -> u32 {
        typical_closure_days(self.preparedness_index())
    }

    pub fn aftermath_decay_rate(&self) -> f64 {
        0.30 + 0.40 * self.preparedness_index()
    }
}

fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

/// 0.0 = region with no snow-response capacity, 1.0 = fully equipped.
pub fn preparedness_index(avg_annual_snowfall: f64) -> f64 {
    let x = (avg_annual_snowfall - PREPAREDNESS_MIDPOINT_SNOWFALL) / PREPAREDNESS_SPAN_SNOWFALL;
    let index = sigmoid(x);
    if index.is_nan() {
        return 0.0;
    }
    index.clamp(0.0, 1.0)
}

/// Inches of effective snow at which a district is expected to close.
pub fn closure_threshold_inches(avg_annual_snowfall: f64) -> f64 {
    let snowfall = avg_annual_snowfall.max(0.0);
    let mut threshold = 1.0 + snowfall / 7.5;
    if snowfall > 50.0 {
        threshold += (snowfall - 50.0) * 0.5;
    }
    threshold
}

pub fn typical_closure_days(preparedness: f64) -> u32 {
    match preparedness {
        p if p < 0.20 => 4,
        p if p < 0.40 => 3,
        p if p < 0.65 => 2,
        p if p < 0.85 => 2,
        _ => 1,
    }
}

/// Share of lingering impact removed by above-freezing temperatures.
pub fn melt_factor(temperature_f: f64) -> f64 {
    if temperature_f <= 32.0 {
        0.0
    } else {
        (0.03 * (temperature_f - 32.0)).min(0.60)
    }
}

/// Snowfall whose preparedness matches a latitude sigmoid centred on 40.5°.
pub fn estimate_snowfall_from_latitude(latitude: f64) -> f64 {
    let logit = LATITUDE_STEEPNESS * (latitude - PREPAREDNESS_MIDPOINT_LATITUDE)
        / PREPAREDNESS_SPAN_LATITUDE;
    (PREPAREDNESS_MIDPOINT_SNOWFALL + PREPAREDNESS_SPAN_SNOWFALL * logit).max(0.0)
}
