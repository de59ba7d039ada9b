use serde::{Deserialize, Serialize};
use time::{Date, OffsetDateTime};

/// Official alert severity, ordered from least to most disruptive.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum AlertSeverity {
    #[default]
    None,
    Advisory,
    Watch,
    Warning,
    Extreme,
}

impl AlertSeverity {
    /// Map an NWS event name ("Winter Storm Warning", ...) to a severity.
    pub fn classify(event: &str) -> Self {
        let event = event.to_lowercase();
        let any = |names: &[&str]| names.iter().any(|name| event.contains(name));

        if any(&["blizzard warning", "ice storm warning"]) {
            AlertSeverity::Extreme
        } else if any(&[
            "winter storm warning",
            "snow squall warning",
            "extreme cold warning",
        ]) {
            AlertSeverity::Warning
        } else if any(&[
            "winter storm watch",
            "blizzard watch",
            "extreme cold watch",
            "wind chill watch",
            "freeze watch",
        ]) {
            AlertSeverity::Watch
        } else if any(&[
            "winter weather advisory",
            "wind chill advisory",
            "freezing rain advisory",
            "snow advisory",
            "cold weather advisory",
        ]) {
            AlertSeverity::Advisory
        } else {
            AlertSeverity::None
        }
    }

    /// Closure percentage points added while an alert of this severity is in
    /// effect.
    pub fn closure_bonus(self) -> f64 {
        match self {
            AlertSeverity::Extreme => 60.0,
            AlertSeverity::Warning => 40.0,
            AlertSeverity::Watch => 25.0,
            AlertSeverity::Advisory => 15.0,
            AlertSeverity::None => 0.0,
        }
    }
}

impl std::fmt::Display for AlertSeverity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            AlertSeverity::None => "none",
            AlertSeverity::Advisory => "advisory",
            AlertSeverity::Watch => "watch",
            AlertSeverity::Warning => "warning",
            AlertSeverity::Extreme => "extreme",
        };
        write!(f, "{}", name)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherAlert {
    #[serde(rename = "type")]
    pub event_type: String,
    #[serde(default)]
    pub headline: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub severity: AlertSeverity,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub onset: Option<OffsetDateTime>,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub expires: Option<OffsetDateTime>,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub ends: Option<OffsetDateTime>,
}

impl WeatherAlert {
    /// `ends`, falling back to `expires`; `None` means open-ended.
    pub fn effective_end(&self) -> Option<OffsetDateTime> {
        self.ends.or(self.expires)
    }

    /// Whether the alert window touches `date`, comparing calendar days.
    ///
    /// Alerts without an onset cover nothing.
    pub fn covers(&self, date: Date) -> bool {
        let Some(onset) = self.onset else {
            return false;
        };
        if date < onset.date() {
            return false;
        }
        self.effective_end().map_or(true, |end| date <= end.date())
    }

    pub fn is_winter_related(&self) -> bool {
        let event = self.event_type.to_lowercase();
        ["winter", "snow", "ice", "blizzard", "freez", "cold"]
            .iter()
            .any(|word| event.contains(word))
    }
}

/// Highest severity among alerts covering `date`.
pub fn strongest_alert_on(alerts: &[WeatherAlert], date: Date) -> AlertSeverity {
    alerts
        .iter()
        .filter(|alert| alert.covers(date))
        .map(|alert| alert.severity)
        .max()
        .unwrap_or_default()
}
