use snowday_engine::{AlertSeverity, ForecastPeriod, GeographyContext, HistoricalWeatherDay, WeatherAlert};
use time::{Date, Duration, OffsetDateTime, Time, UtcOffset};

pub fn eastern() -> UtcOffset {
    UtcOffset::from_hms(-5, 0, 0).unwrap()
}

fn at(date: Date, hour: u8) -> OffsetDateTime {
    date.with_time(Time::from_hms(hour, 0, 0).unwrap()).assume_offset(eastern())
}

/// Builder for one forecast period, defaulting to a dry daytime period.
#[derive(Clone)]
pub struct PeriodBuilder {
    period: ForecastPeriod,
}

impl PeriodBuilder {
    pub fn day(date: Date) -> Self {
        Self::new(date.weekday().to_string(), at(date, 6), true)
    }

    /// The night leading into `morning`
    pub fn night_before(morning: Date) -> Self {
        let evening = morning.previous_day().unwrap();
        Self::new(format!("{} Night", evening.weekday()), at(evening, 18), false)
    }

    fn new(name: String, start: OffsetDateTime, is_daytime: bool) -> Self {
        Self {
            period: ForecastPeriod {
                name,
                start_time: start,
                end_time: start + Duration::hours(12),
                is_daytime,
                temperature_f: 35,
                precip_probability_pct: None,
                short_forecast: String::from("Mostly Cloudy"),
                detailed_forecast: String::from("Mostly cloudy."),
                snowfall_inches: None,
                ice_inches: None,
            },
        }
    }

    pub fn temperature(mut self, temperature_f: i32) -> Self {
        self.period.temperature_f = temperature_f;
        self
    }

    pub fn precip(mut self, pct: u8) -> Self {
        self.period.precip_probability_pct = Some(pct);
        self
    }

    pub fn text(mut self, short: &str, detailed: &str) -> Self {
        self.period.short_forecast = short.to_string();
        self.period.detailed_forecast = detailed.to_string();
        self
    }

    pub fn snow(mut self, inches: f64) -> Self {
        self.period.snowfall_inches = Some(inches);
        self
    }

    pub fn ice(mut self, inches: f64) -> Self {
        self.period.ice_inches = Some(inches);
        self
    }

    pub fn build(self) -> ForecastPeriod {
        self.period
    }
}

/// Dry daytime periods for `count` consecutive days starting at `first`.
pub fn dry_days(first: Date, count: u8) -> Vec<ForecastPeriod> {
    (0..i64::from(count))
        .map(|offset| PeriodBuilder::day(first + Duration::days(offset)).build())
        .collect()
}

/// avg snowfall 7.5in: a 2 inch closure threshold
pub fn two_inch_threshold() -> GeographyContext {
    GeographyContext::new("VA", 37.5, -77.4, 7.5)
}

/// avg snowfall 15in: a 3 inch closure threshold, preparedness ~0.18
pub fn three_inch_threshold() -> GeographyContext {
    GeographyContext::new("MD", 39.0, -76.6, 15.0)
}

/// avg snowfall 30in: preparedness 0.5
pub fn midpoint_region() -> GeographyContext {
    GeographyContext::new("PA", 40.5, -77.0, 30.0)
}

pub fn observed(date: Date, snowfall_inches: f64, temp_max: f64) -> HistoricalWeatherDay {
    HistoricalWeatherDay {
        date,
        snowfall_inches,
        temp_max,
        temp_min: temp_max - 12.0,
        precipitation: snowfall_inches / 10.0,
    }
}

pub fn alert(event: &str, onset: OffsetDateTime, ends: Option<OffsetDateTime>) -> WeatherAlert {
    WeatherAlert {
        event_type: event.to_string(),
        headline: String::new(),
        description: String::new(),
        severity: AlertSeverity::classify(event),
        onset: Some(onset),
        expires: None,
        ends,
    }
}

pub fn morning(date: Date) -> OffsetDateTime {
    at(date, 6)
}

pub fn evening(date: Date) -> OffsetDateTime {
    at(date, 18)
}
