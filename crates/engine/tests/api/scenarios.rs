use crate::helpers::{
    alert, dry_days, evening, midpoint_region, morning, observed, three_inch_threshold,
    two_inch_threshold, PeriodBuilder,
};
use snowday_engine::{forecast_snow_days, Error, GeographyContext, SnowDayForecast, MAX_OUTPUT_DAYS};
use time::macros::date;
use time::Date;

fn find(forecasts: &[SnowDayForecast], date: Date) -> &SnowDayForecast {
    forecasts
        .iter()
        .find(|f| f.date == date)
        .unwrap_or_else(|| panic!("no forecast for {}", date))
}

#[test]
fn eight_inches_on_a_cold_morning_closes_schools() {
    let periods = vec![PeriodBuilder::day(date!(2025 - 01 - 06))
        .temperature(15)
        .precip(90)
        .text("Heavy Snow", "Snow, heavy at times.")
        .snow(8.0)
        .build()];

    let forecasts = forecast_snow_days(&periods, &two_inch_threshold(), &[], &[]).unwrap();

    assert_eq!(forecasts.len(), 1);
    let monday = &forecasts[0];
    assert_eq!(monday.day_name, "Monday");
    assert_eq!(monday.closure_pct, 90);
    assert_eq!(monday.delay_pct, 10);
    assert!(!monday.is_aftermath_day);
    assert_eq!(monday.snowfall_display.as_deref(), Some("8.0\""));
    assert_eq!(monday.state, "VA");
}

#[test]
fn slight_chance_of_snow_barely_registers() {
    let periods = vec![PeriodBuilder::day(date!(2025 - 01 - 06))
        .temperature(30)
        .precip(30)
        .text("Slight Chance Snow", "A slight chance of snow.")
        .build()];

    let forecasts = forecast_snow_days(&periods, &midpoint_region(), &[], &[]).unwrap();

    assert_eq!(forecasts[0].closure_pct, 0);
    assert_eq!(forecasts[0].delay_pct, 0);
    assert_eq!(forecasts[0].days_since_event, None);
}

#[test]
fn ice_lingers_in_the_cold_and_melts_in_the_thaw() {
    let periods = vec![
        PeriodBuilder::day(date!(2025 - 01 - 06))
            .temperature(30)
            .precip(90)
            .text("Freezing Rain", "Freezing rain.")
            .ice(4.0 / 3.0)
            .build(),
        PeriodBuilder::day(date!(2025 - 01 - 07)).temperature(28).build(),
        PeriodBuilder::day(date!(2025 - 01 - 08)).temperature(40).build(),
    ];

    let forecasts = forecast_snow_days(&periods, &three_inch_threshold(), &[], &[]).unwrap();

    let tuesday = find(&forecasts, date!(2025 - 01 - 07));
    assert!(tuesday.is_aftermath_day);
    assert_eq!(tuesday.days_since_event, Some(1));
    assert_eq!(tuesday.closure_pct, 85);
    assert_eq!(tuesday.delay_pct, 15);

    // 100 x 0.85 x 0.50, then melt at 40F removes 0.7 x 0.24
    let wednesday = find(&forecasts, date!(2025 - 01 - 08));
    assert!(wednesday.is_aftermath_day);
    assert_eq!(wednesday.days_since_event, Some(2));
    assert_eq!(wednesday.closure_pct, 35);
    assert_eq!(wednesday.delay_pct, 70);
}

#[test]
fn overlapping_events_do_not_stack() {
    let periods = vec![PeriodBuilder::day(date!(2025 - 01 - 06)).temperature(35).build()];
    let saturday = observed(date!(2025 - 01 - 04), 6.0, 30.0);
    let sunday = observed(date!(2025 - 01 - 05), 2.0, 30.0);
    let geography = three_inch_threshold();

    let both = forecast_snow_days(&periods, &geography, &[saturday.clone(), sunday], &[]).unwrap();
    let strongest_only = forecast_snow_days(&periods, &geography, &[saturday], &[]).unwrap();

    assert_eq!(both, strongest_only);
    let monday = &both[0];
    assert!(monday.is_aftermath_day);
    assert_eq!(monday.days_since_event, Some(2));
    assert_eq!(monday.closure_pct, 86);
    assert_eq!(monday.delay_pct, 73);
}

#[test]
fn weekend_storm_reaches_monday() {
    let periods = vec![
        PeriodBuilder::day(date!(2025 - 01 - 03)).temperature(30).build(),
        PeriodBuilder::night_before(date!(2025 - 01 - 04))
            .temperature(20)
            .precip(100)
            .text("Heavy Snow", "Heavy snow. New snow accumulation of 6 to 10 inches possible.")
            .build(),
        PeriodBuilder::day(date!(2025 - 01 - 04))
            .temperature(24)
            .precip(90)
            .text("Snow", "Snow. Additional snow accumulation of 1 to 3 inches possible.")
            .build(),
        PeriodBuilder::night_before(date!(2025 - 01 - 05)).temperature(12).build(),
        PeriodBuilder::day(date!(2025 - 01 - 05)).temperature(26).text("Sunny", "Sunny.").build(),
        PeriodBuilder::night_before(date!(2025 - 01 - 06)).temperature(10).build(),
        PeriodBuilder::day(date!(2025 - 01 - 06)).temperature(29).text("Sunny", "Sunny.").build(),
    ];

    let forecasts = forecast_snow_days(&periods, &three_inch_threshold(), &[], &[]).unwrap();

    let saturday = find(&forecasts, date!(2025 - 01 - 04));
    assert_eq!(saturday.snowfall_display.as_deref(), Some("10.0\""));

    let monday = find(&forecasts, date!(2025 - 01 - 06));
    assert!(monday.is_aftermath_day);
    assert_eq!(monday.days_since_event, Some(2));
    assert!(monday.closure_pct >= 80, "monday closure {}", monday.closure_pct);
}

#[test]
fn alert_counts_through_its_last_day_only() {
    let periods = vec![
        PeriodBuilder::day(date!(2025 - 01 - 06))
            .temperature(30)
            .precip(50)
            .text("Chance Snow", "A chance of snow.")
            .build(),
        PeriodBuilder::day(date!(2025 - 01 - 07))
            .temperature(30)
            .precip(50)
            .text("Chance Snow", "A chance of snow.")
            .build(),
    ];
    let geography = midpoint_region();
    let warning = alert(
        "Winter Storm Warning",
        morning(date!(2025 - 01 - 06)),
        Some(evening(date!(2025 - 01 - 06))),
    );

    let quiet = forecast_snow_days(&periods, &geography, &[], &[]).unwrap();
    let alerted = forecast_snow_days(&periods, &geography, &[], &[warning]).unwrap();

    assert_eq!(quiet[0].closure_pct, 2);
    assert_eq!(alerted[0].closure_pct, 42);
    assert_eq!(alerted[1], quiet[1]);
}

#[test]
fn expired_alerts_do_not_inflate_aftermath() {
    let periods = vec![
        PeriodBuilder::day(date!(2025 - 01 - 06)).temperature(25).precip(90).snow(4.0).build(),
        PeriodBuilder::day(date!(2025 - 01 - 07)).temperature(28).build(),
    ];
    let geography = three_inch_threshold();
    let expired = alert(
        "Winter Storm Warning",
        morning(date!(2025 - 01 - 05)),
        Some(evening(date!(2025 - 01 - 06))),
    );
    let ongoing = alert("Winter Storm Warning", morning(date!(2025 - 01 - 05)), None);

    let quiet = forecast_snow_days(&periods, &geography, &[], &[]).unwrap();
    let after_expiry = forecast_snow_days(&periods, &geography, &[], &[expired]).unwrap();
    let still_active = forecast_snow_days(&periods, &geography, &[], &[ongoing]).unwrap();

    assert_eq!(after_expiry[1], quiet[1]);
    assert!(still_active[1].closure_pct > quiet[1].closure_pct);
}

#[test]
fn only_daytime_periods_are_reported_up_to_a_week() {
    let mut periods = Vec::new();
    for day in dry_days(date!(2025 - 01 - 06), 10) {
        let start = day.start_time.date();
        periods.push(PeriodBuilder::night_before(start).build());
        periods.push(day);
    }

    let forecasts = forecast_snow_days(&periods, &midpoint_region(), &[], &[]).unwrap();

    assert_eq!(forecasts.len(), MAX_OUTPUT_DAYS);
    assert_eq!(forecasts[0].date, date!(2025 - 01 - 06));
    assert!(forecasts.iter().all(|f| f.closure_pct == 0 && f.delay_pct == 0));
}

#[test]
fn a_night_only_bundle_has_no_output_days() {
    let periods = vec![PeriodBuilder::night_before(date!(2025 - 01 - 06)).build()];
    let forecasts = forecast_snow_days(&periods, &midpoint_region(), &[], &[]).unwrap();
    assert!(forecasts.is_empty());
}

#[test]
fn preconditions_are_reported_to_the_caller() {
    let periods = dry_days(date!(2025 - 01 - 06), 1);

    let empty = forecast_snow_days(&[], &midpoint_region(), &[], &[]);
    assert!(matches!(empty, Err(Error::NoForecastPeriods)));

    let unpopulated = GeographyContext::new("", 0.0, 0.0, 20.0);
    let result = forecast_snow_days(&periods, &unpopulated, &[], &[]);
    assert!(matches!(result, Err(Error::InvalidGeography(_))));

    let negative = GeographyContext::new("NY", 42.0, -75.0, -1.0);
    let result = forecast_snow_days(&periods, &negative, &[], &[]);
    assert!(matches!(result, Err(Error::InvalidGeography(_))));
}
