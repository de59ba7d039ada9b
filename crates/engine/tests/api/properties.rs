use crate::helpers::{alert, morning, observed, two_inch_threshold, PeriodBuilder};
use snowday_engine::{forecast_snow_days, ForecastPeriod, GeographyContext, MAX_PERCENT};
use time::macros::date;

fn snowy_day(snow: f64, temperature_f: i32, precip: u8) -> ForecastPeriod {
    PeriodBuilder::day(date!(2025 - 01 - 07))
        .temperature(temperature_f)
        .precip(precip)
        .text("Snow", "Snow.")
        .snow(snow)
        .build()
}

fn regions() -> Vec<GeographyContext> {
    vec![
        GeographyContext::new("GA", 33.7, -84.4, 1.0),
        two_inch_threshold(),
        GeographyContext::new("PA", 40.5, -77.0, 30.0),
        GeographyContext::new("NY", 42.9, -78.9, 95.0),
        GeographyContext::from_latitude("MN", 46.8, -92.1),
    ]
}

#[test]
fn percentages_stay_within_bounds() {
    let history = vec![
        observed(date!(2025 - 01 - 05), 24.0, 10.0),
        observed(date!(2025 - 01 - 06), 12.0, 15.0),
    ];
    let alerts = vec![alert("Blizzard Warning", morning(date!(2025 - 01 - 05)), None)];

    for geography in regions() {
        for snow in [0.0, 0.5, 2.0, 8.0, 40.0] {
            for temperature in [-10, 18, 30, 45] {
                for precip in [0, 40, 100] {
                    let periods = vec![
                        snowy_day(snow, temperature, precip),
                        PeriodBuilder::day(date!(2025 - 01 - 08))
                            .temperature(temperature)
                            .text("Blizzard", "Blizzard conditions. Freezing rain and sleet.")
                            .precip(precip)
                            .ice(snow / 10.0)
                            .build(),
                    ];
                    let forecasts = forecast_snow_days(&periods, &geography, &history, &alerts).unwrap();
                    for forecast in forecasts {
                        assert!(f64::from(forecast.closure_pct) <= MAX_PERCENT, "{:?}", forecast);
                        assert!(f64::from(forecast.delay_pct) <= MAX_PERCENT, "{:?}", forecast);
                    }
                }
            }
        }
    }
}

#[test]
fn identical_inputs_give_identical_output() {
    let periods = vec![
        snowy_day(3.0, 22, 80),
        PeriodBuilder::day(date!(2025 - 01 - 08)).temperature(30).build(),
    ];
    let history = vec![observed(date!(2025 - 01 - 05), 5.0, 25.0)];
    let geography = two_inch_threshold();

    let first = forecast_snow_days(&periods, &geography, &history, &[]).unwrap();
    let second = forecast_snow_days(&periods, &geography, &history, &[]).unwrap();
    assert_eq!(first, second);
}

#[test]
fn more_snow_never_lowers_closure() {
    for geography in regions() {
        for temperature in [10, 24, 33] {
            let mut previous = 0;
            for tenths in 0..=300 {
                let snow = f64::from(tenths) / 10.0;
                let periods = vec![snowy_day(snow, temperature, 70)];
                let closure = forecast_snow_days(&periods, &geography, &[], &[]).unwrap()[0].closure_pct;
                assert!(
                    closure >= previous,
                    "{} in at {}F in {}: {} < {}",
                    snow,
                    temperature,
                    geography.state,
                    closure,
                    previous
                );
                previous = closure;
            }
        }
    }
}

#[test]
fn an_inch_of_ice_weighs_as_much_as_three_of_snow() {
    for geography in regions() {
        let ice = PeriodBuilder::day(date!(2025 - 01 - 07))
            .temperature(30)
            .precip(100)
            .snow(0.0)
            .ice(1.0)
            .build();
        let snow = PeriodBuilder::day(date!(2025 - 01 - 07))
            .temperature(30)
            .precip(100)
            .snow(3.0)
            .ice(0.0)
            .build();

        let from_ice = forecast_snow_days(&[ice], &geography, &[], &[]).unwrap();
        let from_snow = forecast_snow_days(&[snow], &geography, &[], &[]).unwrap();
        assert_eq!(from_ice[0].closure_pct, from_snow[0].closure_pct);
        assert_eq!(from_ice[0].delay_pct, from_snow[0].delay_pct);
    }
}
