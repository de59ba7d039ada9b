use snowday_engine::{
    forecast_snow_days, parse_nws_alerts, parse_nws_forecast, parse_open_meteo_history,
    AlertSeverity, ForecastRequest, GeographyContext,
};
use time::macros::date;

const FORECAST: &str = r#"{
  "properties": {
    "periods": [
      {
        "name": "Tonight",
        "startTime": "2025-01-05T18:00:00-05:00",
        "endTime": "2025-01-06T06:00:00-05:00",
        "isDaytime": false,
        "temperature": 18,
        "temperatureUnit": "F",
        "probabilityOfPrecipitation": { "unitCode": "wmoUnit:percent", "value": 100 },
        "shortForecast": "Heavy Snow",
        "detailedForecast": "Snow, heavy at times. New snow accumulation of 5 to 7 inches possible."
      },
      {
        "name": "Monday",
        "startTime": "2025-01-06T06:00:00-05:00",
        "endTime": "2025-01-06T18:00:00-05:00",
        "isDaytime": true,
        "temperature": 24,
        "temperatureUnit": "F",
        "probabilityOfPrecipitation": { "unitCode": "wmoUnit:percent", "value": 80 },
        "shortForecast": "Snow",
        "detailedForecast": "Snow before noon. Additional snow accumulation of around 1 inch possible."
      },
      {
        "name": "Monday Night",
        "startTime": "2025-01-06T18:00:00-05:00",
        "endTime": "2025-01-07T06:00:00-05:00",
        "isDaytime": false,
        "temperature": 9,
        "temperatureUnit": "F",
        "probabilityOfPrecipitation": { "unitCode": "wmoUnit:percent", "value": null },
        "shortForecast": "Mostly Clear",
        "detailedForecast": "Mostly clear, with a low around 9."
      },
      {
        "name": "Tuesday",
        "startTime": "2025-01-07T06:00:00-05:00",
        "endTime": "2025-01-07T18:00:00-05:00",
        "isDaytime": true,
        "temperature": 21,
        "temperatureUnit": "F",
        "probabilityOfPrecipitation": { "unitCode": "wmoUnit:percent", "value": null },
        "shortForecast": "Sunny",
        "detailedForecast": "Sunny, with a high near 21."
      }
    ]
  }
}"#;

const ALERTS: &str = r#"{
  "features": [
    {
      "properties": {
        "event": "Winter Storm Warning",
        "headline": "Winter Storm Warning issued January 5",
        "description": "Heavy snow expected.",
        "onset": "2025-01-05T18:00:00-05:00",
        "expires": "2025-01-06T04:00:00-05:00",
        "ends": "2025-01-06T18:00:00-05:00"
      }
    },
    { "properties": { "event": "Small Craft Advisory", "onset": "2025-01-05T18:00:00-05:00" } }
  ]
}"#;

const HISTORY: &str = r#"{
  "daily_units": { "snowfall_sum": "inch", "temperature_2m_max": "°F", "precipitation_sum": "inch" },
  "daily": {
    "time": ["2025-01-03", "2025-01-04", "2025-01-05"],
    "snowfall_sum": [0.0, 0.0, null],
    "temperature_2m_max": [38.0, 33.5, 27.1],
    "temperature_2m_min": [25.0, 20.2, 14.0],
    "precipitation_sum": [0.0, 0.0, 0.0]
  }
}"#;

#[test]
fn decoded_documents_drive_the_engine() {
    let periods = parse_nws_forecast(FORECAST).unwrap();
    let alerts = parse_nws_alerts(ALERTS).unwrap();
    let history = parse_open_meteo_history(HISTORY).unwrap();
    let geography = GeographyContext::new("VA", 38.0, -78.5, 12.0);

    assert_eq!(alerts.len(), 1);
    assert_eq!(alerts[0].severity, AlertSeverity::Warning);
    assert_eq!(history.len(), 3);

    let forecasts = forecast_snow_days(&periods, &geography, &history, &alerts).unwrap();
    assert_eq!(forecasts.len(), 2);

    let monday = &forecasts[0];
    assert_eq!(monday.date, date!(2025 - 01 - 06));
    assert_eq!(monday.closure_pct, 95);
    assert_eq!(monday.precip_pct, Some(100));
    assert_eq!(monday.snowfall_display.as_deref(), Some("7.0\""));

    let tuesday = &forecasts[1];
    assert!(tuesday.is_aftermath_day);
    assert_eq!(tuesday.days_since_event, Some(1));
    assert!(tuesday.closure_pct >= 70, "{:?}", tuesday);
}

#[test]
fn engine_bundle_round_trips_through_json() {
    let bundle = r#"{
      "geography": { "state": "OH", "latitude": 41.5, "longitude": -81.7, "avg_annual_snowfall": 55.0 },
      "periods": [
        {
          "name": "Monday",
          "start_time": "2025-01-06T06:00:00-05:00",
          "end_time": "2025-01-06T18:00:00-05:00",
          "is_daytime": true,
          "temperature_f": 20,
          "precip_probability_pct": 90,
          "short_forecast": "Snow",
          "detailed_forecast": "Snow. New snow accumulation of 8 to 12 inches possible."
        }
      ],
      "history": [
        { "date": "2025-01-04", "snowfall_inches": 3.0, "temp_max": 25.0, "temp_min": 12.0, "precipitation": 0.3 }
      ],
      "alerts": [
        { "type": "Winter Storm Warning", "severity": "Warning", "onset": "2025-01-05T18:00:00-05:00" }
      ]
    }"#;

    let request: ForecastRequest = serde_json::from_str(bundle).unwrap();
    assert_eq!(request.alerts[0].severity, AlertSeverity::Warning);
    let forecasts = request.run().unwrap();

    assert_eq!(forecasts.len(), 1);
    assert_eq!(forecasts[0].state, "OH");
    assert!(forecasts[0].closure_pct > 50);

    let json = serde_json::to_value(&forecasts).unwrap();
    assert_eq!(json[0]["date"], "2025-01-06");
    assert_eq!(json[0]["snowfall_display"], "10.0\"");
}
