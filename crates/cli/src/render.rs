use snowday_engine::SnowDayForecast;

use crate::OutputFormat;

pub fn render(forecasts: &[SnowDayForecast], format: OutputFormat) -> Result<String, anyhow::Error> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(forecasts)?),
        OutputFormat::Table => Ok(render_table(forecasts)),
    }
}

/// One line per day: date, closure and delay chances with their levels,
/// temperature, amount and the short forecast.
pub fn render_table(forecasts: &[SnowDayForecast]) -> String {
    let mut out = format!(
        "{:<10} {:<16} {:>16} {:>16} {:>5} {:>9}  {}\n",
        "date", "day", "closure", "delay", "temp", "snow", "forecast"
    );
    for day in forecasts {
        let mut forecast = day.forecast_text.clone();
        if let Some(days_since) = day.days_since_event {
            forecast.push_str(&format!(" (aftermath, {} days after event)", days_since));
        }
        out.push_str(&format!(
            "{:<10} {:<16} {:>16} {:>16} {:>4}F {:>9}  {}\n",
            day.date.to_string(),
            day.day_name,
            format!("{}% {}", day.closure_pct, day.closure_level()),
            format!("{}% {}", day.delay_pct, day.delay_level()),
            day.temperature,
            day.snowfall_display.as_deref().unwrap_or("-"),
            forecast
        ));
    }
    out
}
