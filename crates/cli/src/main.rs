use anyhow::anyhow;
use log::{error, info};
use snowday_cli::{get_config_info, load_request, render};
use snowday_core::{resolve_level, setup_logger};

fn main() -> anyhow::Result<()> {
    let cli = get_config_info()?;
    let log_level = resolve_level(cli.level.as_deref());

    setup_logger()
        .level(log_level)
        .level_for("snowday_engine", log_level)
        .level_for("snowday_cli", log_level)
        .apply()?;

    let request = load_request(&cli)?;
    info!(
        "running engine for {} ({}, {}) with {} periods",
        request.geography.state,
        request.geography.latitude,
        request.geography.longitude,
        request.periods.len()
    );

    let forecasts = request.run().map_err(|e| {
        error!("error scoring forecast: {}", e);
        anyhow!("error scoring forecast: {}", e)
    })?;

    println!("{}", render(&forecasts, cli.format())?);
    Ok(())
}
