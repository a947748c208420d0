use anyhow::{Context, Result};
use home_heat_analysis::{config, domain, telemetry, Home};
use config::Config;
use domain::BillingHistory;
use telemetry::init_tracing;
use tracing::info;

fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let cfg = match std::env::args().nth(1) {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };

    let raw = std::fs::read_to_string(&cfg.input.bills_path).with_context(|| {
        format!(
            "reading billing history from {}",
            cfg.input.bills_path.display()
        )
    })?;
    let history: BillingHistory =
        serde_json::from_str(&raw).context("parsing billing history")?;

    info!(
        periods = history.periods.len(),
        path = %cfg.input.bills_path.display(),
        fuel_type = %cfg.home.fuel_type,
        "loaded billing history"
    );

    let mut home = Home::new(cfg.home.clone())?;
    home.initialize_from_bills(&history.periods, cfg.input.avg_non_heating_usage)?;

    let mut report = home.calculate_balance_point_and_ua(&cfg.estimator)?;
    if let Some(design) = &cfg.design {
        report = report.with_heat_load(design);
    }

    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
