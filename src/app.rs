//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - loads `.env` and initialises logging
//! - parses CLI arguments into a `RunConfig`
//! - runs the daily pipeline against FRED and Google Trends
//! - prints the summary (and the terminal plot with `--show`)

use std::time::Duration;

use chrono::{Local, NaiveDate};
use clap::Parser;
use log::info;

use crate::cli::Cli;
use crate::data::{FredClient, TrendsClient};
use crate::domain::RunConfig;
use crate::error::AppError;

pub mod pipeline;

/// Rows of history echoed with `--show`.
const SHOW_TAIL_ROWS: usize = 10;

/// Entry point for the `anxiety` binary.
pub fn run() -> Result<(), AppError> {
    dotenvy::dotenv().ok();
    init_logging();

    let cli = Cli::parse();
    let config = run_config_from_cli(&cli, std::env::var("FRED_API_KEY").ok());
    let today = today();

    let fred = FredClient::new(&config)?;
    let trends = TrendsClient::new(&config)?;
    info!("Running for {today} (history '{}')", config.history_path.display());

    let run = pipeline::run_daily(&fred, &trends, &config, today)?;

    println!(
        "{}",
        crate::report::format_run_summary(&run.reading.spread, &run.reading.trend, &run.reading.record)
    );

    if config.show {
        println!("{}", crate::report::format_history_tail(&run.history, SHOW_TAIL_ROWS));
        let (calm, moderate, high) =
            crate::report::band_counts(&crate::report::classify_history(&run.history));
        println!("Bands: {calm} calm | {moderate} moderate | {high} high\n");
        println!(
            "{}",
            crate::plot::render_ascii_history(&run.history, config.plot_width, config.plot_height)
        );
    }

    Ok(())
}

/// Resolve parsed flags (and the optional FRED API key) into run settings.
pub fn run_config_from_cli(cli: &Cli, fred_api_key: Option<String>) -> RunConfig {
    RunConfig {
        history_path: cli.history.clone(),
        chart_path: (!cli.no_chart).then(|| cli.chart.clone()),
        start_date: cli.start_date,
        search_term: cli.term.clone(),
        geo: cli.geo.clone().unwrap_or_default(),
        timeout: Duration::from_secs(cli.timeout_secs),
        retries: cli.retries,
        show: cli.show,
        plot_width: cli.width,
        plot_height: cli.height,
        fred_api_key: fred_api_key.filter(|k| !k.trim().is_empty()),
    }
}

/// Wall-clock local date; the only place the pipeline's "today" comes from.
fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// `RUST_LOG` overrides the default `info` level.
fn init_logging() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_secs()
        .try_init()
        .ok();
}
