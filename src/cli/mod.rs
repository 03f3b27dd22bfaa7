//! Command-line parsing for the daily index run.
//!
//! Every option has a default, so a bare `anxiety` performs the full run.
//! Argument parsing stays here; `app` turns the parsed flags into a
//! `RunConfig`.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::Parser;

/// Top-level CLI.
#[derive(Debug, Parser, Clone)]
#[command(
    name = "anxiety",
    version,
    about = "Daily Credit Anxiety Index (FRED credit spread + Google Trends)"
)]
pub struct Cli {
    /// History CSV to append today's row to.
    #[arg(long, value_name = "CSV", default_value = "anxiety.csv")]
    pub history: PathBuf,

    /// Chart output (SVG).
    #[arg(long, value_name = "SVG", default_value = "anxiety.svg")]
    pub chart: PathBuf,

    /// Do not write the chart.
    #[arg(long)]
    pub no_chart: bool,

    /// First date requested from FRED.
    #[arg(long, value_name = "YYYY-MM-DD", default_value = "2020-01-01", value_parser = parse_iso_date)]
    pub start_date: NaiveDate,

    /// Search phrase scored on Google Trends.
    #[arg(long, default_value = "credit crunch")]
    pub term: String,

    /// Google Trends region code, e.g. `US` (worldwide when omitted).
    #[arg(long)]
    pub geo: Option<String>,

    /// Per-request timeout for upstream calls, in seconds.
    #[arg(long, default_value_t = 30, value_parser = clap::value_parser!(u64).range(1..))]
    pub timeout_secs: u64,

    /// Extra attempts for failed upstream calls (exponential backoff).
    #[arg(long, default_value_t = 0)]
    pub retries: u32,

    /// Also print the history as a terminal plot.
    #[arg(long)]
    pub show: bool,

    /// Terminal plot width (columns).
    #[arg(long, default_value_t = 80)]
    pub width: usize,

    /// Terminal plot height (rows).
    #[arg(long, default_value_t = 20)]
    pub height: usize,
}

fn parse_iso_date(s: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|e| format!("expected YYYY-MM-DD: {e}"))
}
