//! Shared domain types.
//!
//! Records are plain serializable values so the same type flows from the
//! composer into the history CSV and back out into the chart.

use std::path::PathBuf;
use std::time::Duration;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::math::compose_index;

/// Lower anxiety threshold (calm / moderate boundary).
pub const MODERATE_THRESHOLD: f64 = 2.0;
/// Upper anxiety threshold (moderate / high boundary).
pub const HIGH_THRESHOLD: f64 = 4.0;

/// FRED series feeding the spread.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum YieldSeries {
    /// Moody's Seasoned Baa Corporate Bond Yield (daily).
    Dbaa,
    /// 10-Year Treasury Constant Maturity Rate (monthly).
    Gs10,
}

impl YieldSeries {
    pub fn series_id(self) -> &'static str {
        match self {
            YieldSeries::Dbaa => "DBAA",
            YieldSeries::Gs10 => "GS10",
        }
    }
}

impl std::fmt::Display for YieldSeries {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.series_id())
    }
}

/// One dated row of a FRED series. `rate` is `None` where FRED has no value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct YieldObservation {
    pub date: NaiveDate,
    /// Percent, e.g. `6.0` for 6%.
    pub rate: Option<f64>,
}

impl YieldObservation {
    pub fn new(date: NaiveDate, rate: Option<f64>) -> Self {
        Self { date, rate }
    }
}

/// One point of the search-interest timeline (0..=100).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrendObservation {
    pub date: NaiveDate,
    pub score: f64,
    /// Google flags the current, still-accumulating period as partial.
    pub is_partial: bool,
}

/// A single day of the index, as persisted in the history table.
///
/// Column order matches the on-disk header:
/// `observation_date,dbaa,gs10,spread,gtrend,anxiety_index`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AnxietyRecord {
    pub observation_date: NaiveDate,
    pub dbaa: f64,
    pub gs10: f64,
    pub spread: f64,
    pub gtrend: f64,
    pub anxiety_index: f64,
}

impl AnxietyRecord {
    /// Build a record from its inputs; `spread` and `anxiety_index` are derived.
    pub fn compose(observation_date: NaiveDate, dbaa: f64, gs10: f64, gtrend: f64) -> Self {
        let spread = dbaa - gs10;
        Self {
            observation_date,
            dbaa,
            gs10,
            spread,
            gtrend,
            anxiety_index: compose_index(spread, gtrend),
        }
    }

    pub fn band(&self) -> StressBand {
        StressBand::classify(self.anxiety_index)
    }
}

/// Interpretation band of an index value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StressBand {
    /// `< 2`: stable market, low risk premium.
    Calm,
    /// `2..=4`: elevated caution.
    Moderate,
    /// `> 4`: high stress, possible recession signal.
    High,
}

impl StressBand {
    /// Classify an index value. The thresholds themselves belong to `Moderate`.
    pub fn classify(index: f64) -> Self {
        if index < MODERATE_THRESHOLD {
            StressBand::Calm
        } else if index <= HIGH_THRESHOLD {
            StressBand::Moderate
        } else {
            StressBand::High
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            StressBand::Calm => "calm market",
            StressBand::Moderate => "moderate stress",
            StressBand::High => "high stress",
        }
    }
}

impl std::fmt::Display for StressBand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Fully resolved settings for one run.
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub history_path: PathBuf,
    /// `None` disables chart output.
    pub chart_path: Option<PathBuf>,
    pub start_date: NaiveDate,
    pub search_term: String,
    pub geo: String,
    pub timeout: Duration,
    pub retries: u32,
    pub show: bool,
    pub plot_width: usize,
    pub plot_height: usize,
    pub fred_api_key: Option<String>,
}
