//! Latest-value selection and the credit spread.
//!
//! Each series contributes its own latest usable value. There is no join on a
//! common as-of date: `DBAA` is daily while `GS10` is monthly, so the two
//! latest dates usually differ.

use chrono::NaiveDate;
use log::warn;

use crate::domain::{TrendObservation, YieldObservation, YieldSeries};
use crate::error::AppError;

/// The inputs and result of one spread computation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpreadReading {
    pub dbaa: f64,
    pub dbaa_date: NaiveDate,
    pub gs10: f64,
    pub gs10_date: NaiveDate,
    /// `dbaa - gs10`, in percentage points.
    pub spread: f64,
}

impl SpreadReading {
    pub fn dates_aligned(&self) -> bool {
        self.dbaa_date == self.gs10_date
    }
}

/// The last row (by date) with a present, finite rate.
pub fn latest_available(rows: &[YieldObservation]) -> Option<(NaiveDate, f64)> {
    rows.iter()
        .filter_map(|obs| match obs.rate {
            Some(rate) if rate.is_finite() => Some((obs.date, rate)),
            _ => None,
        })
        .max_by_key(|(date, _)| *date)
}

/// Compute `corporate - treasury` from each series' own latest value.
pub fn compute_spread(
    corporate: &[YieldObservation],
    treasury: &[YieldObservation],
) -> Result<SpreadReading, AppError> {
    let (dbaa_date, dbaa) = latest_available(corporate)
        .ok_or_else(|| no_usable_rows(YieldSeries::Dbaa))?;
    let (gs10_date, gs10) = latest_available(treasury)
        .ok_or_else(|| no_usable_rows(YieldSeries::Gs10))?;

    let reading = SpreadReading {
        dbaa,
        dbaa_date,
        gs10,
        gs10_date,
        spread: dbaa - gs10,
    };

    if !reading.dates_aligned() {
        warn!(
            "latest observations are not aligned: {} as of {dbaa_date}, {} as of {gs10_date}",
            YieldSeries::Dbaa,
            YieldSeries::Gs10
        );
    }

    Ok(reading)
}

/// The most recent point of a trend timeline.
pub fn latest_score(points: &[TrendObservation], term: &str) -> Result<TrendObservation, AppError> {
    points
        .iter()
        .copied()
        .filter(|p| p.score.is_finite())
        .max_by_key(|p| p.date)
        .ok_or_else(|| AppError::upstream(format!("No search-interest data points for '{term}'.")))
}

fn no_usable_rows(series: YieldSeries) -> AppError {
    AppError::upstream(format!("No non-missing observations for series {series}."))
}
