//! Upstream data sources.
//!
//! - FRED yield series (`fred`)
//! - Google Trends search interest (`trends`)
//! - shared blocking HTTP plumbing (`http`)
//!
//! The pipeline talks to sources through the `SeriesSource` and
//! `InterestSource` traits so it can run against in-memory fakes.

use chrono::NaiveDate;

use crate::domain::{TrendObservation, YieldObservation, YieldSeries};
use crate::error::AppError;

pub mod fred;
pub mod http;
pub mod trends;

pub use fred::FredClient;
pub use trends::TrendsClient;

/// A provider of dated rate observations.
pub trait SeriesSource {
    /// Fetch `series` over `[start, end]`. Missing values are kept as `None`.
    fn fetch_series(
        &self,
        series: YieldSeries,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<YieldObservation>, AppError>;
}

/// A provider of a search-interest timeline for a phrase.
pub trait InterestSource {
    fn fetch_interest(&self, term: &str) -> Result<Vec<TrendObservation>, AppError>;
}
