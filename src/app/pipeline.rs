//! The daily pipeline:
//! FRED fetch -> spread -> Trends fetch -> compose -> history upsert -> chart
//!
//! Sources are generic so tests can drive the whole flow with in-memory data.
//! Nothing touches the disk until the record has been composed.

use chrono::NaiveDate;
use log::info;

use crate::data::{InterestSource, SeriesSource};
use crate::domain::{AnxietyRecord, RunConfig, TrendObservation, YieldSeries};
use crate::error::AppError;
use crate::io::{HistoryStore, HistoryTable};
use crate::math::{SpreadReading, compute_spread, latest_score};

/// The composed record plus the inputs it came from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DailyReading {
    pub spread: SpreadReading,
    pub trend: TrendObservation,
    pub record: AnxietyRecord,
}

/// All outputs of one run.
#[derive(Debug, Clone)]
pub struct RunOutput {
    pub reading: DailyReading,
    pub history: HistoryTable,
}

/// Fetch both inputs and compose today's record. Pure with respect to disk.
pub fn compose_reading<S, I>(
    series: &S,
    interest: &I,
    config: &RunConfig,
    today: NaiveDate,
) -> Result<DailyReading, AppError>
where
    S: SeriesSource + ?Sized,
    I: InterestSource + ?Sized,
{
    let dbaa = series.fetch_series(YieldSeries::Dbaa, config.start_date, today)?;
    let gs10 = series.fetch_series(YieldSeries::Gs10, config.start_date, today)?;
    let spread = compute_spread(&dbaa, &gs10)?;
    info!(
        "DBAA {} % | GS10 {} % | spread {:.2} %",
        spread.dbaa, spread.gs10, spread.spread
    );

    let timeline = interest.fetch_interest(&config.search_term)?;
    let trend = latest_score(&timeline, &config.search_term)?;
    info!("Google Trends '{}': {} ({})", config.search_term, trend.score, trend.date);

    let record = AnxietyRecord::compose(today, spread.dbaa, spread.gs10, trend.score);
    Ok(DailyReading { spread, trend, record })
}

/// Full run: compose, upsert into the history file, render the chart.
pub fn run_daily<S, I>(
    series: &S,
    interest: &I,
    config: &RunConfig,
    today: NaiveDate,
) -> Result<RunOutput, AppError>
where
    S: SeriesSource + ?Sized,
    I: InterestSource + ?Sized,
{
    let reading = compose_reading(series, interest, config, today)?;

    let store = HistoryStore::new(&config.history_path);
    let mut history = store.load();
    history.append_and_dedupe(reading.record);
    store.save(&history)?;

    if let Some(chart_path) = &config.chart_path {
        crate::plot::write_chart_svg(&history, chart_path)?;
    }

    Ok(RunOutput { reading, history })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::path::Path;
    use std::time::Duration;

    use crate::domain::YieldObservation;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[derive(Default)]
    struct FakeFred {
        dbaa: Vec<YieldObservation>,
        gs10: Vec<YieldObservation>,
        requested: RefCell<Vec<(YieldSeries, NaiveDate, NaiveDate)>>,
    }

    impl SeriesSource for FakeFred {
        fn fetch_series(
            &self,
            series: YieldSeries,
            start: NaiveDate,
            end: NaiveDate,
        ) -> Result<Vec<YieldObservation>, AppError> {
            self.requested.borrow_mut().push((series, start, end));
            let rows = match series {
                YieldSeries::Dbaa => &self.dbaa,
                YieldSeries::Gs10 => &self.gs10,
            };
            let rows: Vec<_> = rows.iter().copied().filter(|r| r.date >= start && r.date <= end).collect();
            if rows.is_empty() {
                return Err(AppError::upstream(format!("No observations returned for series {series}.")));
            }
            Ok(rows)
        }
    }

    struct FakeTrends(Vec<TrendObservation>);

    impl InterestSource for FakeTrends {
        fn fetch_interest(&self, _term: &str) -> Result<Vec<TrendObservation>, AppError> {
            Ok(self.0.clone())
        }
    }

    fn fred(dbaa: f64, gs10: f64) -> FakeFred {
        FakeFred {
            dbaa: vec![
                YieldObservation::new(d(2024, 1, 1), Some(5.0)),
                YieldObservation::new(d(2024, 1, 2), Some(dbaa)),
                YieldObservation::new(d(2024, 1, 3), None),
            ],
            gs10: vec![YieldObservation::new(d(2024, 1, 1), Some(gs10))],
            ..FakeFred::default()
        }
    }

    fn trends(score: f64) -> FakeTrends {
        FakeTrends(vec![
            TrendObservation { date: d(2023, 12, 31), score: 10.0, is_partial: false },
            TrendObservation { date: d(2024, 1, 2), score, is_partial: true },
        ])
    }

    fn config(dir: &Path) -> RunConfig {
        RunConfig {
            history_path: dir.join("anxiety.csv"),
            chart_path: Some(dir.join("anxiety.svg")),
            start_date: d(2020, 1, 1),
            search_term: "credit crunch".to_string(),
            geo: String::new(),
            timeout: Duration::from_secs(5),
            retries: 0,
            show: false,
            plot_width: 80,
            plot_height: 20,
            fred_api_key: None,
        }
    }

    #[test]
    fn first_run_bootstraps_history_and_chart() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = config(dir.path());

        let out = run_daily(&fred(6.0, 4.0), &trends(40.0), &cfg, d(2024, 1, 4)).unwrap();

        assert!((out.reading.record.spread - 2.0).abs() < 1e-12);
        assert!((out.reading.record.anxiety_index - 2.4).abs() < 1e-12);
        assert_eq!(out.reading.record.observation_date, d(2024, 1, 4));
        assert_eq!(out.history.len(), 1);
        assert!(cfg.history_path.exists());
        assert!(cfg.chart_path.as_ref().unwrap().exists());
    }

    #[test]
    fn both_series_requested_from_start_date_through_today() {
        let dir = tempfile::tempdir().unwrap();
        let mut cfg = config(dir.path());
        cfg.start_date = d(2023, 6, 1);
        let source = fred(6.0, 4.0);

        compose_reading(&source, &trends(40.0), &cfg, d(2024, 1, 4)).unwrap();

        assert_eq!(
            *source.requested.borrow(),
            vec![
                (YieldSeries::Dbaa, d(2023, 6, 1), d(2024, 1, 4)),
                (YieldSeries::Gs10, d(2023, 6, 1), d(2024, 1, 4)),
            ]
        );
        assert!(!cfg.history_path.exists());
    }

    #[test]
    fn rerun_same_day_replaces_row() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = config(dir.path());
        let today = d(2024, 1, 4);

        run_daily(&fred(6.0, 4.0), &trends(40.0), &cfg, today).unwrap();
        run_daily(&fred(7.0, 4.0), &trends(80.0), &cfg, today).unwrap();
        let out = run_daily(&fred(6.5, 4.0), &trends(20.0), &cfg, d(2024, 1, 5)).unwrap();

        let reloaded = HistoryStore::new(&cfg.history_path).load();
        assert_eq!(reloaded.len(), 2);
        let rec = reloaded.get(today).unwrap();
        assert_eq!(rec.dbaa, 7.0);
        assert_eq!(rec.gtrend, 80.0);
        assert_eq!(out.history.latest().unwrap().observation_date, d(2024, 1, 5));
    }

    #[test]
    fn upstream_failure_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = config(dir.path());
        let empty = FakeFred::default();

        let err = run_daily(&empty, &trends(40.0), &cfg, d(2024, 1, 4)).unwrap_err();
        assert_eq!(err.exit_code(), crate::error::EXIT_UPSTREAM);
        assert!(!cfg.history_path.exists());
    }

    #[test]
    fn empty_trend_window_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = config(dir.path());

        let err = run_daily(&fred(6.0, 4.0), &FakeTrends(vec![]), &cfg, d(2024, 1, 4)).unwrap_err();
        assert_eq!(err.exit_code(), crate::error::EXIT_UPSTREAM);
        assert!(!cfg.history_path.exists());
    }

    #[test]
    fn chart_can_be_disabled() {
        let dir = tempfile::tempdir().unwrap();
        let mut cfg = config(dir.path());
        cfg.chart_path = None;

        run_daily(&fred(6.0, 4.0), &trends(40.0), &cfg, d(2024, 1, 4)).unwrap();
        assert!(!dir.path().join("anxiety.svg").exists());
    }
}
