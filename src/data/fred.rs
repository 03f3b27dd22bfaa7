//! FRED integration for the corporate and treasury yield series.
//!
//! Two transports produce the same `YieldObservation` rows:
//!
//! - the public graph CSV export (no credentials, default)
//! - the JSON observations API, when `FRED_API_KEY` is configured

use chrono::NaiveDate;
use log::{debug, info};
use reqwest::blocking::Client;
use serde::Deserialize;

use crate::data::SeriesSource;
use crate::data::http::{build_client, get_text, with_retries};
use crate::domain::{RunConfig, YieldObservation, YieldSeries};
use crate::error::AppError;

const GRAPH_CSV_URL: &str = "https://fred.stlouisfed.org/graph/fredgraph.csv";
const OBSERVATIONS_URL: &str = "https://api.stlouisfed.org/fred/series/observations";

pub struct FredClient {
    client: Client,
    api_key: Option<String>,
    retries: u32,
}

impl FredClient {
    pub fn new(config: &RunConfig) -> Result<Self, AppError> {
        Ok(Self {
            client: build_client(config.timeout)?,
            api_key: config.fred_api_key.clone(),
            retries: config.retries,
        })
    }

    fn fetch_graph_csv(
        &self,
        series_id: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<YieldObservation>, AppError> {
        let start = start.format("%Y-%m-%d").to_string();
        let end = end.format("%Y-%m-%d").to_string();
        info!("Fetching {series_id} from FRED graph CSV ({start}..{end})");

        let body = get_text(
            &self.client,
            GRAPH_CSV_URL,
            &[("id", series_id), ("cosd", &start), ("coed", &end)],
        )?;
        parse_graph_csv(series_id, &body)
    }

    fn fetch_observations_json(
        &self,
        api_key: &str,
        series_id: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<YieldObservation>, AppError> {
        let start = start.format("%Y-%m-%d").to_string();
        let end = end.format("%Y-%m-%d").to_string();
        info!("Fetching {series_id} from FRED observations API ({start}..{end})");

        let body = get_text(
            &self.client,
            OBSERVATIONS_URL,
            &[
                ("series_id", series_id),
                ("api_key", api_key),
                ("file_type", "json"),
                ("observation_start", &start),
                ("observation_end", &end),
            ],
        )?;
        parse_observations_json(&body)
    }
}

impl SeriesSource for FredClient {
    fn fetch_series(
        &self,
        series: YieldSeries,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<YieldObservation>, AppError> {
        let series_id = series.series_id();
        let rows = with_retries(self.retries, series_id, || match &self.api_key {
            Some(key) => self.fetch_observations_json(key, series_id, start, end),
            None => self.fetch_graph_csv(series_id, start, end),
        })?;

        if rows.is_empty() {
            return Err(AppError::upstream(format!(
                "No observations returned for series {series_id}."
            )));
        }
        debug!(
            "{series_id}: {} rows, {} with values",
            rows.len(),
            rows.iter().filter(|r| r.rate.is_some()).count()
        );
        Ok(rows)
    }
}

/// Parse a `fredgraph.csv` export.
///
/// The first column is the date (`observation_date`, or `DATE` in older
/// exports). The value column is the one named after the series, falling back
/// to the second column.
///
/// A blank body is an upstream failure, not a parse failure.
pub fn parse_graph_csv(series_id: &str, text: &str) -> Result<Vec<YieldObservation>, AppError> {
    if text.trim().is_empty() {
        return Err(AppError::upstream(format!("Empty response for series {series_id}.")));
    }

    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(text.as_bytes());

    let headers = reader
        .headers()
        .map_err(|e| AppError::parse(format!("Failed to read {series_id} CSV header: {e}")))?
        .clone();

    let value_idx = headers
        .iter()
        .position(|h| h.eq_ignore_ascii_case(series_id))
        .or(if headers.len() >= 2 { Some(1) } else { None })
        .ok_or_else(|| {
            AppError::parse(format!(
                "{series_id} CSV has no value column (header: {:?}).",
                headers.iter().collect::<Vec<_>>()
            ))
        })?;

    let mut out = Vec::new();
    for (idx, result) in reader.records().enumerate() {
        // +2: header is line 1, records are 1-based.
        let line = idx + 2;
        let record = result
            .map_err(|e| AppError::parse(format!("{series_id} CSV line {line}: {e}")))?;

        let raw_date = record.get(0).unwrap_or_default();
        let date = parse_date(raw_date)
            .map_err(|e| AppError::parse(format!("{series_id} CSV line {line}: {e}")))?;
        let rate = parse_value(record.get(value_idx).unwrap_or_default())
            .map_err(|e| AppError::parse(format!("{series_id} CSV line {line}: {e}")))?;

        out.push(YieldObservation::new(date, rate));
    }

    Ok(out)
}

#[derive(Debug, Deserialize)]
struct ObservationsResponse {
    observations: Vec<Observation>,
}

#[derive(Debug, Deserialize)]
struct Observation {
    date: String,
    value: String,
}

/// Parse the JSON body of the observations API.
pub fn parse_observations_json(text: &str) -> Result<Vec<YieldObservation>, AppError> {
    if text.trim().is_empty() {
        return Err(AppError::upstream("Empty response from FRED observations API."));
    }
    let body: ObservationsResponse = serde_json::from_str(text)
        .map_err(|e| AppError::parse(format!("Failed to parse FRED response: {e}")))?;

    body.observations
        .into_iter()
        .map(|obs| {
            let date = parse_date(&obs.date).map_err(AppError::parse)?;
            let rate = parse_value(&obs.value).map_err(AppError::parse)?;
            Ok(YieldObservation::new(date, rate))
        })
        .collect()
}

/// `.` and blank cells are FRED's missing-value markers.
fn parse_value(raw: &str) -> Result<Option<f64>, String> {
    let trimmed = raw.trim();
    if trimmed == "." || trimmed.is_empty() {
        return Ok(None);
    }
    let v = trimmed
        .parse::<f64>()
        .map_err(|e| format!("Invalid rate '{trimmed}': {e}"))?;
    Ok(v.is_finite().then_some(v))
}

fn parse_date(s: &str) -> Result<NaiveDate, String> {
    const FMTS: [&str; 3] = ["%Y-%m-%d", "%m/%d/%y", "%m/%d/%Y"];
    let s = s.trim();
    for fmt in FMTS {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return Ok(d);
        }
    }
    Err(format!("Invalid date '{s}'. Expected YYYY-MM-DD or MM/DD/YY."))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn graph_csv_current_header() {
        let text = "observation_date,DBAA\n2024-01-01,6.0\n2024-01-02,\n2024-01-03,.\n";
        let rows = parse_graph_csv("DBAA", text).unwrap();
        assert_eq!(
            rows,
            vec![
                YieldObservation::new(d(2024, 1, 1), Some(6.0)),
                YieldObservation::new(d(2024, 1, 2), None),
                YieldObservation::new(d(2024, 1, 3), None),
            ]
        );
    }

    #[test]
    fn graph_csv_legacy_header_and_short_dates() {
        let text = "DATE,GS10\n01/01/24,4.02\n02/01/24,4.06\n";
        let rows = parse_graph_csv("GS10", text).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1], YieldObservation::new(d(2024, 2, 1), Some(4.06)));
    }

    #[test]
    fn graph_csv_picks_named_column() {
        let text = "observation_date,OTHER,DBAA\n2024-01-01,1.0,6.1\n";
        let rows = parse_graph_csv("DBAA", text).unwrap();
        assert_eq!(rows[0].rate, Some(6.1));
    }

    #[test]
    fn graph_csv_rejects_garbage_rate() {
        let text = "observation_date,DBAA\n2024-01-01,abc\n";
        let err = parse_graph_csv("DBAA", text).unwrap_err();
        assert_eq!(err.exit_code(), crate::error::EXIT_PARSE);
        assert!(err.message().contains("line 2"));
    }

    #[test]
    fn graph_csv_rejects_bad_date() {
        let text = "observation_date,DBAA\nyesterday,6.0\n";
        assert!(parse_graph_csv("DBAA", text).is_err());
    }

    #[test]
    fn graph_csv_header_only_is_empty() {
        let rows = parse_graph_csv("DBAA", "observation_date,DBAA\n").unwrap();
        assert!(rows.is_empty());
    }

    #[test]
    fn graph_csv_empty_body_is_upstream_failure() {
        for body in ["", "  \n"] {
            let err = parse_graph_csv("DBAA", body).unwrap_err();
            assert_eq!(err.exit_code(), crate::error::EXIT_UPSTREAM);
            assert!(err.message().contains("DBAA"));
        }
    }

    #[test]
    fn observations_json_empty_body_is_upstream_failure() {
        let err = parse_observations_json("").unwrap_err();
        assert_eq!(err.exit_code(), crate::error::EXIT_UPSTREAM);
    }

    #[test]
    fn observations_json_missing_marker() {
        let text = r#"{"observations":[
            {"realtime_start":"2024-01-05","realtime_end":"2024-01-05","date":"2024-01-01","value":"6.00"},
            {"realtime_start":"2024-01-05","realtime_end":"2024-01-05","date":"2024-01-02","value":"."}
        ]}"#;
        let rows = parse_observations_json(text).unwrap();
        assert_eq!(rows[0], YieldObservation::new(d(2024, 1, 1), Some(6.0)));
        assert_eq!(rows[1], YieldObservation::new(d(2024, 1, 2), None));
    }

    #[test]
    fn observations_json_malformed() {
        let err = parse_observations_json("<html>").unwrap_err();
        assert_eq!(err.exit_code(), crate::error::EXIT_PARSE);
    }
}
