//! Google Trends "interest over time" for a single search phrase.
//!
//! The web API is a two-step exchange:
//!
//! 1. `explore` returns the widgets for a query; the `TIMESERIES` widget
//!    carries a signed `token` and the canonical `request`.
//! 2. `widgetdata/multiline` returns the timeline for that token/request.
//!
//! Both responses are JSON behind an anti-XSSI prefix (`)]}'`).

use chrono::{DateTime, NaiveDate};
use log::{debug, info};
use reqwest::blocking::Client;
use serde::Deserialize;
use serde_json::{Value, json};

use crate::data::InterestSource;
use crate::data::http::{build_client, get_text, with_retries};
use crate::domain::{RunConfig, TrendObservation};
use crate::error::AppError;

const HOME_URL: &str = "https://trends.google.com/";
const EXPLORE_URL: &str = "https://trends.google.com/trends/api/explore";
const MULTILINE_URL: &str = "https://trends.google.com/trends/api/widgetdata/multiline";

/// Trailing three-month window, relative to Google's "today".
pub const TIMEFRAME: &str = "today 3-m";
const HOST_LANGUAGE: &str = "en-US";
/// Minutes offset from UTC (US Central), as the web client sends it.
const TZ_OFFSET: &str = "360";
const COOKIE_GEO: &str = "US";

pub struct TrendsClient {
    client: Client,
    geo: String,
    retries: u32,
}

/// Token and canonical request of the `TIMESERIES` widget.
#[derive(Debug, Clone, PartialEq)]
pub struct TimeseriesWidget {
    pub token: String,
    pub request: Value,
}

impl TrendsClient {
    pub fn new(config: &RunConfig) -> Result<Self, AppError> {
        Ok(Self {
            client: build_client(config.timeout)?,
            geo: config.geo.clone(),
            retries: config.retries,
        })
    }

    fn fetch_once(&self, term: &str) -> Result<Vec<TrendObservation>, AppError> {
        // Session cookies are required; the explore endpoint answers 429 without them.
        get_text(&self.client, HOME_URL, &[("geo", COOKIE_GEO)])?;

        let explore_req = json!({
            "comparisonItem": [{ "keyword": term, "time": TIMEFRAME, "geo": self.geo }],
            "category": 0,
            "property": "",
        })
        .to_string();
        let body = get_text(
            &self.client,
            EXPLORE_URL,
            &[("hl", HOST_LANGUAGE), ("tz", TZ_OFFSET), ("req", &explore_req)],
        )?;
        let widget = parse_explore(&body)?;

        let timeline_req = widget.request.to_string();
        let body = get_text(
            &self.client,
            MULTILINE_URL,
            &[
                ("hl", HOST_LANGUAGE),
                ("tz", TZ_OFFSET),
                ("req", &timeline_req),
                ("token", &widget.token),
            ],
        )?;
        parse_timeline(&body)
    }
}

impl InterestSource for TrendsClient {
    fn fetch_interest(&self, term: &str) -> Result<Vec<TrendObservation>, AppError> {
        info!("Fetching Google Trends interest for '{term}' ({TIMEFRAME})");
        let points = with_retries(self.retries, "google trends", || self.fetch_once(term))?;
        debug!("google trends: {} timeline points", points.len());
        Ok(points)
    }
}

#[derive(Debug, Deserialize)]
struct ExploreResponse {
    widgets: Vec<Widget>,
}

#[derive(Debug, Deserialize)]
struct Widget {
    id: String,
    #[serde(default)]
    token: Option<String>,
    #[serde(default)]
    request: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct MultilineResponse {
    default: Timeline,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Timeline {
    timeline_data: Vec<TimelinePoint>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TimelinePoint {
    time: String,
    value: Vec<f64>,
    #[serde(default)]
    is_partial: bool,
}

/// Extract the `TIMESERIES` widget from an `explore` response.
pub fn parse_explore(body: &str) -> Result<TimeseriesWidget, AppError> {
    let resp: ExploreResponse = serde_json::from_str(strip_guard(body))
        .map_err(|e| AppError::parse(format!("Failed to parse Trends explore response: {e}")))?;

    let widget = resp
        .widgets
        .into_iter()
        .find(|w| w.id.starts_with("TIMESERIES"))
        .ok_or_else(|| AppError::parse("Trends explore response has no TIMESERIES widget."))?;

    match (widget.token, widget.request) {
        (Some(token), Some(request)) => Ok(TimeseriesWidget { token, request }),
        _ => Err(AppError::parse(
            "Trends TIMESERIES widget is missing its token or request.",
        )),
    }
}

/// Parse a `multiline` response into dated scores (first keyword only).
pub fn parse_timeline(body: &str) -> Result<Vec<TrendObservation>, AppError> {
    let resp: MultilineResponse = serde_json::from_str(strip_guard(body))
        .map_err(|e| AppError::parse(format!("Failed to parse Trends timeline: {e}")))?;

    resp.default
        .timeline_data
        .into_iter()
        .map(|p| {
            let score = *p
                .value
                .first()
                .ok_or_else(|| AppError::parse(format!("Trends point {} has no value.", p.time)))?;
            Ok(TrendObservation {
                date: unix_date(&p.time)?,
                score,
                is_partial: p.is_partial,
            })
        })
        .collect()
}

/// Drop the anti-XSSI prefix by starting at the first `{`.
fn strip_guard(body: &str) -> &str {
    body.find('{').map_or(body, |idx| &body[idx..])
}

fn unix_date(raw: &str) -> Result<NaiveDate, AppError> {
    let secs = raw
        .trim()
        .parse::<i64>()
        .map_err(|e| AppError::parse(format!("Invalid Trends timestamp '{raw}': {e}")))?;
    DateTime::from_timestamp(secs, 0)
        .map(|dt| dt.date_naive())
        .ok_or_else(|| AppError::parse(format!("Trends timestamp out of range: {secs}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    const EXPLORE_BODY: &str = r#")]}'
{"widgets":[
  {"id":"TIMESERIES","title":"Interest over time","token":"APP6_abc",
   "request":{"time":"2024-02-01 2024-05-01","resolution":"DAY","locale":"en-US",
              "comparisonItem":[{"geo":{},"complexKeywordsRestriction":{"keyword":[{"type":"BROAD","value":"credit crunch"}]}}],
              "requestOptions":{"property":"","backend":"IZG","category":0}}},
  {"id":"GEO_MAP","token":"APP6_geo","request":{}}
]}"#;

    const TIMELINE_BODY: &str = r#")]}',
{"default":{"timelineData":[
  {"time":"1714521600","formattedTime":"May 1, 2024","formattedAxisTime":"May 1","value":[31],"hasData":[true],"formattedValue":["31"]},
  {"time":"1714608000","formattedTime":"May 2, 2024","formattedAxisTime":"May 2","value":[47],"hasData":[true],"formattedValue":["47"],"isPartial":true}
],"averages":[]}}"#;

    #[test]
    fn explore_finds_timeseries_widget() {
        let widget = parse_explore(EXPLORE_BODY).unwrap();
        assert_eq!(widget.token, "APP6_abc");
        assert_eq!(widget.request["resolution"], "DAY");
    }

    #[test]
    fn explore_without_timeseries_is_parse_error() {
        let err = parse_explore(r#")]}' {"widgets":[{"id":"GEO_MAP"}]}"#).unwrap_err();
        assert_eq!(err.exit_code(), crate::error::EXIT_PARSE);
    }

    #[test]
    fn timeline_parses_dates_scores_and_partial_flag() {
        let points = parse_timeline(TIMELINE_BODY).unwrap();
        assert_eq!(points.len(), 2);
        assert_eq!(points[0].date, NaiveDate::from_ymd_opt(2024, 5, 1).unwrap());
        assert_eq!(points[0].score, 31.0);
        assert!(!points[0].is_partial);
        assert_eq!(points[1].date, NaiveDate::from_ymd_opt(2024, 5, 2).unwrap());
        assert!(points[1].is_partial);
    }

    #[test]
    fn empty_timeline_parses_to_no_points() {
        let points = parse_timeline(r#")]}', {"default":{"timelineData":[]}}"#).unwrap();
        assert!(points.is_empty());
    }

    #[test]
    fn html_error_page_is_parse_error() {
        assert!(parse_timeline("<html><body>429</body></html>").is_err());
    }
}
