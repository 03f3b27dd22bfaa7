//! Formatted terminal output.
//!
//! Formatting lives here so the pipeline stays free of presentation and output
//! changes stay local (and snapshot-testable).

use crate::domain::{AnxietyRecord, TrendObservation, YieldSeries};
use crate::io::HistoryTable;
use crate::math::SpreadReading;

/// Format the per-run summary: inputs, spread, trend score, and the index.
pub fn format_run_summary(reading: &SpreadReading, trend: &TrendObservation, record: &AnxietyRecord) -> String {
    let mut out = String::new();

    out.push_str("=== Credit Anxiety Index ===\n");
    out.push_str(&format!("Date: {}\n", record.observation_date));
    out.push_str(&format!(
        "{}: {} % | {}: {} % | Spread: {:.2} %\n",
        YieldSeries::Dbaa,
        reading.dbaa,
        YieldSeries::Gs10,
        reading.gs10,
        reading.spread
    ));
    if !reading.dates_aligned() {
        out.push_str(&format!(
            "  (as of {} {} / {} {})\n",
            YieldSeries::Dbaa,
            reading.dbaa_date,
            YieldSeries::Gs10,
            reading.gs10_date
        ));
    }
    let partial = if trend.is_partial { ", partial" } else { "" };
    out.push_str(&format!(
        "Google Trends: {} ({}{partial})\n",
        trend.score, trend.date
    ));
    out.push_str(&format!(
        "Latest index: {:.2} ({})\n",
        record.anxiety_index,
        record.band()
    ));

    out
}

/// Format the last `n` history rows (insertion order) as a table.
pub fn format_history_tail(table: &HistoryTable, n: usize) -> String {
    let mut out = String::new();
    out.push_str(
        format!(
            "{:<12} {:>7} {:>7} {:>7} {:>7} {:>8} {:<16}\n",
            "date", "dbaa", "gs10", "spread", "gtrend", "index", "band"
        )
        .trim_end(),
    );
    out.push('\n');
    out.push_str(
        format!(
            "{:-<12} {:-<7} {:-<7} {:-<7} {:-<7} {:-<8} {:-<16}\n",
            "", "", "", "", "", "", ""
        )
        .trim_end(),
    );
    out.push('\n');

    let records = table.records();
    let start = records.len().saturating_sub(n);
    for r in &records[start..] {
        out.push_str(
            format!(
                "{:<12} {:>7.2} {:>7.2} {:>7.2} {:>7.0} {:>8.2} {:<16}\n",
                r.observation_date.to_string(),
                r.dbaa,
                r.gs10,
                r.spread,
                r.gtrend,
                r.anxiety_index,
                r.band().label()
            )
            .trim_end(),
        );
        out.push('\n');
    }

    out
}
