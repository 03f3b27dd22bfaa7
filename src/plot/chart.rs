//! Plotters-powered history chart, rendered to SVG.
//!
//! The chart shows the index over time with:
//! - reference lines at the moderate (2) and high (4) thresholds
//! - shaded bands below, between, and above the thresholds
//! - the latest inserted observation highlighted with its value
//!
//! All series and bounds are computed up front (`ChartData`) so rendering is
//! drawing only.

use std::error::Error;
use std::path::Path;

use chrono::{Duration, NaiveDate};
use log::{info, warn};
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};

use crate::domain::{HIGH_THRESHOLD, MODERATE_THRESHOLD};
use crate::error::AppError;
use crate::io::HistoryTable;

pub const CHART_SIZE: (u32, u32) = (1200, 600);

const INDEX_BLUE: RGBColor = RGBColor(31, 119, 180);
const ORANGE: RGBColor = RGBColor(255, 165, 0);
const BAND_ALPHA: f64 = 0.15;

/// Render-ready chart description.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartData {
    /// `(days since first_date, index)`, sorted by date.
    pub points: Vec<(f64, f64)>,
    /// Latest inserted observation, in the same coordinates.
    pub latest: (f64, f64),
    pub first_date: NaiveDate,
    pub x_bounds: [f64; 2],
    pub y_bounds: [f64; 2],
}

impl ChartData {
    /// `None` when there is nothing finite to plot.
    pub fn from_table(table: &HistoryTable) -> Option<Self> {
        let mut dated: Vec<(NaiveDate, f64)> = table
            .records()
            .iter()
            .filter(|r| r.anxiety_index.is_finite())
            .map(|r| (r.observation_date, r.anxiety_index))
            .collect();
        dated.sort_by_key(|(d, _)| *d);

        let first_date = dated.first()?.0;
        // Latest finite insert; a NaN cell in the last row does not hide the chart.
        let latest = table
            .records()
            .iter()
            .rev()
            .find(|r| r.anxiety_index.is_finite())?;

        let to_x = |d: NaiveDate| (d - first_date).num_days() as f64;
        let points: Vec<(f64, f64)> = dated.iter().map(|&(d, y)| (to_x(d), y)).collect();

        let x_max = points.last().map_or(0.0, |p| p.0);
        let x_bounds = if x_max > 0.0 {
            [-0.5, x_max + 0.5]
        } else {
            [-1.0, 1.0]
        };

        let min_y = points.iter().map(|p| p.1).fold(f64::INFINITY, f64::min);
        let max_y = points.iter().map(|p| p.1).fold(f64::NEG_INFINITY, f64::max);
        // The calm band starts at 0 and the high band ends at max + 0.5.
        let y_bounds = [min_y.min(0.0) - 0.1, max_y.max(HIGH_THRESHOLD) + 0.5];

        Some(Self {
            points,
            latest: (to_x(latest.observation_date), latest.anxiety_index),
            first_date,
            x_bounds,
            y_bounds,
        })
    }

    fn date_label(&self, x: f64) -> String {
        let date = self.first_date + Duration::days(x.round() as i64);
        date.format("%Y-%m-%d").to_string()
    }
}

/// Render the history chart to an SVG file. An empty history is skipped.
pub fn write_chart_svg(table: &HistoryTable, path: &Path) -> Result<(), AppError> {
    let Some(data) = ChartData::from_table(table) else {
        if table.is_empty() {
            warn!("History is empty; skipping chart '{}'", path.display());
        } else {
            warn!(
                "History has no finite index values ({} rows); skipping chart '{}'",
                table.len(),
                path.display()
            );
        }
        return Ok(());
    };

    let root = SVGBackend::new(path, CHART_SIZE).into_drawing_area();
    draw_chart(&root, &data)
        .and_then(|()| root.present().map_err(Into::into))
        .map_err(|e| AppError::config(format!("Failed to render chart '{}': {e}", path.display())))?;

    info!("Chart written to '{}'", path.display());
    Ok(())
}

/// Render the history chart into an SVG string.
pub fn render_chart_svg(table: &HistoryTable) -> Result<Option<String>, AppError> {
    let Some(data) = ChartData::from_table(table) else {
        return Ok(None);
    };

    let mut svg = String::new();
    {
        let root = SVGBackend::with_string(&mut svg, CHART_SIZE).into_drawing_area();
        draw_chart(&root, &data)
            .and_then(|()| root.present().map_err(Into::into))
            .map_err(|e| AppError::config(format!("Failed to render chart: {e}")))?;
    }
    Ok(Some(svg))
}

fn draw_chart(root: &DrawingArea<SVGBackend<'_>, Shift>, data: &ChartData) -> Result<(), Box<dyn Error>> {
    let [x0, x1] = data.x_bounds;
    let [y0, y1] = data.y_bounds;

    root.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(root)
        .caption("Credit Anxiety Index", ("sans-serif", 28))
        .margin(20)
        .set_label_area_size(LabelAreaPosition::Left, 60)
        .set_label_area_size(LabelAreaPosition::Bottom, 50)
        .build_cartesian_2d(x0..x1, y0..y1)?;

    chart
        .configure_mesh()
        .x_desc("Date")
        .y_desc("Anxiety Index")
        .x_labels(8)
        .y_labels(10)
        .x_label_formatter(&|v| data.date_label(*v))
        .y_label_formatter(&|v| format!("{v:.1}"))
        .light_line_style(BLACK.mix(0.05))
        .bold_line_style(BLACK.mix(0.15))
        .draw()?;

    // 1) Stress bands.
    let bands = [
        (y0, MODERATE_THRESHOLD, GREEN, "Calm market (below 2)"),
        (MODERATE_THRESHOLD, HIGH_THRESHOLD, ORANGE, "Moderate stress (2-4)"),
        (HIGH_THRESHOLD, y1, RED, "High stress (above 4)"),
    ];
    for (lo, hi, color, label) in bands {
        let style = color.mix(BAND_ALPHA).filled();
        chart
            .draw_series(std::iter::once(Rectangle::new([(x0, lo), (x1, hi)], style)))?
            .label(label)
            .legend(move |(x, y)| Rectangle::new([(x, y - 5), (x + 15, y + 5)], style));
    }

    // 2) Threshold reference lines.
    for (level, color) in [(MODERATE_THRESHOLD, ORANGE), (HIGH_THRESHOLD, RED)] {
        chart.draw_series(LineSeries::new(
            [(x0, level), (x1, level)],
            color.mix(0.7).stroke_width(2),
        ))?;
    }

    // 3) Index path with markers.
    chart
        .draw_series(LineSeries::new(
            data.points.iter().copied(),
            INDEX_BLUE.stroke_width(3),
        ))?
        .label("Anxiety Index")
        .legend(|(x, y)| PathElement::new([(x, y), (x + 15, y)], INDEX_BLUE.stroke_width(3)));
    chart.draw_series(
        data.points
            .iter()
            .map(|&p| Circle::new(p, 4, INDEX_BLUE.filled())),
    )?;

    // 4) Latest observation: marker plus value label.
    let (lx, ly) = data.latest;
    chart.draw_series([
        Circle::new((lx, ly), 8, RED.filled()),
        Circle::new((lx, ly), 8, BLACK.stroke_width(2)),
    ])?;
    let label_style = TextStyle::from(("sans-serif", 18).into_font())
        .color(&BLACK)
        .pos(Pos::new(HPos::Center, VPos::Bottom));
    chart.draw_series(std::iter::once(Text::new(
        format!("{ly:.2}"),
        (lx, ly + 0.15),
        label_style,
    )))?;

    chart
        .configure_series_labels()
        .position(SeriesLabelPosition::UpperLeft)
        .background_style(WHITE.mix(0.9))
        .border_style(BLACK)
        .draw()?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::AnxietyRecord;

    fn rec(day: u32, index: f64) -> AnxietyRecord {
        AnxietyRecord {
            observation_date: NaiveDate::from_ymd_opt(2024, 1, day).unwrap(),
            dbaa: 0.0,
            gs10: 0.0,
            spread: index,
            gtrend: 0.0,
            anxiety_index: index,
        }
    }

    #[test]
    fn chart_data_bounds_cover_bands() {
        let table = HistoryTable::from_records(vec![rec(3, 2.5), rec(1, 1.5), rec(5, 4.5)]);
        let data = ChartData::from_table(&table).unwrap();

        assert_eq!(data.points, vec![(0.0, 1.5), (2.0, 2.5), (4.0, 4.5)]);
        assert_eq!(data.latest, (4.0, 4.5));
        assert_eq!(data.x_bounds, [-0.5, 4.5]);
        assert!(data.y_bounds[0] < 0.0);
        assert!((data.y_bounds[1] - 5.0).abs() < 1e-12);
        assert_eq!(data.date_label(2.0), "2024-01-03");
    }

    #[test]
    fn chart_data_latest_is_last_inserted_not_last_date() {
        let table = HistoryTable::from_records(vec![rec(5, 3.0), rec(1, 1.0)]);
        let data = ChartData::from_table(&table).unwrap();
        assert_eq!(data.latest, (0.0, 1.0));
        // Calm-only history still reaches the high band.
        assert!(data.y_bounds[1] >= HIGH_THRESHOLD + 0.5);
    }

    #[test]
    fn non_finite_last_row_falls_back_to_last_finite_row() {
        let table = HistoryTable::from_records(vec![rec(1, 2.4), rec(2, f64::NAN)]);
        let data = ChartData::from_table(&table).unwrap();
        assert_eq!(data.points, vec![(0.0, 2.4)]);
        assert_eq!(data.latest, (0.0, 2.4));

        let all_nan = HistoryTable::from_records(vec![rec(1, f64::NAN)]);
        assert!(ChartData::from_table(&all_nan).is_none());
    }

    #[test]
    fn empty_history_has_no_chart() {
        assert!(ChartData::from_table(&HistoryTable::new()).is_none());
        assert!(render_chart_svg(&HistoryTable::new()).unwrap().is_none());
    }

    #[test]
    fn svg_contains_latest_label_and_boundary_values_render() {
        let table = HistoryTable::from_records(vec![rec(1, 2.0), rec(2, 4.0), rec(3, 2.4)]);
        let svg = render_chart_svg(&table).unwrap().unwrap();
        assert!(svg.contains("<svg"));
        assert!(svg.contains("Credit Anxiety Index"));
        assert!(svg.contains("2.40"));
    }

    #[test]
    fn write_chart_creates_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("anxiety.svg");
        let table = HistoryTable::from_records(vec![rec(1, 1.5), rec(2, 2.5), rec(3, 4.5)]);
        write_chart_svg(&table, &path).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.contains("</svg>"));
    }
}
