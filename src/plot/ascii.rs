//! ASCII plotting of the index history for terminal output.
//!
//! This is intentionally "dumb" (fixed-size grid), optimized for:
//! - a quick look at the trend right after a run
//! - deterministic output (helpful for golden tests)
//!
//! Plot elements:
//! - index path: `-` line, observations `o`
//! - latest inserted observation: `*`
//! - thresholds: `.` at 2 (moderate), `:` at 4 (high)

use chrono::NaiveDate;

use crate::domain::{HIGH_THRESHOLD, MODERATE_THRESHOLD};
use crate::io::HistoryTable;

/// Render the history as a `width` x `height` character plot with a header line.
pub fn render_ascii_history(table: &HistoryTable, width: usize, height: usize) -> String {
    let Some(latest) = table.latest() else {
        return "Plot: no history\n".to_string();
    };

    let width = width.max(10);
    let height = height.max(5);

    let mut dated: Vec<(NaiveDate, f64)> = table
        .records()
        .iter()
        .filter(|r| r.anxiety_index.is_finite())
        .map(|r| (r.observation_date, r.anxiety_index))
        .collect();
    dated.sort_by_key(|(d, _)| *d);
    let Some(&(first_date, _)) = dated.first() else {
        return "Plot: no finite index values\n".to_string();
    };
    let last_date = dated.last().map_or(first_date, |(d, _)| *d);

    let points: Vec<(f64, f64)> = dated
        .iter()
        .map(|&(d, y)| ((d - first_date).num_days() as f64, y))
        .collect();

    let (t_min, t_max) = t_range(&points);
    let (y_min, y_max) = y_range(&points);
    let (y_min, y_max) = pad_range(y_min, y_max, 0.05);

    let mut grid = vec![vec![' '; width]; height];

    draw_path(&mut grid, &points, t_min, t_max, y_min, y_max);
    draw_threshold(&mut grid, MODERATE_THRESHOLD, y_min, y_max, '.');
    draw_threshold(&mut grid, HIGH_THRESHOLD, y_min, y_max, ':');

    for &(t, y) in &points {
        let x = map_x(t, t_min, t_max, width);
        let yy = map_y(y, y_min, y_max, height);
        grid[yy][x] = 'o';
    }
    if latest.anxiety_index.is_finite() {
        let t = (latest.observation_date - first_date).num_days() as f64;
        let x = map_x(t, t_min, t_max, width);
        let yy = map_y(latest.anxiety_index, y_min, y_max, height);
        grid[yy][x] = '*';
    }

    let mut out = String::new();
    out.push_str(&format!(
        "Plot: {first_date} .. {last_date} | index=[{y_min:.2}, {y_max:.2}] | latest {:.2} ({})\n",
        latest.anxiety_index,
        latest.band()
    ));

    for row in grid {
        out.push_str(&row.into_iter().collect::<String>());
        out.push('\n');
    }

    out
}

fn t_range(points: &[(f64, f64)]) -> (f64, f64) {
    let min_t = points.iter().map(|p| p.0).fold(f64::INFINITY, f64::min);
    let max_t = points.iter().map(|p| p.0).fold(f64::NEG_INFINITY, f64::max);
    if min_t.is_finite() && max_t.is_finite() && max_t > min_t {
        (min_t, max_t)
    } else {
        (min_t - 1.0, min_t + 1.0)
    }
}

/// Data range widened to always include both thresholds.
fn y_range(points: &[(f64, f64)]) -> (f64, f64) {
    let mut min_y = MODERATE_THRESHOLD;
    let mut max_y = HIGH_THRESHOLD;
    for &(_, y) in points {
        min_y = min_y.min(y);
        max_y = max_y.max(y);
    }
    (min_y, max_y)
}

fn pad_range(min: f64, max: f64, frac: f64) -> (f64, f64) {
    let span = (max - min).abs();
    let pad = (span * frac).max(1e-12);
    (min - pad, max + pad)
}

fn map_x(t: f64, t_min: f64, t_max: f64, width: usize) -> usize {
    let width = width.max(2);
    let u = ((t - t_min) / (t_max - t_min)).clamp(0.0, 1.0);
    (u * (width as f64 - 1.0)).round() as usize
}

fn map_y(y: f64, y_min: f64, y_max: f64, height: usize) -> usize {
    let height = height.max(2);
    let u = ((y - y_min) / (y_max - y_min)).clamp(0.0, 1.0);
    // y=top is max -> row 0
    (height as f64 - 1.0 - (u * (height as f64 - 1.0))).round() as usize
}

fn draw_threshold(grid: &mut [Vec<char>], level: f64, y_min: f64, y_max: f64, ch: char) {
    let row = map_y(level, y_min, y_max, grid.len());
    for cell in grid[row].iter_mut() {
        if *cell == ' ' {
            *cell = ch;
        }
    }
}

fn draw_path(grid: &mut [Vec<char>], points: &[(f64, f64)], t_min: f64, t_max: f64, y_min: f64, y_max: f64) {
    let height = grid.len();
    let width = grid[0].len();

    let mut prev = None;
    for &(t, y) in points {
        let x = map_x(t, t_min, t_max, width);
        let yy = map_y(y, y_min, y_max, height);
        if let Some((x0, y0)) = prev {
            draw_line(grid, x0, y0, x, yy, '-');
        } else {
            grid[yy][x] = '-';
        }
        prev = Some((x, yy));
    }
}

/// Integer line drawing (Bresenham-ish).
fn draw_line(grid: &mut [Vec<char>], x0: usize, y0: usize, x1: usize, y1: usize, ch: char) {
    let mut x0 = x0 as isize;
    let mut y0 = y0 as isize;
    let x1 = x1 as isize;
    let y1 = y1 as isize;

    let dx = (x1 - x0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let dy = -(y1 - y0).abs();
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;

    loop {
        if y0 >= 0
            && (y0 as usize) < grid.len()
            && x0 >= 0
            && (x0 as usize) < grid[0].len()
            && grid[y0 as usize][x0 as usize] == ' '
        {
            grid[y0 as usize][x0 as usize] = ch;
        }

        if x0 == x1 && y0 == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x0 += sx;
        }
        if e2 <= dx {
            err += dx;
            y0 += sy;
        }
    }
}
