//! History rendering: SVG chart file (`chart`) and terminal plot (`ascii`).

pub mod ascii;
pub mod chart;

pub use ascii::render_ascii_history;
pub use chart::{ChartData, render_chart_svg, write_chart_svg};
