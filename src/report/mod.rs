//! Reporting utilities: band classification and run summaries.

use chrono::NaiveDate;

use crate::domain::StressBand;
use crate::io::HistoryTable;

pub mod format;

pub use format::*;

/// A history row paired with its interpretation band.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClassifiedPoint {
    pub date: NaiveDate,
    pub index: f64,
    pub band: StressBand,
}

/// Classify every row of the history, in insertion order.
pub fn classify_history(table: &HistoryTable) -> Vec<ClassifiedPoint> {
    table
        .records()
        .iter()
        .map(|r| ClassifiedPoint {
            date: r.observation_date,
            index: r.anxiety_index,
            band: r.band(),
        })
        .collect()
}

/// Number of rows per band: `(calm, moderate, high)`.
pub fn band_counts(points: &[ClassifiedPoint]) -> (usize, usize, usize) {
    points.iter().fold((0, 0, 0), |(c, m, h), p| match p.band {
        StressBand::Calm => (c + 1, m, h),
        StressBand::Moderate => (c, m + 1, h),
        StressBand::High => (c, m, h + 1),
    })
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
    fn classify_three_bands() {
        let table = HistoryTable::from_records(vec![rec(1, 1.5), rec(2, 2.5), rec(3, 4.5)]);
        let bands: Vec<StressBand> = classify_history(&table).iter().map(|p| p.band).collect();
        assert_eq!(bands, vec![StressBand::Calm, StressBand::Moderate, StressBand::High]);
    }

    #[test]
    fn boundaries_classify_without_failure() {
        let table = HistoryTable::from_records(vec![rec(1, 2.0), rec(2, 4.0)]);
        let points = classify_history(&table);
        assert_eq!(band_counts(&points), (0, 2, 0));
    }
}
