//! The index formula.
//!
//! ```text
//! anxiety_index = spread + interest_score / 100
//! ```
//!
//! The spread is an objective market measure (typically 1.5-6 points); the
//! search-interest term adds at most one point of public perception on top.
//! No clamping: the output is an unbounded real number.

/// Combine a credit spread (percent) with a 0-100 interest score.
pub fn compose_index(spread: f64, interest_score: f64) -> f64 {
    spread + interest_score / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn worked_example() {
        let index = compose_index(2.5, 40.0);
        assert!((index - 2.9).abs() < 1e-12);
    }

    #[test]
    fn negative_spread_is_not_clamped() {
        assert_eq!(compose_index(-1.0, 0.0), -1.0);
    }

    proptest! {
        #[test]
        fn matches_formula_exactly(
            spread in -1.0e6f64..1.0e6,
            score in 0.0f64..1.0e6,
        ) {
            prop_assert_eq!(compose_index(spread, score), spread + score / 100.0);
        }

        #[test]
        fn score_term_bounded_for_trend_range(spread in -50.0f64..50.0, score in 0.0f64..=100.0) {
            let index = compose_index(spread, score);
            prop_assert!(index >= spread && index <= spread + 1.0);
        }
    }
}
