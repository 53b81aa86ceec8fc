//! Investment measures reduced from a finished schedule

use serde::{Deserialize, Serialize};

use super::irr::calculate_irr;

/// Summary investment measures
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Metrics {
    /// Sum of adjusted cash flows
    pub npv: f64,
    /// Percent; None when no rate can be determined
    pub irr: Option<f64>,
    /// Return on capital, percent
    pub roc: f64,
}

impl Metrics {
    /// Aggregate NPV, IRR and ROC
    ///
    /// `discount_rate` is decimal and seeds the IRR search.
    pub fn aggregate(
        adjusted_cash_flows: &[f64],
        total_cash_flows: &[f64],
        nopat: &[f64],
        book_value_end: &[f64],
        discount_rate: f64,
    ) -> Self {
        Self {
            npv: adjusted_cash_flows.iter().sum(),
            irr: calculate_irr(total_cash_flows, discount_rate),
            roc: calculate_roc(nopat, book_value_end),
        }
    }
}

/// Total NOPAT over total ending book value, as a percent (0 if no book value)
pub fn calculate_roc(nopat: &[f64], book_value_end: &[f64]) -> f64 {
    let total_nopat: f64 = nopat.iter().sum();
    let total_book_value: f64 = book_value_end.iter().sum();
    if total_book_value > 0.0 {
        total_nopat / total_book_value * 100.0
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_roc() {
        assert_abs_diff_eq!(calculate_roc(&[0.0, 10.0, 20.0], &[100.0, 100.0, 100.0]), 10.0, epsilon = 1e-12);
        assert_eq!(calculate_roc(&[0.0, 10.0], &[0.0, 0.0]), 0.0);
        assert_eq!(calculate_roc(&[5.0], &[-10.0]), 0.0);
    }

    #[test]
    fn test_npv_sums_adjusted_not_total() {
        let metrics = Metrics::aggregate(
            &[-100.0, 60.0, 60.0],
            &[-100.0, 70.0, 70.0],
            &[0.0, 0.0, 0.0],
            &[0.0, 0.0, 0.0],
            0.1,
        );
        assert_abs_diff_eq!(metrics.npv, 20.0, epsilon = 1e-12);
        assert!(metrics.irr.is_some());
        assert_eq!(metrics.roc, 0.0);
    }
}
