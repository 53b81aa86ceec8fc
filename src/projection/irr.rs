//! Internal Rate of Return (IRR) calculation
//!
//! Newton-Raphson from the caller's guess, falling back to bisection when the
//! slope vanishes or the iteration wanders off.

use log::debug;

use super::rates::calculate_npv;

/// Absolute NPV tolerance; cash flows are typically in the millions
pub const NPV_TOLERANCE: f64 = 0.5;

/// Guess used when the caller's guess is not a finite number
pub const DEFAULT_GUESS: f64 = 0.10;

const NEWTON_MAX_ITERATIONS: usize = 50;
const BISECTION_MAX_ITERATIONS: usize = 100;
const MIN_SLOPE: f64 = 1e-10;
const MAX_STEP: f64 = 10.0;
const BISECTION_LOW: f64 = -0.9;
const BISECTION_HIGH: f64 = 100.0;
const BISECTION_HIGH_WIDE: f64 = 1000.0;
const BISECTION_MIN_WIDTH: f64 = 1e-7;

/// Calculate the IRR of yearly cash flows (index = year)
///
/// # Arguments
/// * `cashflows` - Net cash flows (positive = inflow, negative = outflow)
/// * `initial_guess` - Starting rate as a decimal (e.g. 0.12)
///
/// # Returns
/// * `Option<f64>` - IRR as a percent (e.g. 10.0 for 10%), or None if no root
///   can be determined
pub fn calculate_irr(cashflows: &[f64], initial_guess: f64) -> Option<f64> {
    // A root needs at least one inflow and one outflow
    let has_positive = cashflows.iter().any(|&cf| cf > 0.0);
    let has_negative = cashflows.iter().any(|&cf| cf < 0.0);
    if !has_positive || !has_negative {
        return None;
    }

    let guess = if initial_guess.is_finite() { initial_guess } else { DEFAULT_GUESS };

    if let Some(rate) = newton_raphson(cashflows, guess) {
        return Some(rate * 100.0);
    }

    debug!("IRR: Newton-Raphson did not converge from {guess}, falling back to bisection");
    let rate = bisection(cashflows);
    if rate.is_none() {
        debug!("IRR: no bracketed root");
    }
    rate.map(|r| r * 100.0)
}

/// Derivative of NPV with respect to rate
fn npv_derivative(cashflows: &[f64], rate: f64) -> f64 {
    cashflows
        .iter()
        .enumerate()
        .map(|(t, &cf)| -(t as f64) * cf / (1.0 + rate).powi(t as i32 + 1))
        .sum()
}

/// Newton-Raphson phase; None means "hand over to bisection"
fn newton_raphson(cashflows: &[f64], mut guess: f64) -> Option<f64> {
    for _ in 0..NEWTON_MAX_ITERATIONS {
        let npv = calculate_npv(guess, cashflows);
        if npv.abs() < NPV_TOLERANCE {
            return Some(guess);
        }

        let dnpv = npv_derivative(cashflows, guess);
        if dnpv.abs() < MIN_SLOPE {
            return None;
        }

        let next = guess - npv / dnpv;
        if !next.is_finite() || next <= -1.0 || (next - guess).abs() > MAX_STEP {
            return None;
        }

        guess = next;
    }

    None
}

/// Bisection phase over [-0.9, 100], widened once to [-0.9, 1000]
fn bisection(cashflows: &[f64]) -> Option<f64> {
    let mut low = BISECTION_LOW;
    let mut high = BISECTION_HIGH;
    let mut npv_low = calculate_npv(low, cashflows);
    let npv_high = calculate_npv(high, cashflows);

    if npv_low * npv_high > 0.0 {
        high = BISECTION_HIGH_WIDE;
        let npv_high = calculate_npv(high, cashflows);
        if npv_low * npv_high > 0.0 {
            return None;
        }
    }

    for _ in 0..BISECTION_MAX_ITERATIONS {
        let mid = (low + high) / 2.0;
        let npv_mid = calculate_npv(mid, cashflows);

        if npv_mid.abs() < NPV_TOLERANCE || (high - low) < BISECTION_MIN_WIDTH {
            return Some(mid);
        }

        if npv_low * npv_mid < 0.0 {
            high = mid;
        } else {
            low = mid;
            npv_low = npv_mid;
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_single_period_irr() {
        // -1M today, 1.1M in a year: exactly 10%
        let irr = calculate_irr(&[-1_000_000.0, 1_100_000.0], 0.05).unwrap();
        assert_abs_diff_eq!(irr, 10.0, epsilon = 0.01);
    }

    #[test]
    fn test_all_one_sign_has_no_irr() {
        assert_eq!(calculate_irr(&[100.0, 200.0, 300.0], 0.1), None);
        assert_eq!(calculate_irr(&[-100.0, -200.0], 0.1), None);
        assert_eq!(calculate_irr(&[0.0, 0.0], 0.1), None);
        assert_eq!(calculate_irr(&[], 0.1), None);
    }

    #[test]
    fn test_npv_at_irr_is_zero() {
        let cashflows = [-5_000_000.0, 1_200_000.0, 1_500_000.0, 1_800_000.0, 2_000_000.0];
        let irr = calculate_irr(&cashflows, 0.12).unwrap();
        let npv = calculate_npv(irr / 100.0, &cashflows);
        assert!(npv.abs() < NPV_TOLERANCE, "NPV at IRR was {npv}");
    }

    #[test]
    fn test_non_finite_guess_falls_back_to_default() {
        let cashflows = [-1_000_000.0, 1_100_000.0];
        let a = calculate_irr(&cashflows, f64::NAN).unwrap();
        let b = calculate_irr(&cashflows, f64::INFINITY).unwrap();
        assert_abs_diff_eq!(a, 10.0, epsilon = 0.01);
        assert_abs_diff_eq!(b, 10.0, epsilon = 0.01);
    }

    #[test]
    fn test_steep_guess_converges_with_newton() {
        // Single payoff far out: the slope near -95% is steep and the root sits at ~54%
        let cashflows = [-1_000_000.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 50_000_000.0];
        assert!(newton_raphson(&cashflows, -0.95).is_some());
        let irr = calculate_irr(&cashflows, -0.95).unwrap();
        let npv = calculate_npv(irr / 100.0, &cashflows);
        assert!(npv.abs() < NPV_TOLERANCE, "NPV at IRR was {npv}");

        let root = bisection(&cashflows).unwrap();
        assert_abs_diff_eq!(root, 50.0_f64.powf(1.0 / 9.0) - 1.0, epsilon = 1e-6);
    }

    #[test]
    fn test_newton_abort_falls_back_to_bisection() {
        let cashflows = [-1_000_000.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 50_000_000.0];
        let root = (50.0_f64.powf(1.0 / 9.0) - 1.0) * 100.0;

        // Far above the root the slope is flat and the step overshoots
        for guess in [5.0, 50.0] {
            assert_eq!(newton_raphson(&cashflows, guess), None, "guess {guess}");
            let irr = calculate_irr(&cashflows, guess).unwrap();
            assert_abs_diff_eq!(irr, root, epsilon = 1e-3);
            assert!(calculate_npv(irr / 100.0, &cashflows).abs() < NPV_TOLERANCE);
        }
    }

    #[test]
    fn test_newton_aborts_below_minus_one() {
        // From 200% the first step lands near -318%
        let cashflows = [-1_000_000.0, 1_100_000.0];
        assert_eq!(newton_raphson(&cashflows, 2.0), None);
        let irr = calculate_irr(&cashflows, 2.0).unwrap();
        assert_abs_diff_eq!(irr, 10.0, epsilon = 1e-3);
    }

    #[test]
    fn test_bisection_widens_upper_bound_once() {
        // Root at 49,900%: outside [-0.9, 100] but inside [-0.9, 1000]
        let cashflows = [-1_000.0, 500_000.0];
        let root = bisection(&cashflows).unwrap();
        assert!(calculate_npv(root, &cashflows).abs() < NPV_TOLERANCE);
        assert!(root > 100.0);

        // Root at 499,900%: beyond the widened bracket
        assert_eq!(bisection(&[-1_000.0, 5_000_000.0]), None);
    }

    #[test]
    fn test_loan_shaped_cashflows() {
        // Borrow 10,000 and repay 900 over twelve periods
        let mut cashflows = vec![10_000.0];
        cashflows.extend(vec![-900.0; 12]);
        let irr = calculate_irr(&cashflows, 0.1).unwrap();
        let npv = calculate_npv(irr / 100.0, &cashflows);
        assert!(npv.abs() < NPV_TOLERANCE);
    }
}
